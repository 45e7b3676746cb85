pub mod authenticator;
pub mod middleware;
pub mod token;

pub use authenticator::{authenticate, AuthError};
pub use token::{issue_token, verify_signed_token, IssuedToken, TokenClaims, TokenError};
