//! Streamgate network guards
//!
//! Everything the control plane dials on a caller's behalf goes through this
//! crate: address classification, the SSRF-safe HTTP client, callback URL
//! validation and callback delivery.

pub mod callback;
pub mod egress;
pub mod ip;
pub mod notify;

pub use callback::{validate_callback_url, SsrfError};
pub use egress::{new_safe_http_client, EgressError, GuardedResolver, SafeHttpClient};
pub use ip::{check_ip, classify, classify_ip, is_safe, IpClass, UnsafeDestination};
pub use notify::{CallbackEvent, CallbackNotifier, NotifyError};
