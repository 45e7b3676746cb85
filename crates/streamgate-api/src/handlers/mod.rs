pub mod callbacks;
pub mod files;
pub mod health;
pub mod mgmt;
pub mod targets;
