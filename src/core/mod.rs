pub mod concierge;
pub mod config;
pub mod constants;
pub mod message;
pub mod morph;
pub mod session;
pub mod tuning;
