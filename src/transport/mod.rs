//! Transports used by services to deliver reports
//!
//! This module provides:
//! - HTTP client shared foundation for JSON webhooks
//! - Mail transport abstraction with SMTP and null implementations

mod http;
mod mail;

pub use http::HttpClient;
pub use mail::{MailDsn, MailMessage, MailTransport, NullMailTransport, SmtpMailTransport};
