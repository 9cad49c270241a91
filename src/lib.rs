//! update-reporter - Notification fan-out for dependency update checks
//!
//! This library reports outdated packages to external services:
//! - E-mail (SMTP)
//! - GitLab alerts
//! - Mattermost, Slack and MS Teams webhooks
//! - Better Uptime incidents
//! - Generic JSON webhooks
//!
//! Services are enabled and configured per project, with environment
//! variable fallback, and dispatched in registry order by the [`reporter::Reporter`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod options;
pub mod output;
pub mod registry;
pub mod reporter;
pub mod service;
pub mod transport;
