//! Welcome notifications for newly approved accounts.

use crate::error::Result;

/// Sends the welcome message carrying a new account's temporary credential.
// TODO: deliver through the ministry's mail relay once it is provisioned;
// until then delivery is log-only so approvals are never blocked on it.
#[derive(Debug, Clone, Default)]
pub struct WelcomeMailer;

impl WelcomeMailer {
    pub fn new() -> Self {
        Self
    }

    /// Best-effort delivery; the caller logs failures and continues.
    pub fn send_welcome(&self, email: &str, name: &str, temporary_password: &str) -> Result<()> {
        tracing::info!(
            recipient = %email,
            name = %name,
            "Welcome message queued: account approved, temporary credential issued ({} chars)",
            temporary_password.len()
        );
        Ok(())
    }
}
