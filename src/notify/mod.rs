//! Delivery of password reset codes.

mod console;
mod smtp;

use async_trait::async_trait;

pub use console::ConsoleNotifier;
pub use smtp::SmtpNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()>;
}

pub(crate) fn verification_html(code: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif">
  <h2>Reset your password</h2>
  <p>Use this code to choose a new password:</p>
  <p style="font-size: 28px; letter-spacing: 6px"><strong>{code}</strong></p>
  <p>The code expires in a few minutes. If you did not ask for it, ignore this email.</p>
</div>"#
    )
}
