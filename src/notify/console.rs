use async_trait::async_trait;

use super::Notifier;

/// Logs codes instead of mailing them. Used when no SMTP relay is configured.
#[derive(Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        tracing::info!(%email, %code, "verification code (console delivery)");
        Ok(())
    }
}
