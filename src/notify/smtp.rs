use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{verification_html, Notifier};
use crate::config::SmtpConfig;

const IMPLICIT_TLS_PORT: u16 = 465;
const STARTTLS_PORT: u16 = 587;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Security {
    ImplicitTls,
    StartTls,
    Plain,
}

impl Security {
    fn for_port(port: u16) -> Self {
        match port {
            IMPLICIT_TLS_PORT => Security::ImplicitTls,
            STARTTLS_PORT => Security::StartTls,
            _ => Security::Plain,
        }
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(cfg.username.clone(), cfg.password.clone());
        let security = Security::for_port(cfg.port);
        let builder = match security {
            Security::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
                .context("create smtp transport")?,
            Security::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
                .context("create smtp transport")?,
            Security::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host),
        };
        let transport = builder
            .port(cfg.port)
            .credentials(creds)
            .build();

        let from_address = match &cfg.from_name {
            Some(name) => format!("{} <{}>", name, cfg.from_email),
            None => cfg.from_email.clone(),
        };
        let from = from_address
            .parse::<Mailbox>()
            .context("parse from address")?;

        tracing::info!(host = %cfg.host, port = cfg.port, ?security, "smtp notifier configured");
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        let to = email
            .parse::<Mailbox>()
            .with_context(|| format!("parse recipient {email}"))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your password reset code")
            .header(ContentType::TEXT_HTML)
            .body(verification_html(code))
            .context("build email")?;

        self.transport.send(message).await.context("smtp send")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_follows_the_port() {
        assert_eq!(Security::for_port(465), Security::ImplicitTls);
        assert_eq!(Security::for_port(587), Security::StartTls);
        assert_eq!(Security::for_port(25), Security::Plain);
        assert_eq!(Security::for_port(1025), Security::Plain);
    }
}
