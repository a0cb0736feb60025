use crate::error::{NotifyError, Result};
use crate::plugin::ProviderPlugin;
use crate::{Provider, RenderedMessage};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use relaypost_common::types::Channel;
use serde::Deserialize;
use serde_json::Value;

/// SMTP connection security modes accepted in the credential bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SmtpEncryption {
    None,
    /// Implicit TLS (SMTPS, usually port 465).
    Ssl,
    /// STARTTLS upgrade (usually port 587).
    Tls,
}

fn default_encryption() -> SmtpEncryption {
    SmtpEncryption::Tls
}

#[derive(Deserialize)]
struct SmtpConfig {
    host: String,
    port: u16,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default = "default_encryption")]
    encryption: SmtpEncryption,
    from_address: String,
    #[serde(default)]
    from_name: Option<String>,
}

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpProvider {
    fn from_config(cfg: &SmtpConfig) -> Result<Self> {
        let mut builder = match cfg.encryption {
            SmtpEncryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host)
            }
            SmtpEncryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
                .map_err(|e| NotifyError::Smtp(e.to_string()))?,
            SmtpEncryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
                .map_err(|e| NotifyError::Smtp(e.to_string()))?,
        }
        .port(cfg.port);

        if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let address = cfg
            .from_address
            .parse()
            .map_err(|e| NotifyError::Address(format!("from address: {e}")))?;
        let from = Mailbox::new(cfg.from_name.clone(), address);

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Provider for SmtpProvider {
    async fn deliver(&self, message: &RenderedMessage, address: &str) -> Result<()> {
        let to = address
            .parse()
            .map_err(|e| NotifyError::Address(format!("{address}: {e}")))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_deref().unwrap_or_default())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;
        Ok(())
    }

    async fn probe(&self) -> Result<String> {
        match self.transport.test_connection().await {
            Ok(true) => Ok("SMTP connection established".to_string()),
            Ok(false) => Err(NotifyError::Smtp("server rejected NOOP".to_string())),
            Err(e) => Err(NotifyError::Smtp(e.to_string())),
        }
    }

    fn channel(&self) -> Channel {
        Channel::Email
    }
}

// Plugin

pub struct SmtpPlugin;

impl ProviderPlugin for SmtpPlugin {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        &["password"]
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        let cfg: SmtpConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("smtp: {e}")))?;
        if cfg.host.is_empty() {
            return Err(NotifyError::InvalidConfig("smtp: host is empty".into()));
        }
        if cfg.from_address.is_empty() {
            return Err(NotifyError::InvalidConfig(
                "smtp: from_address is empty".into(),
            ));
        }
        Ok(())
    }

    fn create_provider(&self, config: &Value) -> Result<Box<dyn Provider>> {
        let cfg: SmtpConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("smtp: {e}")))?;
        Ok(Box::new(SmtpProvider::from_config(&cfg)?))
    }
}
