use crate::error::{NotifyError, Result};
use crate::plugin::ProviderPlugin;
use crate::utils::{truncate_diagnostic, MAX_DIAGNOSTIC_LENGTH};
use crate::{Provider, RenderedMessage};
use async_trait::async_trait;
use relaypost_common::types::Channel;
use serde::Deserialize;
use serde_json::Value;

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const META_GRAPH_BASE: &str = "https://graph.facebook.com/v19.0";

/// WhatsApp delivery vendors: Twilio's WhatsApp bridge or Meta's Cloud
/// API. Field requirements differ per vendor; the stored bundle keeps
/// both field subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhatsappProviderKind {
    Twilio,
    Meta,
}

#[derive(Deserialize)]
struct WhatsappConfig {
    provider: WhatsappProviderKind,
    /// Twilio account SID.
    #[serde(default)]
    account_id: Option<String>,
    /// Twilio auth token.
    #[serde(default)]
    api_secret: Option<String>,
    /// Twilio WhatsApp-enabled sender number.
    #[serde(default)]
    from_number: Option<String>,
    /// Meta Cloud API bearer token.
    #[serde(default)]
    access_token: Option<String>,
    /// Meta phone number id.
    #[serde(default)]
    phone_number_id: Option<String>,
}

impl WhatsappConfig {
    fn validated(self) -> Result<Self> {
        let missing = |field: &str| {
            NotifyError::InvalidConfig(format!("whatsapp: {field} is required for this provider"))
        };
        match self.provider {
            WhatsappProviderKind::Twilio => {
                if self.account_id.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("account_id"));
                }
                if self.api_secret.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("api_secret"));
                }
                if self.from_number.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("from_number"));
                }
            }
            WhatsappProviderKind::Meta => {
                if self.access_token.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("access_token"));
                }
                if self.phone_number_id.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("phone_number_id"));
                }
            }
        }
        Ok(self)
    }
}

pub struct WhatsappProvider {
    client: reqwest::Client,
    kind: WhatsappProviderKind,
    account_id: String,
    api_secret: String,
    from_number: String,
    access_token: String,
    phone_number_id: String,
    api_base: String,
}

impl WhatsappProvider {
    fn from_config(cfg: WhatsappConfig) -> Self {
        let api_base = match cfg.provider {
            WhatsappProviderKind::Twilio => TWILIO_API_BASE,
            WhatsappProviderKind::Meta => META_GRAPH_BASE,
        };
        Self {
            client: reqwest::Client::new(),
            kind: cfg.provider,
            account_id: cfg.account_id.unwrap_or_default(),
            api_secret: cfg.api_secret.unwrap_or_default(),
            from_number: cfg.from_number.unwrap_or_default(),
            access_token: cfg.access_token.unwrap_or_default(),
            phone_number_id: cfg.phone_number_id.unwrap_or_default(),
            api_base: api_base.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.to_string();
        self
    }

    #[cfg(test)]
    pub(crate) fn from_value(config: &Value) -> Result<Self> {
        let cfg: WhatsappConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("whatsapp: {e}")))?;
        Ok(Self::from_config(cfg.validated()?))
    }

    async fn api_failure(resp: reqwest::Response) -> NotifyError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        NotifyError::Api {
            service: "whatsapp",
            status,
            body: truncate_diagnostic(&body, MAX_DIAGNOSTIC_LENGTH),
        }
    }
}

#[async_trait]
impl Provider for WhatsappProvider {
    async fn deliver(&self, message: &RenderedMessage, address: &str) -> Result<()> {
        match self.kind {
            WhatsappProviderKind::Twilio => {
                let url = format!(
                    "{}/2010-04-01/Accounts/{}/Messages.json",
                    self.api_base, self.account_id
                );
                let from = format!("whatsapp:{}", self.from_number);
                let to = format!("whatsapp:{address}");
                let resp = self
                    .client
                    .post(&url)
                    .basic_auth(&self.account_id, Some(&self.api_secret))
                    .form(&[
                        ("To", to.as_str()),
                        ("From", from.as_str()),
                        ("Body", message.body.as_str()),
                    ])
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    return Err(Self::api_failure(resp).await);
                }
                Ok(())
            }
            WhatsappProviderKind::Meta => {
                let url = format!("{}/{}/messages", self.api_base, self.phone_number_id);
                let resp = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.access_token)
                    .json(&serde_json::json!({
                        "messaging_product": "whatsapp",
                        "to": address,
                        "type": "text",
                        "text": { "body": message.body },
                    }))
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    return Err(Self::api_failure(resp).await);
                }
                Ok(())
            }
        }
    }

    async fn probe(&self) -> Result<String> {
        match self.kind {
            WhatsappProviderKind::Twilio => {
                let url = format!(
                    "{}/2010-04-01/Accounts/{}.json",
                    self.api_base, self.account_id
                );
                let resp = self
                    .client
                    .get(&url)
                    .basic_auth(&self.account_id, Some(&self.api_secret))
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    return Err(Self::api_failure(resp).await);
                }
                Ok("Twilio account verified".to_string())
            }
            WhatsappProviderKind::Meta => {
                let url = format!("{}/{}", self.api_base, self.phone_number_id);
                let resp = self
                    .client
                    .get(&url)
                    .bearer_auth(&self.access_token)
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    return Err(Self::api_failure(resp).await);
                }
                Ok("WhatsApp sender number verified".to_string())
            }
        }
    }

    fn channel(&self) -> Channel {
        Channel::Whatsapp
    }
}

// Plugin

pub struct WhatsappPlugin;

impl ProviderPlugin for WhatsappPlugin {
    fn channel(&self) -> Channel {
        Channel::Whatsapp
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        &["api_secret", "access_token"]
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        let cfg: WhatsappConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("whatsapp: {e}")))?;
        cfg.validated().map(|_| ())
    }

    fn create_provider(&self, config: &Value) -> Result<Box<dyn Provider>> {
        let cfg: WhatsappConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("whatsapp: {e}")))?;
        Ok(Box::new(WhatsappProvider::from_config(cfg.validated()?)))
    }
}
