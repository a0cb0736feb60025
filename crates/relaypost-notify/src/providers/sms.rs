use crate::error::{NotifyError, Result};
use crate::plugin::ProviderPlugin;
use crate::utils::{truncate_diagnostic, MAX_DIAGNOSTIC_LENGTH};
use crate::{Provider, RenderedMessage};
use async_trait::async_trait;
use relaypost_common::types::Channel;
use serde::Deserialize;
use serde_json::Value;

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const VONAGE_API_BASE: &str = "https://rest.nexmo.com";

/// SMS gateway vendors the sms channel can be pointed at. The stored
/// bundle is provider-agnostic: switching vendors changes which fields
/// are required, never which fields are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProviderKind {
    Twilio,
    Nexmo,
    Generic,
}

#[derive(Deserialize)]
struct SmsConfig {
    provider: SmsProviderKind,
    /// Twilio account SID / Vonage api_key.
    #[serde(default)]
    account_id: Option<String>,
    /// Twilio auth token / Vonage api_secret / generic gateway bearer key.
    #[serde(default)]
    api_secret: Option<String>,
    #[serde(default)]
    from_number: Option<String>,
    /// Generic gateway endpoint; unused for the hosted vendors.
    #[serde(default)]
    gateway_url: Option<String>,
}

impl SmsConfig {
    fn validated(self) -> Result<Self> {
        let missing = |field: &str| {
            NotifyError::InvalidConfig(format!("sms: {field} is required for this provider"))
        };
        match self.provider {
            SmsProviderKind::Twilio | SmsProviderKind::Nexmo => {
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
            SmsProviderKind::Generic => {
                if self.gateway_url.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("gateway_url"));
                }
            }
        }
        Ok(self)
    }
}

pub struct SmsProvider {
    client: reqwest::Client,
    kind: SmsProviderKind,
    account_id: String,
    api_secret: String,
    from_number: String,
    gateway_url: Option<String>,
    api_base: String,
}

impl SmsProvider {
    fn from_config(cfg: SmsConfig) -> Self {
        let api_base = match cfg.provider {
            SmsProviderKind::Twilio => TWILIO_API_BASE,
            SmsProviderKind::Nexmo => VONAGE_API_BASE,
            SmsProviderKind::Generic => "",
        };
        Self {
            client: reqwest::Client::new(),
            kind: cfg.provider,
            account_id: cfg.account_id.unwrap_or_default(),
            api_secret: cfg.api_secret.unwrap_or_default(),
            from_number: cfg.from_number.unwrap_or_default(),
            gateway_url: cfg.gateway_url,
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
        let cfg: SmsConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("sms: {e}")))?;
        Ok(Self::from_config(cfg.validated()?))
    }

    async fn api_failure(resp: reqwest::Response) -> NotifyError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        NotifyError::Api {
            service: "sms",
            status,
            body: truncate_diagnostic(&body, MAX_DIAGNOSTIC_LENGTH),
        }
    }

    async fn deliver_twilio(&self, body: &str, to: &str) -> Result<()> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_id
        );
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_id, Some(&self.api_secret))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::api_failure(resp).await);
        }
        Ok(())
    }

    async fn deliver_nexmo(&self, body: &str, to: &str) -> Result<()> {
        let url = format!("{}/sms/json", self.api_base);
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("api_key", self.account_id.as_str()),
                ("api_secret", self.api_secret.as_str()),
                ("from", self.from_number.as_str()),
                ("to", to),
                ("text", body),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::api_failure(resp).await);
        }
        // Vonage reports per-message errors in a 200 body.
        let payload: Value = resp.json().await?;
        let status = payload["messages"][0]["status"].as_str().unwrap_or("0");
        if status != "0" {
            let err = payload["messages"][0]["error-text"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(NotifyError::Api {
                service: "sms",
                status: 200,
                body: err,
            });
        }
        Ok(())
    }

    async fn deliver_generic(&self, body: &str, to: &str) -> Result<()> {
        let url = self
            .gateway_url
            .as_deref()
            .ok_or_else(|| NotifyError::InvalidConfig("sms: gateway_url missing".into()))?;
        let mut req = self.client.post(url).json(&serde_json::json!({
            "to": to,
            "from": self.from_number,
            "message": body,
        }));
        if !self.api_secret.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_secret));
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(Self::api_failure(resp).await);
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for SmsProvider {
    async fn deliver(&self, message: &RenderedMessage, address: &str) -> Result<()> {
        match self.kind {
            SmsProviderKind::Twilio => self.deliver_twilio(&message.body, address).await,
            SmsProviderKind::Nexmo => self.deliver_nexmo(&message.body, address).await,
            SmsProviderKind::Generic => self.deliver_generic(&message.body, address).await,
        }
    }

    async fn probe(&self) -> Result<String> {
        match self.kind {
            SmsProviderKind::Twilio => {
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
            SmsProviderKind::Nexmo => {
                let url = format!("{}/account/get-balance", self.api_base);
                let resp = self
                    .client
                    .get(&url)
                    .query(&[
                        ("api_key", self.account_id.as_str()),
                        ("api_secret", self.api_secret.as_str()),
                    ])
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    return Err(Self::api_failure(resp).await);
                }
                Ok("Vonage account verified".to_string())
            }
            SmsProviderKind::Generic => {
                // Reachability only: a custom gateway has no standard
                // account endpoint, so any HTTP answer counts.
                let url = self
                    .gateway_url
                    .as_deref()
                    .ok_or_else(|| NotifyError::InvalidConfig("sms: gateway_url missing".into()))?;
                self.client.get(url).send().await?;
                Ok("SMS gateway reachable".to_string())
            }
        }
    }

    fn channel(&self) -> Channel {
        Channel::Sms
    }
}

// Plugin

pub struct SmsPlugin;

impl ProviderPlugin for SmsPlugin {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        &["api_secret"]
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        let cfg: SmsConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("sms: {e}")))?;
        cfg.validated().map(|_| ())
    }

    fn create_provider(&self, config: &Value) -> Result<Box<dyn Provider>> {
        let cfg: SmsConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("sms: {e}")))?;
        Ok(Box::new(SmsProvider::from_config(cfg.validated()?)))
    }
}
