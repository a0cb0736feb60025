use crate::error::{NotifyError, Result};
use crate::plugin::ProviderPlugin;
use crate::utils::{truncate_diagnostic, MAX_DIAGNOSTIC_LENGTH};
use crate::{Provider, RenderedMessage};
use async_trait::async_trait;
use relaypost_common::types::Channel;
use serde::Deserialize;
use serde_json::Value;

const FCM_API_BASE: &str = "https://fcm.googleapis.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushProviderKind {
    Fcm,
}

fn default_provider() -> PushProviderKind {
    PushProviderKind::Fcm
}

#[derive(Deserialize)]
struct PushConfig {
    #[serde(default = "default_provider")]
    #[allow(dead_code)]
    provider: PushProviderKind,
    project_id: String,
    server_key: String,
}

pub struct PushProvider {
    client: reqwest::Client,
    server_key: String,
    api_base: String,
}

impl PushProvider {
    fn from_config(cfg: PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_key: cfg.server_key,
            api_base: FCM_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.to_string();
        self
    }

    #[cfg(test)]
    pub(crate) fn from_value(config: &Value) -> Result<Self> {
        let cfg: PushConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("push: {e}")))?;
        Ok(Self::from_config(cfg))
    }

    async fn post_send(&self, payload: &Value) -> Result<Value> {
        let url = format!("{}/fcm/send", self.api_base);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("key={}", self.server_key))
            .json(payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                service: "push",
                status,
                body: truncate_diagnostic(&body, MAX_DIAGNOSTIC_LENGTH),
            });
        }
        Ok(resp.json().await.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Provider for PushProvider {
    async fn deliver(&self, message: &RenderedMessage, address: &str) -> Result<()> {
        let payload = serde_json::json!({
            "to": address,
            "notification": {
                "title": message.title.as_deref().unwrap_or_default(),
                "body": message.body,
            },
        });
        let result = self.post_send(&payload).await?;
        if result["failure"].as_u64().unwrap_or(0) > 0 {
            let reason = result["results"][0]["error"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(NotifyError::Api {
                service: "push",
                status: 200,
                body: reason,
            });
        }
        Ok(())
    }

    async fn probe(&self) -> Result<String> {
        // Dry-run send against a throwaway token: a 200 means the server
        // key was accepted (the token itself reports InvalidRegistration,
        // which is fine); a 401 means the key is bad.
        let payload = serde_json::json!({
            "to": "connectivity-probe",
            "dry_run": true,
            "notification": { "title": "probe", "body": "probe" },
        });
        self.post_send(&payload).await?;
        Ok("Push service key accepted".to_string())
    }

    fn channel(&self) -> Channel {
        Channel::Push
    }
}

// Plugin

pub struct PushPlugin;

impl ProviderPlugin for PushPlugin {
    fn channel(&self) -> Channel {
        Channel::Push
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        &["server_key"]
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        let cfg: PushConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("push: {e}")))?;
        if cfg.project_id.is_empty() {
            return Err(NotifyError::InvalidConfig("push: project_id is empty".into()));
        }
        if cfg.server_key.is_empty() {
            return Err(NotifyError::InvalidConfig("push: server_key is empty".into()));
        }
        Ok(())
    }

    fn create_provider(&self, config: &Value) -> Result<Box<dyn Provider>> {
        let cfg: PushConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("push: {e}")))?;
        Ok(Box::new(PushProvider::from_config(cfg)))
    }
}
