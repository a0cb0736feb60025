use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Snowflake 机器标识（0-31）
    #[serde(default = "default_machine_id")]
    pub machine_id: i32,
    /// Snowflake 节点标识（0-31）
    #[serde(default = "default_node_id")]
    pub node_id: i32,

    /// CORS 允许的 origins 列表，为空时允许所有来源（开发模式）
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub app_id: AppIdConfig,

    /// 各渠道的初始凭证（可选）。键为渠道名（email/sms/whatsapp/push），
    /// 值为该渠道的凭证字段表，等价于后端存储在启动时返回的配置。
    #[serde(default)]
    pub credentials: BTreeMap<String, toml::Value>,

    /// 测试发送用的收件人目录种子
    #[serde(default)]
    pub recipients: Vec<SeedRecipient>,
}

/// 收件人目录种子条目（用于测试发送的地址解析）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRecipient {
    pub role: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub device_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppIdConfig {
    /// Whether to require the rp-app-id header (default: false)
    #[serde(default = "default_require_app_id")]
    pub require_app_id: bool,
    /// List of allowed rp-app-id values
    #[serde(default)]
    pub allowed_app_ids: Vec<String>,
}

impl Default for AppIdConfig {
    fn default() -> Self {
        Self {
            require_app_id: default_require_app_id(),
            allowed_app_ids: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            machine_id: default_machine_id(),
            node_id: default_node_id(),
            cors_allowed_origins: Vec::new(),
            app_id: AppIdConfig::default(),
            credentials: BTreeMap::new(),
            recipients: Vec::new(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

fn default_machine_id() -> i32 {
    1
}

fn default_node_id() -> i32 {
    1
}

fn default_require_app_id() -> bool {
    false
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.http_port, 8080);
        assert!(!config.app_id.require_app_id);
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn credentials_tables_are_kept_per_channel() {
        let config: ServerConfig = toml::from_str(
            r#"
            http_port = 9000

            [credentials.email]
            host = "smtp.example.com"
            port = 587
            from_address = "noreply@example.com"

            [[recipients]]
            role = "retailer"
            id = "r-100"
            name = "Velvet Vine"
            email = "owner@velvetvine.example"
            "#,
        )
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert!(config.credentials.contains_key("email"));
        assert_eq!(config.recipients.len(), 1);
        assert_eq!(config.recipients[0].role, "retailer");
    }
}
