use crate::error::{NotifyError, Result};
use crate::utils::redact_secrets;
use crate::Provider;
use relaypost_common::types::Channel;
use serde_json::Value;
use std::collections::HashMap;

/// Factory for creating [`Provider`] instances from a channel's JSON
/// credential bundle.
///
/// One plugin per channel, registered in the [`ProviderRegistry`].
/// The credential store calls `validate_config` before accepting a save
/// and `redact_config` before returning a bundle to the API; the tester
/// and dispatcher call `create_provider` when they actually need to talk
/// to the external service.
pub trait ProviderPlugin: Send + Sync {
    /// The channel this plugin builds providers for.
    fn channel(&self) -> Channel;

    /// Names of the write-mostly secret fields in this channel's bundle
    /// (passwords, tokens, key material).
    fn secret_fields(&self) -> &'static [&'static str];

    /// Validates a credential bundle against this plugin's expected
    /// schema, including per-provider required fields.
    fn validate_config(&self, config: &Value) -> Result<()>;

    /// Creates a configured provider from a validated bundle.
    fn create_provider(&self, config: &Value) -> Result<Box<dyn Provider>>;

    /// Returns a copy of `config` with secrets replaced by `"***"`.
    /// Used for API responses.
    fn redact_config(&self, config: &Value) -> Value {
        redact_secrets(config, self.secret_fields())
    }
}

/// Registry of the per-channel [`ProviderPlugin`]s.
///
/// # Examples
///
/// ```
/// use relaypost_common::types::Channel;
/// use relaypost_notify::plugin::ProviderRegistry;
///
/// let registry = ProviderRegistry::default();
/// assert!(registry.get(Channel::Email).is_some());
/// assert!(registry.get(Channel::Push).is_some());
/// ```
pub struct ProviderRegistry {
    plugins: HashMap<Channel, Box<dyn ProviderPlugin>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn ProviderPlugin>) {
        self.plugins.insert(plugin.channel(), plugin);
    }

    pub fn get(&self, channel: Channel) -> Option<&dyn ProviderPlugin> {
        self.plugins.get(&channel).map(|p| p.as_ref())
    }

    fn require(&self, channel: Channel) -> Result<&dyn ProviderPlugin> {
        self.get(channel)
            .ok_or_else(|| NotifyError::UnknownChannel(channel.to_string()))
    }

    /// Validate `config` and build the provider for `channel`.
    pub fn create_provider(&self, channel: Channel, config: &Value) -> Result<Box<dyn Provider>> {
        let plugin = self.require(channel)?;
        plugin.validate_config(config)?;
        plugin.create_provider(config)
    }

    pub fn validate_config(&self, channel: Channel, config: &Value) -> Result<()> {
        self.require(channel)?.validate_config(config)
    }

    pub fn redact_config(&self, channel: Channel, config: &Value) -> Value {
        match self.get(channel) {
            Some(plugin) => plugin.redact_config(config),
            None => config.clone(),
        }
    }

    pub fn secret_fields(&self, channel: Channel) -> &'static [&'static str] {
        self.get(channel).map(|p| p.secret_fields()).unwrap_or(&[])
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::providers::smtp::SmtpPlugin));
        registry.register(Box::new(crate::providers::sms::SmsPlugin));
        registry.register(Box::new(crate::providers::whatsapp::WhatsappPlugin));
        registry.register(Box::new(crate::providers::push::PushPlugin));
        registry
    }
}
