//! Provider credentials, connectivity probes and test dispatch.
//!
//! Each delivery channel (email, sms, whatsapp, push) has one active
//! provider configuration, managed by [`credentials::CredentialStore`].
//! A [`plugin::ProviderPlugin`] validates the configuration, redacts its
//! secrets for API responses and builds the [`Provider`] that talks to
//! the external service. [`tester::ConnectivityTester`] exercises a
//! provider's validation probe; [`dispatcher::TestDispatcher`] renders a
//! template and delivers a single test message to a real recipient.

pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod plugin;
pub mod providers;
pub mod tester;
pub mod utils;


use async_trait::async_trait;
use error::Result;
use relaypost_common::types::Channel;

/// A fully rendered, channel-shaped message ready for delivery.
/// `subject` is set for email, `title` for push; sms/whatsapp carry only
/// a body. An empty body is a valid (if degenerate) message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: Option<String>,
    pub title: Option<String>,
    pub body: String,
}

/// A configured delivery provider for one channel (SMTP relay, SMS
/// gateway, WhatsApp API, push service).
///
/// Instances are created by the matching [`plugin::ProviderPlugin`] from
/// a validated credential bundle and are used for exactly one operation:
/// a connectivity probe or a single test delivery. No batching, queueing
/// or retry scheduling lives here.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Deliver one rendered message to one concrete address
    /// (email address, phone number or device token, depending on the
    /// channel).
    ///
    /// # Errors
    ///
    /// Returns an error when the provider rejects the request or cannot
    /// be reached. A single attempt is made.
    async fn deliver(&self, message: &RenderedMessage, address: &str) -> Result<()>;

    /// Issue the provider-specific validation probe (SMTP handshake,
    /// account lookup, dry-run send). Returns a short human confirmation
    /// on success.
    async fn probe(&self) -> Result<String>;

    /// The channel this provider delivers for.
    fn channel(&self) -> Channel;
}
