use crate::credentials::{CredentialStore, StatusSignal};
use crate::plugin::ProviderRegistry;
use crate::RenderedMessage;
use async_trait::async_trait;
use relaypost_catalog::event::NotificationEvent;
use relaypost_catalog::render::render;
use relaypost_catalog::template::{ChannelContent, NotificationTemplate};
use relaypost_common::types::{Channel, DeliveryReport, RecipientCandidate, RecipientRole};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Dispatch failure categories, one distinct message each. The server
/// surfaces these verbatim so the operator sees what stopped the send.
pub const NOT_CONFIGURED: &str = "Channel not configured";
pub const MISSING_TEMPLATE: &str = "No template configured for this event and recipient";
pub const MISSING_RECIPIENT: &str = "No recipient address for this channel";
pub const PROVIDER_ERROR: &str = "Provider delivery failed";
pub const SENT: &str = "Test message sent";

/// Resolves a recipient id to a concrete contact record. Recipient data
/// is owned by the platform's account service, not by this core; the
/// trait is the seam it plugs in through.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn list(&self, role: RecipientRole) -> Vec<RecipientCandidate>;

    async fn find(&self, role: RecipientRole, id: &str) -> Option<RecipientCandidate> {
        self.list(role).await.into_iter().find(|c| c.id == id)
    }
}

/// Fixed in-memory directory, fed from server configuration. Enough for
/// test sends; production lookups go to the account service.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    by_role: BTreeMap<RecipientRole, Vec<RecipientCandidate>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, role: RecipientRole, candidate: RecipientCandidate) {
        self.by_role.entry(role).or_default().push(candidate);
    }
}

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn list(&self, role: RecipientRole) -> Vec<RecipientCandidate> {
        self.by_role.get(&role).cloned().unwrap_or_default()
    }
}

/// Wire shape of a test-send request
/// (`POST /v1/notifications/send-test`).
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct TestSendRequest {
    pub channel: Channel,
    pub recipient_type: RecipientRole,
    pub recipient_id: String,
    pub event_id: String,
    #[serde(default)]
    pub placeholders: HashMap<String, String>,
}

/// Renders the channel leaf of a template with the supplied placeholder
/// values. Unmatched placeholders stay visible in the output on purpose.
pub fn render_content(content: &ChannelContent, values: &HashMap<String, String>) -> RenderedMessage {
    RenderedMessage {
        subject: content.subject().map(|s| render(s, values)),
        title: content.title().map(|t| render(t, values)),
        body: render(content.body(), values),
    }
}

fn contact_address(channel: Channel, candidate: &RecipientCandidate) -> Option<String> {
    let addr = match channel {
        Channel::Email => candidate.email.as_deref(),
        Channel::Sms | Channel::Whatsapp => candidate.phone.as_deref(),
        Channel::Push => candidate.device_token.as_deref(),
    };
    addr.filter(|a| !a.is_empty()).map(str::to_string)
}

/// Renders the applicable template and delivers a single message through
/// the channel's configured provider.
///
/// Every failure in the pipeline is returned as a
/// `DeliveryReport { success: false, .. }`; nothing escapes this
/// boundary as an error. An unconfigured channel is rejected before any
/// provider is built, so no network call can happen for it.
pub struct TestDispatcher {
    registry: Arc<ProviderRegistry>,
    credentials: Arc<CredentialStore>,
    directory: Arc<dyn RecipientDirectory>,
}

impl TestDispatcher {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        credentials: Arc<CredentialStore>,
        directory: Arc<dyn RecipientDirectory>,
    ) -> Self {
        Self {
            registry,
            credentials,
            directory,
        }
    }

    pub fn directory(&self) -> &dyn RecipientDirectory {
        self.directory.as_ref()
    }

    /// Run the test-send pipeline for an already-resolved event and
    /// template. Callers pass `None` when the event id did not resolve;
    /// that is a `missing_template` outcome, not a transport error.
    pub async fn send_test(
        &self,
        event: Option<&NotificationEvent>,
        template: Option<&NotificationTemplate>,
        req: &TestSendRequest,
    ) -> DeliveryReport {
        let channel = req.channel;
        let role = req.recipient_type;

        // Credentials gate comes first: an unconfigured channel must not
        // reach a provider at all.
        if !self.credentials.dispatchable(channel) {
            return DeliveryReport::failed_with(
                NOT_CONFIGURED,
                format!("no {channel} provider credentials are saved"),
            );
        }

        let (Some(event), Some(template)) = (event, template) else {
            return DeliveryReport::failed_with(
                MISSING_TEMPLATE,
                format!("event '{}' is not configured", req.event_id),
            );
        };

        // A template bundle always exists for every role, but a role the
        // event does not address is unreachable configuration.
        if !event.addresses_role(role) {
            return DeliveryReport::failed_with(
                MISSING_TEMPLATE,
                format!("event '{}' does not address the {role} role", event.id),
            );
        }

        let content = template.contents.get(role, channel);
        let message = render_content(content, &req.placeholders);

        let candidate = match self.directory.find(role, &req.recipient_id).await {
            Some(c) => c,
            None => {
                return DeliveryReport::failed_with(
                    MISSING_RECIPIENT,
                    format!("{role} '{}' was not found", req.recipient_id),
                );
            }
        };
        let Some(address) = contact_address(channel, &candidate) else {
            return DeliveryReport::failed_with(
                MISSING_RECIPIENT,
                format!(
                    "{role} '{}' has no {} on file",
                    candidate.id,
                    channel.address_kind()
                ),
            );
        };

        let provider = match self
            .registry
            .create_provider(channel, &self.credentials.raw_config(channel))
        {
            Ok(p) => p,
            Err(e) => {
                return DeliveryReport::failed_with(NOT_CONFIGURED, e.to_string());
            }
        };

        match provider.deliver(&message, &address).await {
            Ok(()) => {
                tracing::info!(
                    channel = %channel,
                    event = %event.id,
                    role = %role,
                    "Test message delivered"
                );
                DeliveryReport::ok(SENT)
            }
            Err(e) => {
                tracing::warn!(
                    channel = %channel,
                    event = %event.id,
                    error = %e,
                    "Test delivery failed"
                );
                self.credentials.apply_signal(channel, StatusSignal::SendFailed);
                DeliveryReport::failed_with(PROVIDER_ERROR, e.to_string())
            }
        }
    }
}
