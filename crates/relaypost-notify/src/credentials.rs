use crate::error::Result;
use crate::plugin::ProviderRegistry;
use crate::utils::merge_secrets;
use chrono::{DateTime, Utc};
use relaypost_common::types::{Channel, ChannelStatus};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Signals that may move a channel's derived status. Status is never
/// inferred from navigation or reads, only from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSignal {
    /// The backing store reported a status at load time.
    Loaded(ChannelStatus),
    SaveSucceeded,
    /// Persisting the bundle failed (local state is kept for retry).
    SaveFailed,
    TestSucceeded,
    TestFailed,
    /// A provider rejected an actual delivery attempt.
    SendFailed,
}

/// The per-channel status state machine.
///
/// A failed probe never downgrades `Configured`: probes only improve
/// status. Regression requires an explicit error signal from a save or a
/// delivery attempt.
pub fn next_status(current: ChannelStatus, signal: StatusSignal) -> ChannelStatus {
    match signal {
        StatusSignal::Loaded(reported) => reported,
        StatusSignal::SaveSucceeded | StatusSignal::TestSucceeded => ChannelStatus::Configured,
        StatusSignal::SaveFailed | StatusSignal::SendFailed => ChannelStatus::Error,
        StatusSignal::TestFailed => {
            if current == ChannelStatus::Configured {
                ChannelStatus::Configured
            } else {
                ChannelStatus::Error
            }
        }
    }
}

#[derive(Debug, Clone)]
struct ChannelEntry {
    config: Value,
    status: ChannelStatus,
    updated_at: DateTime<Utc>,
}

impl ChannelEntry {
    fn empty() -> Self {
        Self {
            config: Value::Object(Default::default()),
            status: ChannelStatus::Unknown,
            updated_at: Utc::now(),
        }
    }

    fn has_config(&self) -> bool {
        self.config.as_object().map(|o| !o.is_empty()).unwrap_or(false)
    }
}

/// One credential bundle per channel, plus the derived status.
///
/// Secrets are write-mostly: reads go through the plugin's redaction and
/// saves merge the `"***"` sentinel back onto the stored value. All
/// provider I/O happens outside the lock; callers apply the outcome
/// afterwards through [`CredentialStore::apply_signal`], which gives
/// last-completed-wins semantics per channel without blocking the other
/// channels.
pub struct CredentialStore {
    registry: Arc<ProviderRegistry>,
    entries: RwLock<BTreeMap<Channel, ChannelEntry>>,
}

impl CredentialStore {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        let entries = Channel::ALL
            .iter()
            .map(|ch| (*ch, ChannelEntry::empty()))
            .collect();
        Self {
            registry,
            entries: RwLock::new(entries),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Apply what the backing store reported at load time.
    pub fn load(&self, channel: Channel, config: Value, reported: ChannelStatus) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        let entry = entries.entry(channel).or_insert_with(ChannelEntry::empty);
        entry.config = config;
        entry.status = next_status(entry.status, StatusSignal::Loaded(reported));
        entry.updated_at = Utc::now();
    }

    /// Validate and store a bundle for `channel`. Incoming secret fields
    /// carrying the redaction sentinel (or omitted) keep their stored
    /// values. Validation failure leaves entry and status untouched.
    pub fn save(&self, channel: Channel, incoming: &Value) -> Result<()> {
        let secret_fields = self.registry.secret_fields(channel);
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        let entry = entries.entry(channel).or_insert_with(ChannelEntry::empty);

        let merged = merge_secrets(&entry.config, incoming, secret_fields);
        self.registry.validate_config(channel, &merged)?;

        entry.config = merged;
        entry.status = next_status(entry.status, StatusSignal::SaveSucceeded);
        entry.updated_at = Utc::now();
        tracing::info!(channel = %channel, "Channel credentials saved");
        Ok(())
    }

    /// Apply a test/save/send outcome to the status machine.
    pub fn apply_signal(&self, channel: Channel, signal: StatusSignal) -> ChannelStatus {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        let entry = entries.entry(channel).or_insert_with(ChannelEntry::empty);
        entry.status = next_status(entry.status, signal);
        entry.status
    }

    pub fn status(&self, channel: Channel) -> ChannelStatus {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries
            .get(&channel)
            .map(|e| e.status)
            .unwrap_or(ChannelStatus::Unknown)
    }

    pub fn statuses(&self) -> BTreeMap<Channel, ChannelStatus> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        Channel::ALL
            .iter()
            .map(|ch| {
                (
                    *ch,
                    entries.get(ch).map(|e| e.status).unwrap_or(ChannelStatus::Unknown),
                )
            })
            .collect()
    }

    /// The stored bundle with secrets redacted, for API responses.
    pub fn redacted_config(&self, channel: Channel) -> Value {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        let config = entries
            .get(&channel)
            .map(|e| e.config.clone())
            .unwrap_or_else(|| Value::Object(Default::default()));
        self.registry.redact_config(channel, &config)
    }

    /// An incoming bundle merged over the stored one without saving it.
    /// Lets an operator probe edited credentials before committing: the
    /// sentinel fields resolve to the stored secrets, everything else
    /// comes from the candidate bundle.
    pub fn merged_config(&self, channel: Channel, incoming: &Value) -> Value {
        let secret_fields = self.registry.secret_fields(channel);
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        let stored = entries
            .get(&channel)
            .map(|e| e.config.clone())
            .unwrap_or_else(|| Value::Object(Default::default()));
        merge_secrets(&stored, incoming, secret_fields)
    }

    /// The raw stored bundle, for building providers. Never serialized
    /// back to a client.
    pub fn raw_config(&self, channel: Channel) -> Value {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries
            .get(&channel)
            .map(|e| e.config.clone())
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    pub fn updated_at(&self, channel: Channel) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.get(&channel).map(|e| e.updated_at)
    }

    /// Whether the channel is usable for dispatch: a bundle is present
    /// and the channel is not known to be unconfigured. `Error` still
    /// dispatches (the operator may be retrying after a transient
    /// failure); absence of credentials never does.
    pub fn dispatchable(&self, channel: Channel) -> bool {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        match entries.get(&channel) {
            Some(entry) => {
                entry.has_config()
                    && !matches!(entry.status, ChannelStatus::NotConfigured | ChannelStatus::Unknown)
            }
            None => false,
        }
    }
}
