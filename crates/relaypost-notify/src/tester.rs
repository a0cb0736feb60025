use crate::credentials::{CredentialStore, StatusSignal};
use crate::plugin::ProviderRegistry;
use relaypost_common::types::{Channel, DeliveryReport};
use serde_json::Value;
use std::sync::Arc;

/// Short failure category shown for any unreachable/rejected provider.
pub const CONNECTION_FAILED: &str = "Connection failed";
/// Failure category for bundles the plugin refuses outright.
pub const INVALID_CONFIGURATION: &str = "Invalid configuration";

/// Issues provider-specific validation probes.
///
/// `test` is synchronous from the caller's perspective: it completes
/// before returning a report. There is no cancellation; two overlapping
/// tests for the same channel resolve last-completed-wins at the
/// credential store.
pub struct ConnectivityTester {
    registry: Arc<ProviderRegistry>,
}

impl ConnectivityTester {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Probe `config` for `channel` and return a structured report.
    /// Failures are data: every error path lands in a
    /// `DeliveryReport { success: false, .. }`.
    pub async fn test(&self, channel: Channel, config: &Value) -> DeliveryReport {
        let provider = match self.registry.create_provider(channel, config) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(channel = %channel, error = %e, "Connectivity test rejected config");
                return DeliveryReport::failed_with(INVALID_CONFIGURATION, e.to_string());
            }
        };

        match provider.probe().await {
            Ok(confirmation) => {
                tracing::info!(channel = %channel, "Connectivity test passed");
                DeliveryReport::ok(confirmation)
            }
            Err(e) => {
                tracing::warn!(channel = %channel, error = %e, "Connectivity test failed");
                DeliveryReport::failed_with(CONNECTION_FAILED, e.to_string())
            }
        }
    }

    /// Probe a channel's credentials and feed the outcome into the status
    /// machine: success always promotes to `configured` (even before an
    /// explicit save), failure never demotes an already-configured
    /// channel.
    ///
    /// With `incoming` the probe runs against the candidate bundle merged
    /// over the stored secrets, without saving it; otherwise it runs
    /// against what is stored.
    pub async fn test_with(
        &self,
        store: &CredentialStore,
        channel: Channel,
        incoming: Option<&Value>,
    ) -> DeliveryReport {
        let config = match incoming {
            Some(bundle) => store.merged_config(channel, bundle),
            None => store.raw_config(channel),
        };
        let report = self.test(channel, &config).await;
        let signal = if report.success {
            StatusSignal::TestSucceeded
        } else {
            StatusSignal::TestFailed
        };
        store.apply_signal(channel, signal);
        report
    }

    /// Probe a channel's stored credentials.
    pub async fn test_stored(&self, store: &CredentialStore, channel: Channel) -> DeliveryReport {
        self.test_with(store, channel, None).await
    }
}
