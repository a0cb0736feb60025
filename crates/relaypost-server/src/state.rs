use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use relaypost_catalog::defaults::load_defaults;
use relaypost_catalog::store::CatalogStore;
use relaypost_common::types::{Channel, ChannelStatus, RecipientCandidate, RecipientRole};
use relaypost_notify::credentials::CredentialStore;
use relaypost_notify::dispatcher::{StaticDirectory, TestDispatcher};
use relaypost_notify::plugin::ProviderRegistry;
use relaypost_notify::tester::ConnectivityTester;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<CatalogStore>>,
    pub credentials: Arc<CredentialStore>,
    pub tester: Arc<ConnectivityTester>,
    pub dispatcher: Arc<TestDispatcher>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}

/// Assemble the application state: default catalog, provider registry,
/// credential store seeded from the configuration file, and the
/// recipient directory for test sends.
pub fn build_state(config: ServerConfig) -> AppState {
    let registry = Arc::new(ProviderRegistry::default());
    let catalog = Arc::new(RwLock::new(load_defaults()));

    let credentials = Arc::new(CredentialStore::new(registry.clone()));
    seed_credentials(&credentials, &config);

    let directory = Arc::new(seed_directory(&config));
    let tester = Arc::new(ConnectivityTester::new(registry.clone()));
    let dispatcher = Arc::new(TestDispatcher::new(
        registry,
        credentials.clone(),
        directory,
    ));

    AppState {
        catalog,
        credentials,
        tester,
        dispatcher,
        start_time: Utc::now(),
        config: Arc::new(config),
    }
}

/// Apply the configuration file's per-channel credential tables as the
/// load-time report: a bundle the plugin accepts loads as `configured`,
/// anything else (or nothing) as `not_configured`.
fn seed_credentials(store: &CredentialStore, config: &ServerConfig) {
    for channel in Channel::ALL {
        let seeded = config
            .credentials
            .get(&channel.to_string())
            .and_then(|v| serde_json::to_value(v).ok());
        match seeded {
            Some(bundle) => {
                let reported = match store.registry().validate_config(channel, &bundle) {
                    Ok(()) => ChannelStatus::Configured,
                    Err(e) => {
                        tracing::warn!(
                            channel = %channel,
                            error = %e,
                            "Seeded credentials failed validation"
                        );
                        ChannelStatus::NotConfigured
                    }
                };
                store.load(channel, bundle, reported);
            }
            None => {
                store.load(
                    channel,
                    serde_json::Value::Object(Default::default()),
                    ChannelStatus::NotConfigured,
                );
            }
        }
    }
}

fn seed_directory(config: &ServerConfig) -> StaticDirectory {
    let mut directory = StaticDirectory::new();
    for seed in &config.recipients {
        let role: RecipientRole = match seed.role.parse() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(role = %seed.role, error = %e, "Skipping seeded recipient");
                continue;
            }
        };
        directory.add(
            role,
            RecipientCandidate {
                id: seed.id.clone(),
                name: seed.name.clone(),
                email: seed.email.clone(),
                phone: seed.phone.clone(),
                device_token: seed.device_token.clone(),
            },
        );
    }
    directory
}
