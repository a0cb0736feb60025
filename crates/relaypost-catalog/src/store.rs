use crate::error::{CatalogError, Result};
use crate::event::NotificationEvent;
use crate::template::{NotificationTemplate, TemplateField};
use relaypost_common::types::{Channel, RecipientRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full configuration document exchanged with the backing API:
/// an idempotent full-replace payload in both directions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConfigDocument {
    pub events: Vec<NotificationEvent>,
    pub templates: Vec<NotificationTemplate>,
}

/// Owned, in-memory catalog state: the event switchboard plus one
/// template record per event.
///
/// Single-writer: mutations come from the admin surface one
/// request at a time, and persistence happens only on an explicit save
/// (the store itself never talks to the backing service). Toggles on a
/// disabled event still mutate state: that shadow configuration is kept
/// so re-enabling restores what the operator had set up.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    events: Vec<NotificationEvent>,
    templates: Vec<NotificationTemplate>,
}

impl CatalogStore {
    /// Build a store from raw parts, normalizing every record so the
    /// channel-key and content-leaf invariants hold regardless of what the
    /// backing API sent.
    pub fn from_parts(
        events: Vec<NotificationEvent>,
        templates: Vec<NotificationTemplate>,
    ) -> Self {
        let mut store = Self { events, templates };
        store.normalize();
        store
    }

    fn normalize(&mut self) {
        for ev in &mut self.events {
            ev.normalize();
        }
        // ContentTable deserialization already materializes missing leaves;
        // nothing further to do for templates.
    }

    /// Replace the whole catalog with `doc` (idempotent full replace).
    pub fn replace(&mut self, doc: ConfigDocument) {
        self.events = doc.events;
        self.templates = doc.templates;
        self.normalize();
    }

    /// Snapshot for the save/load contract with the backing API.
    pub fn snapshot(&self) -> ConfigDocument {
        ConfigDocument {
            events: self.events.clone(),
            templates: self.templates.clone(),
        }
    }

    pub fn events(&self) -> &[NotificationEvent] {
        &self.events
    }

    pub fn event(&self, event_id: &str) -> Result<&NotificationEvent> {
        self.events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| CatalogError::NotFound {
                entity: "event",
                id: event_id.to_string(),
            })
    }

    fn event_mut(&mut self, event_id: &str) -> Result<&mut NotificationEvent> {
        self.events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| CatalogError::NotFound {
                entity: "event",
                id: event_id.to_string(),
            })
    }

    /// Events grouped by their category label, for display.
    pub fn events_by_category(&self) -> BTreeMap<&str, Vec<&NotificationEvent>> {
        let mut grouped: BTreeMap<&str, Vec<&NotificationEvent>> = BTreeMap::new();
        for ev in &self.events {
            grouped.entry(ev.category.as_str()).or_default().push(ev);
        }
        grouped
    }

    pub fn toggle_event(&mut self, event_id: &str) -> Result<&NotificationEvent> {
        let ev = self.event_mut(event_id)?;
        ev.toggle();
        Ok(ev)
    }

    pub fn toggle_channel(&mut self, event_id: &str, channel: Channel) -> Result<&NotificationEvent> {
        let ev = self.event_mut(event_id)?;
        ev.toggle_channel(channel);
        Ok(ev)
    }

    pub fn toggle_recipient(
        &mut self,
        event_id: &str,
        role: RecipientRole,
    ) -> Result<&NotificationEvent> {
        let ev = self.event_mut(event_id)?;
        ev.toggle_recipient(role);
        Ok(ev)
    }

    pub fn templates(&self) -> &[NotificationTemplate] {
        &self.templates
    }

    pub fn template(&self, template_id: &str) -> Result<&NotificationTemplate> {
        self.templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| CatalogError::NotFound {
                entity: "template",
                id: template_id.to_string(),
            })
    }

    /// The one template record owned by `event_id`.
    pub fn template_for_event(&self, event_id: &str) -> Result<&NotificationTemplate> {
        self.templates
            .iter()
            .find(|t| t.event_id == event_id)
            .ok_or_else(|| CatalogError::NotFound {
                entity: "template",
                id: event_id.to_string(),
            })
    }

    /// Apply the single-leaf mutation primitive and store the resulting
    /// record. Returns the updated template.
    pub fn update_template_field(
        &mut self,
        template_id: &str,
        role: RecipientRole,
        channel: Channel,
        field: TemplateField,
        value: &str,
    ) -> Result<&NotificationTemplate> {
        let pos = self
            .templates
            .iter()
            .position(|t| t.id == template_id)
            .ok_or_else(|| CatalogError::NotFound {
                entity: "template",
                id: template_id.to_string(),
            })?;
        let updated = self.templates[pos].with_field(role, channel, field, value)?;
        self.templates[pos] = updated;
        Ok(&self.templates[pos])
    }
}
