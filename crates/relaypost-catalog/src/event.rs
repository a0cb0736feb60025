use relaypost_common::types::{Channel, RecipientRole};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One business event the platform can notify about, e.g.
/// `retailer_approved`. The event is the authoritative switchboard row:
/// which recipient roles are addressed, which channels are enabled, and
/// a master `enabled` switch.
///
/// When `enabled` is false the recipient/channel state is inert but is
/// kept verbatim, so re-enabling restores the prior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotificationEvent {
    /// Stable string key, e.g. `retailer_approved`.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Grouping label for display; not a separate owned entity.
    pub category: String,
    #[schema(value_type = Vec<RecipientRole>)]
    pub recipients: BTreeSet<RecipientRole>,
    /// Always carries exactly the four channel keys; see
    /// [`NotificationEvent::normalize`].
    #[schema(value_type = std::collections::BTreeMap<String, bool>)]
    pub channels: BTreeMap<Channel, bool>,
    pub enabled: bool,
}

impl NotificationEvent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            recipients: BTreeSet::new(),
            channels: Channel::ALL.iter().map(|c| (*c, false)).collect(),
            enabled: true,
        }
    }

    /// Ensure `channels` carries exactly the four channel keys. Input from
    /// the backing API may omit keys (treated as disabled); unknown keys
    /// cannot occur because [`Channel`] is a closed enum.
    pub fn normalize(&mut self) {
        for ch in Channel::ALL {
            self.channels.entry(ch).or_insert(false);
        }
    }

    /// Flip the master switch. Recipient and channel state is deliberately
    /// left untouched.
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Flip one channel flag. Note there is no `enabled` guard here: the
    /// UI disables interaction on a disabled event, but the data layer
    /// accepts the mutation so shadow configuration survives re-enabling.
    pub fn toggle_channel(&mut self, channel: Channel) {
        let flag = self.channels.entry(channel).or_insert(false);
        *flag = !*flag;
    }

    /// Add or remove `role` from the recipient set (symmetric difference).
    /// Same no-guard note as [`NotificationEvent::toggle_channel`].
    pub fn toggle_recipient(&mut self, role: RecipientRole) {
        if !self.recipients.remove(&role) {
            self.recipients.insert(role);
        }
    }

    pub fn channel_enabled(&self, channel: Channel) -> bool {
        self.channels.get(&channel).copied().unwrap_or(false)
    }

    pub fn addresses_role(&self, role: RecipientRole) -> bool {
        self.recipients.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NotificationEvent {
        let mut ev = NotificationEvent::new(
            "retailer_approved",
            "Retailer Approved",
            "A retailer account passed review",
            "Retailer",
        );
        ev.recipients.insert(RecipientRole::Retailer);
        ev.toggle_channel(Channel::Email);
        ev
    }

    #[test]
    fn double_toggle_restores_event() {
        let mut ev = sample();
        let before = ev.clone();
        ev.toggle();
        assert!(!ev.enabled);
        assert_eq!(ev.recipients, before.recipients);
        assert_eq!(ev.channels, before.channels);
        ev.toggle();
        assert_eq!(ev, before);
    }

    #[test]
    fn double_toggle_recipient_restores_set() {
        let mut ev = sample();
        let before = ev.recipients.clone();
        ev.toggle_recipient(RecipientRole::Customer);
        assert!(ev.addresses_role(RecipientRole::Customer));
        ev.toggle_recipient(RecipientRole::Customer);
        assert_eq!(ev.recipients, before);
    }

    #[test]
    fn toggles_mutate_even_when_disabled() {
        let mut ev = sample();
        ev.toggle();
        assert!(!ev.enabled);
        ev.toggle_channel(Channel::Sms);
        ev.toggle_recipient(RecipientRole::Admin);
        assert!(ev.channel_enabled(Channel::Sms));
        assert!(ev.addresses_role(RecipientRole::Admin));
    }

    #[test]
    fn normalize_fills_missing_channel_keys() {
        let mut ev = sample();
        ev.channels.remove(&Channel::Push);
        ev.normalize();
        assert_eq!(ev.channels.len(), 4);
        assert!(!ev.channel_enabled(Channel::Push));
    }
}
