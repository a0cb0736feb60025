use crate::error::{CatalogError, Result};
use relaypost_common::types::{Channel, RecipientRole};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Channel-specific message content. The shape depends on the channel:
/// email carries a subject, push carries a title, sms/whatsapp are
/// body-only. Empty strings are valid (and render to empty messages).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelContent {
    Email { subject: String, body: String },
    Sms { body: String },
    Whatsapp { body: String },
    Push { title: String, body: String },
}

/// Addressable leaf fields for the single mutation primitive
/// [`NotificationTemplate::with_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TemplateField {
    Subject,
    Title,
    Body,
}

impl std::fmt::Display for TemplateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateField::Subject => write!(f, "subject"),
            TemplateField::Title => write!(f, "title"),
            TemplateField::Body => write!(f, "body"),
        }
    }
}

impl ChannelContent {
    /// The all-empty content for a channel. Every (role, channel) leaf of a
    /// template starts here, so renderers never meet a missing leaf.
    pub fn empty_for(channel: Channel) -> Self {
        match channel {
            Channel::Email => ChannelContent::Email {
                subject: String::new(),
                body: String::new(),
            },
            Channel::Sms => ChannelContent::Sms { body: String::new() },
            Channel::Whatsapp => ChannelContent::Whatsapp { body: String::new() },
            Channel::Push => ChannelContent::Push {
                title: String::new(),
                body: String::new(),
            },
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            ChannelContent::Email { .. } => Channel::Email,
            ChannelContent::Sms { .. } => Channel::Sms,
            ChannelContent::Whatsapp { .. } => Channel::Whatsapp,
            ChannelContent::Push { .. } => Channel::Push,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            ChannelContent::Email { body, .. }
            | ChannelContent::Sms { body }
            | ChannelContent::Whatsapp { body }
            | ChannelContent::Push { body, .. } => body,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            ChannelContent::Email { subject, .. } => Some(subject),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ChannelContent::Push { title, .. } => Some(title),
            _ => None,
        }
    }

    /// True when every field of the leaf is empty.
    pub fn is_blank(&self) -> bool {
        match self {
            ChannelContent::Email { subject, body } => subject.is_empty() && body.is_empty(),
            ChannelContent::Sms { body } | ChannelContent::Whatsapp { body } => body.is_empty(),
            ChannelContent::Push { title, body } => title.is_empty() && body.is_empty(),
        }
    }

    /// Set one field, rejecting fields the channel does not have.
    pub fn set_field(&mut self, field: TemplateField, value: String) -> Result<()> {
        match (self, field) {
            (ChannelContent::Email { subject, .. }, TemplateField::Subject) => *subject = value,
            (ChannelContent::Push { title, .. }, TemplateField::Title) => *title = value,
            (
                ChannelContent::Email { body, .. }
                | ChannelContent::Sms { body }
                | ChannelContent::Whatsapp { body }
                | ChannelContent::Push { body, .. },
                TemplateField::Body,
            ) => *body = value,
            (content, field) => {
                return Err(CatalogError::InvalidField {
                    channel: content.channel().to_string(),
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// One row of the normalized content table, as carried on the wire:
/// `(role, channel)` composite key plus the channel's fields. `subject`
/// and `title` are present only where the channel defines them.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContentRow {
    pub role: RecipientRole,
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
}

impl ContentRow {
    fn into_content(self) -> ChannelContent {
        match self.channel {
            Channel::Email => ChannelContent::Email {
                subject: self.subject.unwrap_or_default(),
                body: self.body,
            },
            Channel::Sms => ChannelContent::Sms { body: self.body },
            Channel::Whatsapp => ChannelContent::Whatsapp { body: self.body },
            Channel::Push => ChannelContent::Push {
                title: self.title.unwrap_or_default(),
                body: self.body,
            },
        }
    }

    fn from_content(role: RecipientRole, content: &ChannelContent) -> Self {
        Self {
            role,
            channel: content.channel(),
            subject: content.subject().map(str::to_string),
            title: content.title().map(str::to_string),
            body: content.body().to_string(),
        }
    }
}

/// The normalized (role, channel) → content table. The constructor
/// materializes every role × channel leaf, making the "every leaf
/// exists" invariant structural instead of conventional.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTable(BTreeMap<(RecipientRole, Channel), ChannelContent>);

impl ContentTable {
    pub fn full() -> Self {
        let mut map = BTreeMap::new();
        for role in RecipientRole::ALL {
            for channel in Channel::ALL {
                map.insert((role, channel), ChannelContent::empty_for(channel));
            }
        }
        Self(map)
    }

    pub fn get(&self, role: RecipientRole, channel: Channel) -> &ChannelContent {
        // The constructor and deserializer materialize all leaves.
        &self.0[&(role, channel)]
    }

    fn get_mut(&mut self, role: RecipientRole, channel: Channel) -> &mut ChannelContent {
        self.0
            .entry((role, channel))
            .or_insert_with(|| ChannelContent::empty_for(channel))
    }

    /// Replace one leaf wholesale; the content's channel wins over
    /// whatever was stored before.
    pub fn set(&mut self, role: RecipientRole, content: ChannelContent) {
        self.0.insert((role, content.channel()), content);
    }

    pub fn rows(&self) -> Vec<ContentRow> {
        self.0
            .iter()
            .map(|((role, _), content)| ContentRow::from_content(*role, content))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(RecipientRole, Channel), &ChannelContent)> {
        self.0.iter()
    }
}

impl Default for ContentTable {
    fn default() -> Self {
        Self::full()
    }
}

impl Serialize for ContentTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<ContentRow>::deserialize(deserializer)?;
        // Start from the full table so missing rows come out as empty
        // leaves rather than missing keys.
        let mut table = ContentTable::full();
        for row in rows {
            let role = row.role;
            table.0.insert((role, row.channel), row.into_content());
        }
        Ok(table)
    }
}

/// Message templates for one event: the per-role per-channel content
/// table plus the ordered placeholder vocabulary valid for the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotificationTemplate {
    pub id: String,
    /// Foreign key to the owning event; one template record per event.
    pub event_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Placeholder names valid for this event, in display order.
    pub placeholders: Vec<String>,
    #[schema(value_type = Vec<ContentRow>)]
    pub contents: ContentTable,
}

impl NotificationTemplate {
    pub fn new(
        id: impl Into<String>,
        event_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        placeholders: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            placeholders,
            contents: ContentTable::full(),
        }
    }

    /// The full four-channel bundle for `role`. Roles the event disallows
    /// still get a bundle (all-empty by construction); callers decide
    /// whether a role is reachable, the store does not.
    pub fn content_for(&self, role: RecipientRole) -> BTreeMap<Channel, &ChannelContent> {
        Channel::ALL
            .iter()
            .map(|ch| (*ch, self.contents.get(role, *ch)))
            .collect()
    }

    /// Immutable-style single-leaf update: returns a new record with
    /// exactly one field changed, every other leaf untouched. This is the
    /// only mutation primitive; all editing flows reduce to it.
    pub fn with_field(
        &self,
        role: RecipientRole,
        channel: Channel,
        field: TemplateField,
        value: impl Into<String>,
    ) -> Result<Self> {
        let mut next = self.clone();
        next.contents
            .get_mut(role, channel)
            .set_field(field, value.into())?;
        Ok(next)
    }
}

/// The default active tab when a template editor opens: the first of the
/// event's recipient roles in the fixed admin → retailer → customer
/// order. Ephemeral UI state, never persisted.
pub fn default_role(recipients: &BTreeSet<RecipientRole>) -> Option<RecipientRole> {
    recipients.iter().next().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_template_has_all_leaves() {
        let t = NotificationTemplate::new("t1", "e1", "n", "d", "c", vec![]);
        for role in RecipientRole::ALL {
            for ch in Channel::ALL {
                let leaf = t.contents.get(role, ch);
                assert_eq!(leaf.channel(), ch);
                assert!(leaf.is_blank());
            }
        }
    }

    #[test]
    fn with_field_changes_exactly_one_leaf() {
        let t = NotificationTemplate::new("t1", "e1", "n", "d", "c", vec![]);
        let updated = t
            .with_field(
                RecipientRole::Customer,
                Channel::Email,
                TemplateField::Subject,
                "X",
            )
            .unwrap();

        for role in RecipientRole::ALL {
            for ch in Channel::ALL {
                let before = t.contents.get(role, ch);
                let after = updated.contents.get(role, ch);
                if role == RecipientRole::Customer && ch == Channel::Email {
                    assert_eq!(after.subject(), Some("X"));
                    assert_eq!(after.body(), "");
                } else {
                    assert_eq!(before, after);
                }
            }
        }
        // original untouched
        assert!(t.contents.get(RecipientRole::Customer, Channel::Email).is_blank());
    }

    #[test]
    fn invalid_field_is_rejected() {
        let t = NotificationTemplate::new("t1", "e1", "n", "d", "c", vec![]);
        let err = t
            .with_field(RecipientRole::Admin, Channel::Sms, TemplateField::Subject, "X")
            .unwrap_err();
        assert!(err.to_string().contains("subject"));
    }

    #[test]
    fn content_bundle_exists_for_unreachable_roles() {
        let t = NotificationTemplate::new("t1", "e1", "n", "d", "c", vec![]);
        let bundle = t.content_for(RecipientRole::Admin);
        assert_eq!(bundle.len(), 4);
        assert!(bundle.values().all(|c| c.is_blank()));
    }

    #[test]
    fn default_role_follows_fixed_order() {
        let set: BTreeSet<_> = [RecipientRole::Customer, RecipientRole::Retailer]
            .into_iter()
            .collect();
        assert_eq!(default_role(&set), Some(RecipientRole::Retailer));
        assert_eq!(default_role(&BTreeSet::new()), None);
    }

    #[test]
    fn content_table_roundtrips_sparse_json() {
        let json = serde_json::json!([
            {"role": "retailer", "channel": "email", "subject": "S", "body": "B"}
        ]);
        let table: ContentTable = serde_json::from_value(json).unwrap();
        assert_eq!(
            table.get(RecipientRole::Retailer, Channel::Email).subject(),
            Some("S")
        );
        // Missing rows materialize as empty leaves.
        assert!(table.get(RecipientRole::Admin, Channel::Push).is_blank());
    }
}
