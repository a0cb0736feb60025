//! Built-in default catalog for first-time startup.
//!
//! Mirrors the admin console's factory state: every business event the
//! platform knows about, with conservative channel defaults (email on,
//! everything else off except where noted) and starter template copy the
//! operator is expected to adjust. Loaded once through [`load_defaults`]
//! into an owned [`CatalogStore`]; a non-empty payload from the backing
//! API replaces it wholesale.

use crate::event::NotificationEvent;
use crate::store::CatalogStore;
use crate::template::{ChannelContent, NotificationTemplate};
use relaypost_common::types::{Channel, RecipientRole};

struct EventDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    recipients: &'static [RecipientRole],
    channels: &'static [Channel],
    placeholders: &'static [&'static str],
}

const DEFAULT_EVENTS: &[EventDef] = &[
    EventDef {
        id: "retailer_registered",
        name: "New Retailer Registration",
        description: "A retailer submitted a registration and is awaiting review",
        category: "Retailer",
        recipients: &[RecipientRole::Admin],
        channels: &[Channel::Email],
        placeholders: &["app_name", "retailer_name", "retailer_email"],
    },
    EventDef {
        id: "retailer_approved",
        name: "Retailer Account Approved",
        description: "A retailer account passed review and can start selling",
        category: "Retailer",
        recipients: &[RecipientRole::Retailer],
        channels: &[Channel::Email],
        placeholders: &["app_name", "retailer_name"],
    },
    EventDef {
        id: "retailer_rejected",
        name: "Retailer Account Rejected",
        description: "A retailer registration was rejected during review",
        category: "Retailer",
        recipients: &[RecipientRole::Retailer],
        channels: &[Channel::Email],
        placeholders: &["app_name", "retailer_name", "reason"],
    },
    EventDef {
        id: "customer_registered",
        name: "New Customer Signup",
        description: "A customer created an account",
        category: "Customer",
        recipients: &[RecipientRole::Admin, RecipientRole::Customer],
        channels: &[Channel::Email],
        placeholders: &["app_name", "customer_name"],
    },
    EventDef {
        id: "offer_published",
        name: "New Offer Published",
        description: "A retailer published a new offer to their followers",
        category: "Offers",
        recipients: &[RecipientRole::Customer],
        channels: &[Channel::Email, Channel::Push],
        placeholders: &["app_name", "retailer_name", "offer_title"],
    },
    EventDef {
        id: "offer_expiring",
        name: "Offer Expiring Soon",
        description: "A published offer approaches its end date",
        category: "Offers",
        recipients: &[RecipientRole::Retailer],
        channels: &[Channel::Email, Channel::Push],
        placeholders: &["app_name", "offer_title", "expiry_date"],
    },
    EventDef {
        id: "subscription_expiring",
        name: "Subscription Expiring Soon",
        description: "A retailer's paid plan approaches its renewal date",
        category: "Subscription",
        recipients: &[RecipientRole::Retailer],
        channels: &[Channel::Email, Channel::Sms, Channel::Whatsapp],
        placeholders: &["app_name", "retailer_name", "plan_name", "expiry_date"],
    },
    EventDef {
        id: "subscription_renewed",
        name: "Subscription Renewed",
        description: "A retailer's paid plan was renewed",
        category: "Subscription",
        recipients: &[RecipientRole::Admin, RecipientRole::Retailer],
        channels: &[Channel::Email],
        placeholders: &["app_name", "retailer_name", "plan_name"],
    },
];

fn email(subject: &str, body: &str) -> ChannelContent {
    ChannelContent::Email {
        subject: subject.to_string(),
        body: body.to_string(),
    }
}

fn sms(body: &str) -> ChannelContent {
    ChannelContent::Sms {
        body: body.to_string(),
    }
}

fn whatsapp(body: &str) -> ChannelContent {
    ChannelContent::Whatsapp {
        body: body.to_string(),
    }
}

fn push(title: &str, body: &str) -> ChannelContent {
    ChannelContent::Push {
        title: title.to_string(),
        body: body.to_string(),
    }
}

fn seed_contents(template: &mut NotificationTemplate) {
    use RecipientRole::{Admin, Customer, Retailer};

    let t = &mut template.contents;
    match template.event_id.as_str() {
        "retailer_registered" => {
            t.set(
                Admin,
                email(
                    "New retailer registration on {{app_name}}",
                    "{{retailer_name}} ({{retailer_email}}) registered as a retailer and is awaiting review.",
                ),
            );
        }
        "retailer_approved" => {
            t.set(
                Retailer,
                email(
                    "Congratulations! Your {{app_name}} Retailer Account is Approved",
                    "Hi {{retailer_name}},\n\nYour retailer account on {{app_name}} has been approved. You can now sign in and start publishing offers.\n\nThe {{app_name}} Team",
                ),
            );
            t.set(
                Retailer,
                sms("{{app_name}}: your retailer account is approved. Welcome aboard, {{retailer_name}}!"),
            );
            t.set(
                Retailer,
                whatsapp("Hi {{retailer_name}}, your {{app_name}} retailer account is approved. Welcome aboard!"),
            );
            t.set(
                Retailer,
                push("Account approved", "Your {{app_name}} retailer account is ready."),
            );
        }
        "retailer_rejected" => {
            t.set(
                Retailer,
                email(
                    "Your {{app_name}} retailer registration",
                    "Hi {{retailer_name}},\n\nWe could not approve your retailer registration: {{reason}}.\n\nYou can update your details and apply again.",
                ),
            );
        }
        "customer_registered" => {
            t.set(
                Admin,
                email(
                    "New customer signup on {{app_name}}",
                    "{{customer_name}} just created a customer account.",
                ),
            );
            t.set(
                Customer,
                email(
                    "Welcome to {{app_name}}!",
                    "Hi {{customer_name}},\n\nWelcome to {{app_name}}. Follow your favorite retailers to get their latest offers first.",
                ),
            );
        }
        "offer_published" => {
            t.set(
                Customer,
                email(
                    "{{retailer_name}} published a new offer",
                    "{{offer_title}} is now live on {{app_name}}. Have a look before it's gone.",
                ),
            );
            t.set(
                Customer,
                push("New offer from {{retailer_name}}", "{{offer_title}}"),
            );
        }
        "offer_expiring" => {
            t.set(
                Retailer,
                email(
                    "Your offer \"{{offer_title}}\" expires on {{expiry_date}}",
                    "Your offer {{offer_title}} on {{app_name}} ends on {{expiry_date}}. Extend it from your dashboard to keep it visible.",
                ),
            );
            t.set(
                Retailer,
                push("Offer expiring", "{{offer_title}} ends on {{expiry_date}}."),
            );
        }
        "subscription_expiring" => {
            t.set(
                Retailer,
                email(
                    "Your {{app_name}} {{plan_name}} plan expires on {{expiry_date}}",
                    "Hi {{retailer_name}},\n\nYour {{plan_name}} subscription expires on {{expiry_date}}. Renew now to keep your offers visible on {{app_name}}.",
                ),
            );
            t.set(
                Retailer,
                sms("{{app_name}}: your {{plan_name}} plan expires {{expiry_date}}. Renew to stay visible."),
            );
            t.set(
                Retailer,
                whatsapp("Hi {{retailer_name}}, your {{app_name}} {{plan_name}} plan expires on {{expiry_date}}. Renew from your dashboard to avoid interruption."),
            );
        }
        "subscription_renewed" => {
            t.set(
                Admin,
                email(
                    "Subscription renewed: {{retailer_name}}",
                    "{{retailer_name}} renewed the {{plan_name}} plan.",
                ),
            );
            t.set(
                Retailer,
                email(
                    "Your {{app_name}} subscription is renewed",
                    "Hi {{retailer_name}},\n\nThanks! Your {{plan_name}} plan has been renewed.",
                ),
            );
        }
        _ => {}
    }
}

/// Build the factory-default catalog. Called once at session start; any
/// non-empty configuration returned by the backing API replaces it.
pub fn load_defaults() -> CatalogStore {
    let mut events = Vec::with_capacity(DEFAULT_EVENTS.len());
    let mut templates = Vec::with_capacity(DEFAULT_EVENTS.len());

    for def in DEFAULT_EVENTS {
        let mut ev = NotificationEvent::new(def.id, def.name, def.description, def.category);
        for role in def.recipients {
            ev.recipients.insert(*role);
        }
        for ch in def.channels {
            ev.channels.insert(*ch, true);
        }
        events.push(ev);

        let mut tpl = NotificationTemplate::new(
            format!("tpl_{}", def.id),
            def.id,
            def.name,
            def.description,
            def.category,
            def.placeholders.iter().map(|p| p.to_string()).collect(),
        );
        seed_contents(&mut tpl);
        templates.push(tpl);
    }

    tracing::debug!(
        events = events.len(),
        templates = templates.len(),
        "Loaded built-in default catalog"
    );
    CatalogStore::from_parts(events, templates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pair_events_with_templates() {
        let store = load_defaults();
        assert_eq!(store.events().len(), store.templates().len());
        for ev in store.events() {
            let tpl = store.template_for_event(&ev.id).unwrap();
            assert_eq!(tpl.event_id, ev.id);
            assert!(ev.channels.len() == 4);
        }
    }

    #[test]
    fn retailer_approved_defaults_match_console_copy() {
        let store = load_defaults();
        let ev = store.event("retailer_approved").unwrap();
        assert!(ev.addresses_role(RecipientRole::Retailer));
        assert!(ev.channel_enabled(Channel::Email));

        let tpl = store.template_for_event("retailer_approved").unwrap();
        let leaf = tpl.contents.get(RecipientRole::Retailer, Channel::Email);
        assert_eq!(
            leaf.subject(),
            Some("Congratulations! Your {{app_name}} Retailer Account is Approved")
        );
    }

    #[test]
    fn every_placeholder_in_seed_copy_is_declared() {
        let store = load_defaults();
        for tpl in store.templates() {
            for (_, content) in tpl.contents.iter() {
                let mut text = content.body().to_string();
                if let Some(s) = content.subject() {
                    text.push_str(s);
                }
                if let Some(ti) = content.title() {
                    text.push_str(ti);
                }
                for name in crate::render::placeholder_names(&text) {
                    assert!(
                        tpl.placeholders.contains(&name),
                        "template {} uses undeclared placeholder {name}",
                        tpl.id
                    );
                }
            }
        }
    }
}
