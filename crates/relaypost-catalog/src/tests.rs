use crate::defaults::load_defaults;
use crate::render::render;
use crate::store::CatalogStore;
use crate::template::TemplateField;
use relaypost_common::types::{Channel, RecipientRole};
use std::collections::HashMap;

#[test]
fn retailer_approved_subject_renders_end_to_end() {
    let store = load_defaults();
    let ev = store.event("retailer_approved").unwrap();
    assert!(ev.addresses_role(RecipientRole::Retailer));
    assert!(ev.channel_enabled(Channel::Email));

    let tpl = store.template_for_event("retailer_approved").unwrap();
    let leaf = tpl.contents.get(RecipientRole::Retailer, Channel::Email);

    let values = HashMap::from([("app_name".to_string(), "TrendPin".to_string())]);
    let subject = render(leaf.subject().unwrap(), &values);
    assert_eq!(
        subject,
        "Congratulations! Your TrendPin Retailer Account is Approved"
    );
}

#[test]
fn full_replace_is_idempotent() {
    let mut store = load_defaults();
    let doc = store.snapshot();
    store.replace(doc.clone());
    let after_once = store.snapshot();
    store.replace(doc);
    let after_twice = store.snapshot();

    assert_eq!(
        serde_json::to_value(&after_once).unwrap(),
        serde_json::to_value(&after_twice).unwrap()
    );
}

#[test]
fn store_field_update_touches_one_leaf_only() {
    let mut store = load_defaults();
    let before = store.template("tpl_retailer_approved").unwrap().clone();

    store
        .update_template_field(
            "tpl_retailer_approved",
            RecipientRole::Customer,
            Channel::Email,
            TemplateField::Subject,
            "X",
        )
        .unwrap();

    let after = store.template("tpl_retailer_approved").unwrap();
    for role in RecipientRole::ALL {
        for ch in Channel::ALL {
            let before_leaf = before.contents.get(role, ch);
            let after_leaf = after.contents.get(role, ch);
            if role == RecipientRole::Customer && ch == Channel::Email {
                assert_eq!(after_leaf.subject(), Some("X"));
            } else {
                assert_eq!(before_leaf, after_leaf, "leaf ({role}, {ch}) changed");
            }
        }
    }
}

#[test]
fn double_toggles_restore_catalog_state() {
    let mut store = load_defaults();
    let before = serde_json::to_value(store.snapshot()).unwrap();

    store.toggle_event("retailer_approved").unwrap();
    store.toggle_event("retailer_approved").unwrap();
    store
        .toggle_recipient("retailer_approved", RecipientRole::Admin)
        .unwrap();
    store
        .toggle_recipient("retailer_approved", RecipientRole::Admin)
        .unwrap();
    store
        .toggle_channel("retailer_approved", Channel::Push)
        .unwrap();
    store
        .toggle_channel("retailer_approved", Channel::Push)
        .unwrap();

    assert_eq!(serde_json::to_value(store.snapshot()).unwrap(), before);
}

#[test]
fn unknown_ids_surface_not_found() {
    let mut store = load_defaults();
    assert!(store.event("no_such_event").is_err());
    assert!(store.toggle_event("no_such_event").is_err());
    assert!(store.template_for_event("no_such_event").is_err());
    assert!(store
        .update_template_field(
            "no_such_template",
            RecipientRole::Admin,
            Channel::Email,
            TemplateField::Body,
            "x",
        )
        .is_err());
}

#[test]
fn category_grouping_copies_label_from_events() {
    let store = load_defaults();
    let grouped = store.events_by_category();
    assert!(grouped.contains_key("Retailer"));
    assert!(grouped.contains_key("Subscription"));
    let retailer_events = &grouped["Retailer"];
    assert!(retailer_events.iter().all(|e| e.category == "Retailer"));
    assert!(retailer_events.iter().any(|e| e.id == "retailer_approved"));
}

#[test]
fn config_document_roundtrips_through_json() {
    let store = load_defaults();
    let doc = store.snapshot();
    let json = serde_json::to_string(&doc).unwrap();
    let parsed: crate::store::ConfigDocument = serde_json::from_str(&json).unwrap();
    let rebuilt = CatalogStore::from_parts(parsed.events, parsed.templates);
    assert_eq!(
        serde_json::to_value(rebuilt.snapshot()).unwrap(),
        serde_json::to_value(store.snapshot()).unwrap()
    );
}
