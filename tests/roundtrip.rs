use std::collections::HashSet;

use serde_json::json;
use solana_account_enricher::core::tree::inject;
use solana_account_enricher::{
    extract_addresses, strip, strip_json, AddressMatcher, EnrichmentAnnotation, EnrichmentMap,
    LabeledAnnotation, TokenAnnotation, Value,
};

mod common;

use common::key;

fn labeled(address: &str, label: &str) -> EnrichmentAnnotation {
    EnrichmentAnnotation::Labeled(LabeledAnnotation {
        address: address.to_string(),
        label: label.to_string(),
    })
}

fn holding(address: &str, mint: &str) -> EnrichmentAnnotation {
    EnrichmentAnnotation::Token(TokenAnnotation {
        address: address.to_string(),
        mint: mint.to_string(),
        symbol: "TKN".to_string(),
        decimals: 2,
        formatted_balance: Some("1,000.5".to_string()),
        icon_url: Some(format!("/icons/{mint}.png")),
        name: None,
        label: Some("hot wallet".to_string()),
    })
}

fn decoded_tree() -> Value {
    Value::from(json!({
        "discriminator": [12, 200, 7],
        "authority": key(1),
        "config": {
            "feeRecipient": key(2),
            "enabled": true,
            "ratio": 0.25,
            "nested": [[key(1), null], { "vault": key(3) }],
        },
        "memo": "transfer to treasury",
        "owner": null,
    }))
}

#[test]
fn strip_inverts_inject() {
    let tree = decoded_tree();
    let mut map = EnrichmentMap::new();
    map.insert(key(1), labeled(&key(1), "Multisig"));
    map.insert(key(3), holding(&key(3), &key(9)));

    let injected = inject(&AddressMatcher::default(), &tree, &map);

    assert_ne!(injected, tree);
    assert_eq!(
        injected.get("authority").and_then(Value::as_annotation),
        Some(&labeled(&key(1), "Multisig"))
    );
    // Not in the map, untouched.
    assert_eq!(
        injected.get("config").and_then(|c| c.get("feeRecipient")),
        Some(&Value::string(key(2)))
    );
    assert_eq!(strip(&injected), tree);
}

#[test]
fn round_trip_survives_json_serialisation() {
    let tree = decoded_tree();
    let mut map = EnrichmentMap::new();
    map.insert(key(2), holding(&key(2), &key(8)));

    let injected = inject(&AddressMatcher::default(), &tree, &map);
    let stored = serde_json::to_value(&injected).unwrap();
    assert_eq!(stored["config"]["feeRecipient"]["__enriched"], "token");
    assert_eq!(stored["config"]["feeRecipient"]["formattedBalance"], "1,000.5");

    assert_eq!(strip_json(stored), tree.to_json());
}

#[test]
fn strip_leaves_plain_trees_alone() {
    let tree = decoded_tree();
    assert_eq!(strip(&tree), tree);
    assert_eq!(strip(&strip(&tree)), tree);
}

#[test]
fn extraction_of_a_flattened_set_is_identity() {
    let set: HashSet<String> = (1..=40).map(key).collect();
    let flattened = Value::Sequence(
        set.iter()
            .map(|address| Value::string(address.as_str()))
            .collect(),
    );

    let extracted: HashSet<String> = extract_addresses(&flattened).into_iter().collect();
    assert_eq!(extracted, set);

    let nested = Value::keyed([("all", flattened.clone()), ("again", flattened)]);
    assert_eq!(extract_addresses(&nested).len(), set.len());
}

#[test]
fn extraction_sees_through_injected_annotations() {
    let tree = decoded_tree();
    let mut map = EnrichmentMap::new();
    map.insert(key(3), holding(&key(3), &key(9)));

    let injected = inject(&AddressMatcher::default(), &tree, &map);
    assert_eq!(extract_addresses(&injected), extract_addresses(&tree));
    assert_eq!(extract_addresses(&tree), vec![key(1), key(2), key(3)]);
}
