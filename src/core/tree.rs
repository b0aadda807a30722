use crate::core::extractor::AddressMatcher;
use crate::types::{EnrichmentMap, Scalar, Value};

/// Replace every string leaf that is a key of `map` with its annotation.
/// Strings of the legacy form `... (<address>)` are replaced too when the
/// inner address is a key. Shape and key order are preserved.
pub fn inject(matcher: &AddressMatcher, tree: &Value, map: &EnrichmentMap) -> Value {
    if map.is_empty() {
        return tree.clone();
    }
    match tree {
        Value::Scalar(Scalar::String(leaf)) => map
            .get(leaf)
            .or_else(|| matcher.wrapped_address(leaf).and_then(|inner| map.get(inner)))
            .map(|annotation| Value::Annotation(annotation.clone()))
            .unwrap_or_else(|| tree.clone()),
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| inject(matcher, item, map))
                .collect(),
        ),
        Value::Keyed(entries) => Value::Keyed(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), inject(matcher, value, map)))
                .collect(),
        ),
        Value::Scalar(_) | Value::Annotation(_) => tree.clone(),
    }
}

/// Replace every annotation with the bare address it carries.
pub fn strip(tree: &Value) -> Value {
    match tree {
        Value::Annotation(annotation) => Value::string(annotation.address()),
        Value::Sequence(items) => Value::Sequence(items.iter().map(strip).collect()),
        Value::Keyed(entries) => Value::Keyed(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), strip(value)))
                .collect(),
        ),
        Value::Scalar(_) => tree.clone(),
    }
}

/// [`strip`] over plain JSON, recognising annotations by their tag.
pub fn strip_json(tree: serde_json::Value) -> serde_json::Value {
    strip(&Value::from(tree)).to_json()
}
