use std::borrow::Cow;
use std::collections::HashMap;

use base64_simd::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

use crate::core::constants::UNKNOWN_SYMBOL;
use crate::core::error::EnrichError;

/// Base-58 account address. Only its shape is ever checked.
pub type Address = String;

/// Address → annotation for one enrichment pass.
pub type EnrichmentMap = HashMap<Address, EnrichmentAnnotation>;

/// Field that marks a JSON object as an annotation produced by this crate.
pub const ANNOTATION_TAG: &str = "__enriched";

/// Account payload as handed over by a resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountData {
    Raw(Vec<u8>),
    /// RPC form, decoded right before classification.
    Base64(String),
}

impl AccountData {
    pub fn decode(&self) -> Result<Cow<'_, [u8]>, EnrichError> {
        match self {
            AccountData::Raw(bytes) => Ok(Cow::Borrowed(bytes)),
            AccountData::Base64(encoded) => STANDARD
                .decode_to_vec(encoded)
                .map(Cow::Owned)
                .map_err(|err| EnrichError::InvalidBase64(err.to_string())),
        }
    }
}

/// Owner and raw bytes of one on-chain account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBlob {
    pub owner: Address,
    pub data: AccountData,
}

impl AccountBlob {
    pub fn raw(owner: impl Into<Address>, data: Vec<u8>) -> Self {
        Self {
            owner: owner.into(),
            data: AccountData::Raw(data),
        }
    }

    pub fn base64(owner: impl Into<Address>, data: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            data: AccountData::Base64(data.into()),
        }
    }
}

/// Outcome of classifying an account blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedAccount {
    TokenHolding { mint: Address, raw_amount: u128 },
    MintRecord { address: Address },
    Unclassified,
}

/// Metadata record as returned by a metadata source; every field optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Resolved metadata for one mint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintMetadata {
    pub symbol: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub icon_url: String,
}

impl MintMetadata {
    pub fn unknown(mint: &str, icon_base_url: &str) -> Self {
        Self::from_record(mint, None, icon_base_url)
    }

    /// The icon URL is always derived from the mint, whatever the source says.
    pub fn from_record(mint: &str, record: Option<&MetadataRecord>, icon_base_url: &str) -> Self {
        let record = record.cloned().unwrap_or_default();
        Self {
            symbol: record.symbol.unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
            decimals: record.decimals.unwrap_or(0),
            name: record.name,
            icon_url: icon_url(icon_base_url, mint),
        }
    }
}

pub fn icon_url(icon_base_url: &str, mint: &str) -> String {
    format!("{}/{}.png", icon_base_url.trim_end_matches('/'), mint)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenAnnotation {
    pub address: Address,
    pub mint: Address,
    pub symbol: String,
    pub decimals: u8,
    /// Only set when `address` is a holding account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LabeledAnnotation {
    pub address: Address,
    pub label: String,
}

/// Structured replacement for an address leaf.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "__enriched", rename_all = "camelCase")]
pub enum EnrichmentAnnotation {
    Token(TokenAnnotation),
    Labeled(LabeledAnnotation),
}

impl EnrichmentAnnotation {
    pub fn address(&self) -> &str {
        match self {
            EnrichmentAnnotation::Token(token) => &token.address,
            EnrichmentAnnotation::Labeled(labeled) => &labeled.address,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            EnrichmentAnnotation::Token(token) => token.label.as_deref(),
            EnrichmentAnnotation::Labeled(labeled) => Some(&labeled.label),
        }
    }

    fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| JsonValue::String(self.address().to_string()))
    }

    fn from_json_object(map: &Map<String, JsonValue>) -> Option<Self> {
        let tagged = matches!(
            map.get(ANNOTATION_TAG).and_then(JsonValue::as_str),
            Some("token" | "labeled")
        );
        if !tagged || !map.get("address").is_some_and(JsonValue::is_string) {
            return None;
        }
        serde_json::from_value(JsonValue::Object(map.clone())).ok()
    }
}

/// Leaf of a decoded tree.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Decoded record tree. Object keys keep their decoded order.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Keyed(Vec<(String, Value)>),
    Annotation(EnrichmentAnnotation),
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::Scalar(Scalar::String(value.into()))
    }

    pub fn keyed<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Keyed(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&EnrichmentAnnotation> {
        match self {
            Value::Annotation(annotation) => Some(annotation),
            _ => None,
        }
    }

    /// Field lookup on keyed nodes.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Keyed(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Scalar(Scalar::Null) => JsonValue::Null,
            Value::Scalar(Scalar::Bool(value)) => JsonValue::Bool(*value),
            Value::Scalar(Scalar::Number(value)) => JsonValue::Number(value.clone()),
            Value::Scalar(Scalar::String(value)) => JsonValue::String(value.clone()),
            Value::Sequence(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Keyed(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Annotation(annotation) => annotation.to_json(),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Scalar(Scalar::Null),
            JsonValue::Bool(value) => Value::Scalar(Scalar::Bool(value)),
            JsonValue::Number(value) => Value::Scalar(Scalar::Number(value)),
            JsonValue::String(value) => Value::Scalar(Scalar::String(value)),
            JsonValue::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            JsonValue::Object(map) => match EnrichmentAnnotation::from_json_object(&map) {
                Some(annotation) => Value::Annotation(annotation),
                None => Value::Keyed(
                    map.into_iter()
                        .map(|(key, value)| (key, Value::from(value)))
                        .collect(),
                ),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<EnrichmentAnnotation> for Value {
    fn from(value: EnrichmentAnnotation) -> Self {
        Value::Annotation(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(scalar) => scalar.serialize(serializer),
            Value::Sequence(items) => serializer.collect_seq(items),
            Value::Keyed(entries) => {
                serializer.collect_map(entries.iter().map(|(key, value)| (key, value)))
            }
            Value::Annotation(annotation) => annotation.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ADDRESS: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn tagged_objects_become_annotations() {
        let value = Value::from(json!({
            "__enriched": "labeled",
            "address": ADDRESS,
            "label": "Wrapped SOL"
        }));
        assert_eq!(
            value,
            Value::Annotation(EnrichmentAnnotation::Labeled(LabeledAnnotation {
                address: ADDRESS.to_string(),
                label: "Wrapped SOL".to_string(),
            }))
        );
    }

    #[test]
    fn tagged_objects_with_extra_fields_stay_keyed() {
        let source = json!({
            "__enriched": "labeled",
            "address": ADDRESS,
            "label": "Wrapped SOL",
            "comment": "kept"
        });
        let value = Value::from(source.clone());
        assert!(matches!(value, Value::Keyed(_)), "{value:?}");
        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn untagged_objects_stay_keyed_in_order() {
        let value = Value::from(json!({ "zeta": 1, "address": ADDRESS, "alpha": null }));
        let keys: Vec<&str> = match &value {
            Value::Keyed(entries) => entries.iter().map(|(key, _)| key.as_str()).collect(),
            other => panic!("expected keyed value, got {other:?}"),
        };
        assert_eq!(keys, ["zeta", "address", "alpha"]);
    }

    #[test]
    fn json_round_trip_preserves_annotations() {
        let annotation = EnrichmentAnnotation::Token(TokenAnnotation {
            address: ADDRESS.to_string(),
            mint: ADDRESS.to_string(),
            symbol: "SOL".to_string(),
            decimals: 9,
            formatted_balance: None,
            icon_url: Some(icon_url("/icons/", ADDRESS)),
            name: None,
            label: None,
        });
        let json = Value::Annotation(annotation.clone()).to_json();
        assert_eq!(json["__enriched"], "token");
        assert_eq!(json["iconUrl"], format!("/icons/{ADDRESS}.png"));
        assert!(json.get("formattedBalance").is_none());
        assert_eq!(Value::from(json), Value::Annotation(annotation));
    }

    #[test]
    fn bad_base64_is_an_error() {
        let data = AccountData::Base64("not base64!!".to_string());
        assert!(matches!(data.decode(), Err(EnrichError::InvalidBase64(_))));
    }

    #[test]
    fn missing_metadata_defaults_to_unknown() {
        let metadata = MintMetadata::unknown(ADDRESS, "/icons");
        assert_eq!(metadata.symbol, "Unknown");
        assert_eq!(metadata.decimals, 0);
        assert_eq!(metadata.icon_url, format!("/icons/{ADDRESS}.png"));
    }
}
