use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::core::constants::BASE58_ADDRESS_PATTERN;
use crate::core::error::EnrichError;
use crate::types::{Address, Scalar, Value};

static BASE58_MATCHER: Lazy<AddressMatcher> = Lazy::new(|| {
    AddressMatcher::new(BASE58_ADDRESS_PATTERN).expect("valid base-58 address pattern")
});

/// Shape check for address strings, plus the legacy `label (<address>)` form.
#[derive(Clone, Debug)]
pub struct AddressMatcher {
    exact: Regex,
    wrapped: Regex,
}

impl Default for AddressMatcher {
    fn default() -> Self {
        BASE58_MATCHER.clone()
    }
}

impl AddressMatcher {
    /// `pattern` is an unanchored character-class expression such as
    /// `[1-9A-HJ-NP-Za-km-z]{32,44}`.
    pub fn new(pattern: &str) -> Result<Self, EnrichError> {
        let exact = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|err| EnrichError::config(format!("address pattern: {err}")))?;
        let wrapped = Regex::new(&format!(r"^.*\(({pattern})\)$"))
            .map_err(|err| EnrichError::config(format!("wrapped address pattern: {err}")))?;
        Ok(Self { exact, wrapped })
    }

    pub fn is_address(&self, candidate: &str) -> bool {
        self.exact.is_match(candidate)
    }

    /// Inner address of a string ending in `(<address>)`.
    pub fn wrapped_address<'s>(&self, candidate: &'s str) -> Option<&'s str> {
        self.wrapped
            .captures(candidate)
            .and_then(|captures| captures.get(1))
            .map(|inner| inner.as_str())
    }

    /// Every address-shaped string leaf in `tree`, deduplicated, in the order
    /// first seen. Annotations contribute the address they replaced.
    pub fn extract(&self, tree: &Value) -> Vec<Address> {
        let mut collector = Collector {
            matcher: self,
            seen: FxHashSet::default(),
            ordered: Vec::new(),
        };
        collector.visit(tree);
        collector.ordered
    }
}

struct Collector<'m> {
    matcher: &'m AddressMatcher,
    seen: FxHashSet<Address>,
    ordered: Vec<Address>,
}

impl Collector<'_> {
    fn visit(&mut self, node: &Value) {
        match node {
            Value::Scalar(Scalar::String(candidate)) => {
                if self.matcher.is_address(candidate) {
                    self.push(candidate);
                }
            }
            Value::Scalar(_) => {}
            Value::Sequence(items) => items.iter().for_each(|item| self.visit(item)),
            Value::Keyed(entries) => entries.iter().for_each(|(_, value)| self.visit(value)),
            Value::Annotation(annotation) => self.push(annotation.address()),
        }
    }

    fn push(&mut self, address: &str) {
        if self.seen.insert(address.to_string()) {
            self.ordered.push(address.to_string());
        }
    }
}

/// Extract with the default base-58 shape.
pub fn extract_addresses(tree: &Value) -> Vec<Address> {
    BASE58_MATCHER.extract(tree)
}
