//! Error Ledger: the current set of validation findings, keyed by field.
//!
//! Entries are replaced by rule prefix rather than appended, so a rule that
//! toggles on and off never leaves duplicates or stale messages behind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::FieldId;

/// A translatable message: a key plus pre-formatted parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl Message {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.key.starts_with(prefix)
    }
}

/// One `{field, key, params}` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FieldId,
    #[serde(flatten)]
    pub message: Message,
}

/// Upsert-capable collection of field errors, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<FieldError>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry on `field` whose key starts with `rule_prefix` by
    /// `message`, or just remove them when `message` is `None`.
    ///
    /// Returns whether the ledger changed. Repeating a call is a no-op.
    pub fn upsert_rule(&mut self, field: FieldId, rule_prefix: &str, message: Option<Message>) -> bool {
        let matches = |entry: &FieldError| entry.field == field && entry.message.has_prefix(rule_prefix);

        if let Some(message) = &message {
            debug_assert!(
                message.has_prefix(rule_prefix),
                "message {} is outside rule prefix {}",
                message.key,
                rule_prefix
            );
            let mut existing = self.entries.iter().filter(|entry| matches(*entry));
            if let (Some(only), None) = (existing.next(), existing.next()) {
                if &only.message == message {
                    return false;
                }
            }
        }

        let before = self.entries.len();
        self.entries.retain(|entry| {
            !matches(entry) && !(entry.field == field && Some(&entry.message) == message.as_ref())
        });
        let mut changed = self.entries.len() != before;

        if let Some(message) = message {
            self.entries.push(FieldError { field, message });
            changed = true;
        }
        changed
    }

    /// Remove every entry for `field`, whatever its rule.
    pub fn clear(&mut self, field: FieldId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.field != field);
        self.entries.len() != before
    }

    /// Remove every entry, on any field, whose key starts with `prefix`.
    pub fn clear_prefix(&mut self, prefix: &str) {
        self.entries.retain(|entry| !entry.message.has_prefix(prefix));
    }

    pub fn entries(&self) -> &[FieldError] {
        &self.entries
    }

    pub fn has_any(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_field(&self, field: FieldId) -> impl Iterator<Item = &Message> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.field == field)
            .map(|entry| &entry.message)
    }

    /// The message a form would show under `field`.
    pub fn first_message(&self, field: FieldId) -> Option<&Message> {
        self.for_field(field).next()
    }

    pub fn into_entries(self) -> Vec<FieldError> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NumericField;
    use crate::rules::keys;

    const HEIGHT: FieldId = FieldId::Number(NumericField::HeightFlight);

    fn height_message(min: &str) -> Message {
        Message::new(keys::HEIGHT_MIN_METRES).with_param("min", min)
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut ledger = Ledger::new();
        assert!(ledger.upsert_rule(HEIGHT, keys::HEIGHT_MIN_METRES, Some(height_message("1.50"))));
        assert!(!ledger.upsert_rule(HEIGHT, keys::HEIGHT_MIN_METRES, Some(height_message("1.50"))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn upsert_replaces_within_prefix_only() {
        let mut ledger = Ledger::new();
        ledger.upsert_rule(HEIGHT, keys::INPUT_PREFIX, Some(Message::new(keys::NOT_A_NUMBER)));
        ledger.upsert_rule(HEIGHT, keys::HEIGHT_MIN_METRES, Some(height_message("1.50")));
        ledger.upsert_rule(HEIGHT, keys::HEIGHT_MIN_METRES, Some(height_message("3.00")));

        let messages: Vec<_> = ledger.for_field(HEIGHT).collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].key, keys::NOT_A_NUMBER);
        assert_eq!(messages[1].params["min"], "3.00");

        ledger.upsert_rule(HEIGHT, keys::HEIGHT_MIN_METRES, None);
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.first_message(HEIGHT).unwrap().key, keys::NOT_A_NUMBER);
    }

    #[test]
    fn upsert_leaves_other_fields_alone() {
        let mut ledger = Ledger::new();
        ledger.upsert_rule(FieldId::DroneType, keys::SUBMIT_PREFIX, Some(Message::new(keys::REQUIRED)));
        ledger.upsert_rule(HEIGHT, keys::SUBMIT_PREFIX, Some(Message::new(keys::REQUIRED)));
        ledger.upsert_rule(HEIGHT, keys::SUBMIT_PREFIX, None);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].field, FieldId::DroneType);
    }

    #[test]
    fn clear_and_clear_prefix() {
        let mut ledger = Ledger::new();
        ledger.upsert_rule(HEIGHT, keys::INPUT_PREFIX, Some(Message::new(keys::NOT_A_NUMBER)));
        ledger.upsert_rule(HEIGHT, keys::SUBMIT_PREFIX, Some(Message::new(keys::REQUIRED)));
        ledger.upsert_rule(FieldId::DroneType, keys::SUBMIT_PREFIX, Some(Message::new(keys::REQUIRED)));

        ledger.clear_prefix(keys::SUBMIT_PREFIX);
        assert_eq!(ledger.len(), 1);

        assert!(ledger.clear(HEIGHT));
        assert!(!ledger.has_any());
        assert!(!ledger.clear(HEIGHT));
    }

    #[test]
    fn serializes_as_flat_triples() {
        let mut ledger = Ledger::new();
        ledger.upsert_rule(HEIGHT, keys::HEIGHT_MIN_METRES, Some(height_message("1.50")));

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "field": "heightFlight",
                "key": "height.minimumMetres",
                "params": { "min": "1.50" }
            }])
        );
    }
}
