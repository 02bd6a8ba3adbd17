//! Submission Guard: change detection against the last submitted configuration.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::models::{Configuration, FieldId, NumericField};

/// Canonical, order-independent serialization of a [`Configuration`].
///
/// Every field is present; absent values are `null`, so a field that was
/// cleared and one that was never set produce the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(config: &Configuration) -> Self {
        // serde_json::Map keeps keys sorted.
        let mut fields = Map::new();
        for field in [
            FieldId::DroneType,
            FieldId::LateralManoeuvre,
            FieldId::VerticalManoeuvre,
            FieldId::TerminationMethod,
            FieldId::AltitudeErrorType,
        ] {
            let value = config.selection(field).map_or(Value::Null, Value::from);
            fields.insert(field.as_str().to_string(), value);
        }
        for field in NumericField::ALL {
            let value = config
                .number(field)
                // -0.0 and 0.0 are the same value
                .map(|number| if number == 0.0 { 0.0 } else { number })
                .map_or(Value::Null, Value::from);
            fields.insert(field.as_str().to_string(), value);
        }
        let name = config.name.clone().map_or(Value::Null, Value::from);
        fields.insert(FieldId::Name.as_str().to_string(), name);

        Self(Value::Object(fields).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `config` differs from the configuration `last` was taken from.
///
/// With no previous submission everything counts as changed.
pub fn has_changed_since(config: &Configuration, last: Option<&Fingerprint>) -> bool {
    last.map_or(true, |last| Fingerprint::of(config) != *last)
}

/// Holds the fingerprint of the last successful submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    baseline: Option<Fingerprint>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_changed(&self, config: &Configuration) -> bool {
        has_changed_since(config, self.baseline.as_ref())
    }

    pub fn mark_submitted(&mut self, config: &Configuration) -> &Fingerprint {
        self.baseline.insert(Fingerprint::of(config))
    }

    pub fn baseline(&self) -> Option<&Fingerprint> {
        self.baseline.as_ref()
    }

    pub fn clear(&mut self) {
        self.baseline = None;
    }
}
