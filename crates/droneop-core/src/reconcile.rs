//! Reconciler: bulk-load a foreign configuration and restore consistency.
//!
//! Reconciliation is all or nothing. The only rejection is an unknown drone
//! type; every other unknown or malformed value resolves to unset.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ReconcileError;
use crate::graph::{Edit, FieldGraph};
use crate::ledger::Ledger;
use crate::models::{AltitudeErrorType, Configuration, DroneType, NumericField, WireValue};
use crate::options::{lateral_options, termination_options, vertical_options};
use crate::rules::FormRules;
use crate::units;

/// Import file contents, read leniently.
///
/// Numbers that are not JSON numbers and selections that are not strings
/// are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedConfiguration {
    #[serde(default)]
    pub drone_type: Option<Value>,
    #[serde(default, rename = "lateralContingencyManoeuvre", alias = "lateralManoeuvre", deserialize_with = "lenient_string")]
    pub lateral_manoeuvre: Option<String>,
    #[serde(default, rename = "verticalContingencyManoeuvre", alias = "verticalManoeuvre", deserialize_with = "lenient_string")]
    pub vertical_manoeuvre: Option<String>,
    #[serde(default, rename = "methodOffTermination", alias = "terminationMethod", deserialize_with = "lenient_string")]
    pub termination_method: Option<String>,
    #[serde(default, rename = "altitudeMeasurementErrorType", alias = "altitudeErrorType", deserialize_with = "lenient_string")]
    pub altitude_error_type: Option<String>,

    #[serde(default, alias = "operationalSpeed", deserialize_with = "lenient_number")]
    pub max_operational_speed: Option<f64>,
    #[serde(default, rename = "maxUavDimensions", alias = "characteristicDimension", deserialize_with = "lenient_number")]
    pub characteristic_dimension: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub altitude_measurement_error: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gps_inaccuracy: Option<f64>,
    #[serde(default, rename = "positionError", alias = "positionHoldingError", deserialize_with = "lenient_number")]
    pub position_holding_error: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub map_error: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub response_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height_flight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height_flight_ft: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub roll_angle: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pitch_angle: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lateral_parachute_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub response_height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub vertical_parachute_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub grb_parachute_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub wind_speed: Option<f64>,
    #[serde(default, rename = "parachuteDescent", alias = "descentRate", deserialize_with = "lenient_number")]
    pub descent_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub glide_ratio: Option<f64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|number| number.is_finite()))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

impl ImportedConfiguration {
    pub fn from_json_str(input: &str) -> Result<Self, ReconcileError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ReconcileError> {
        if !value.is_object() {
            return Err(ReconcileError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    fn number(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::MaxOperationalSpeed => self.max_operational_speed,
            NumericField::CharacteristicDimension => self.characteristic_dimension,
            NumericField::AltitudeMeasurementError => self.altitude_measurement_error,
            NumericField::GpsInaccuracy => self.gps_inaccuracy,
            NumericField::PositionHoldingError => self.position_holding_error,
            NumericField::MapError => self.map_error,
            NumericField::ResponseTime => self.response_time,
            NumericField::HeightFlight => self.height_flight,
            NumericField::HeightFlightFt => self.height_flight_ft,
            NumericField::RollAngle => self.roll_angle,
            NumericField::PitchAngle => self.pitch_angle,
            NumericField::LateralParachuteTime => self.lateral_parachute_time,
            NumericField::ResponseHeight => self.response_height,
            NumericField::VerticalParachuteTime => self.vertical_parachute_time,
            NumericField::GrbParachuteTime => self.grb_parachute_time,
            NumericField::WindSpeed => self.wind_speed,
            NumericField::DescentRate => self.descent_rate,
            NumericField::GlideRatio => self.glide_ratio,
        }
    }

    /// Step 1: an absent, null or empty drone type is unset; anything else
    /// must name a known type.
    fn drone_type(&self) -> Result<Option<DroneType>, ReconcileError> {
        match &self.drone_type {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.is_empty() => Ok(None),
            Some(Value::String(text)) => DroneType::parse(text)
                .map(Some)
                .ok_or_else(|| ReconcileError::UnknownDroneType(text.clone())),
            Some(other) => Err(ReconcileError::UnknownDroneType(other.to_string())),
        }
    }
}

/// Rebuilds a consistent `(Configuration, Ledger)` from imported data.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    graph: FieldGraph<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(rules: &'a FormRules) -> Self {
        Self {
            graph: FieldGraph::new(rules),
        }
    }

    pub fn reconcile_str(&self, input: &str) -> Result<(Configuration, Ledger), ReconcileError> {
        let imported = ImportedConfiguration::from_json_str(input).inspect_err(|error| {
            warn!(%error, "import rejected");
        })?;
        self.reconcile(&imported)
    }

    pub fn reconcile_value(&self, value: Value) -> Result<(Configuration, Ledger), ReconcileError> {
        let imported = ImportedConfiguration::from_value(value).inspect_err(|error| {
            warn!(%error, "import rejected");
        })?;
        self.reconcile(&imported)
    }

    /// Produce a fresh configuration from `imported`.
    ///
    /// Nothing is returned on rejection, so the caller's state is untouched.
    pub fn reconcile(&self, imported: &ImportedConfiguration) -> Result<(Configuration, Ledger), ReconcileError> {
        let drone_type = imported.drone_type().inspect_err(|error| {
            warn!(%error, "import rejected");
        })?;

        let mut config = Configuration::new();
        let mut ledger = Ledger::new();
        self.graph
            .apply_in_place(&mut config, &mut ledger, Edit::DroneType(drone_type));
        debug!(drone_type = ?drone_type, "reconcile: drone type applied");

        for field in NumericField::ALL {
            config.set_number(field, imported.number(field));
        }
        config.altitude_error_type = imported
            .altitude_error_type
            .as_deref()
            .and_then(AltitudeErrorType::parse);
        config.name = imported
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        debug!("reconcile: values copied");

        // Metres wins when both units are supplied.
        if let Some(metres) = config.height_flight {
            config.height_flight_ft = Some(units::metres_to_feet(metres));
        } else if let Some(feet) = config.height_flight_ft {
            config.height_flight = Some(units::feet_to_metres(feet));
        }

        config.lateral_manoeuvre = imported
            .lateral_manoeuvre
            .as_deref()
            .and_then(|value| lateral_options(drone_type).find_by_value(value));
        config.vertical_manoeuvre = imported
            .vertical_manoeuvre
            .as_deref()
            .and_then(|value| vertical_options(drone_type).find_by_value(value));
        let terminations =
            termination_options(drone_type, config.lateral_manoeuvre, config.vertical_manoeuvre);
        config.termination_method = imported
            .termination_method
            .as_deref()
            .and_then(|value| terminations.find_by_value(value));
        debug!(
            lateral = ?config.lateral_manoeuvre,
            vertical = ?config.vertical_manoeuvre,
            termination = ?config.termination_method,
            "reconcile: selections resolved"
        );

        self.graph.settle_dependents(&mut config, &mut ledger);
        let ledger = self.graph.rebuild_ledger(&config);
        debug!(entries = ledger.len(), "reconcile: complete");
        Ok((config, ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Manoeuvre, Termination};

    fn reconcile(input: &str) -> Result<(Configuration, Ledger), ReconcileError> {
        let rules = FormRules::default();
        Reconciler::new(&rules).reconcile_str(input)
    }

    #[test]
    fn unknown_drone_type_rejects_everything() {
        let error = reconcile(r#"{"droneType": "HELICOPTER", "heightFlight": 30}"#).unwrap_err();
        assert!(matches!(error, ReconcileError::UnknownDroneType(ref value) if value == "HELICOPTER"));
        assert_eq!(error.key(), crate::error::INVALID_CONFIGURATION_KEY);

        assert!(matches!(
            reconcile(r#"{"droneType": 3}"#),
            Err(ReconcileError::UnknownDroneType(_))
        ));
        assert!(matches!(
            reconcile(r#"{"droneType": " MULTIROTOR "}"#),
            Err(ReconcileError::UnknownDroneType(ref value)) if value == " MULTIROTOR "
        ));
    }

    #[test]
    fn non_object_and_malformed_input_rejected() {
        assert!(matches!(reconcile("[1, 2]"), Err(ReconcileError::NotAnObject)));
        assert!(matches!(reconcile("{\"droneType\": "), Err(ReconcileError::Malformed(_))));
    }

    #[test]
    fn empty_drone_type_is_unset() {
        let (config, _) = reconcile(r#"{"droneType": "", "lateralContingencyManoeuvre": "STOPPING"}"#).unwrap();
        assert_eq!(config.drone_type, None);
        assert_eq!(config.lateral_manoeuvre, None);
    }

    #[test]
    fn selections_resolve_against_catalog() {
        let (config, ledger) = reconcile(
            r#"{
                "droneType": "FIXEDWING",
                "lateralContingencyManoeuvre": "STOPPING",
                "verticalContingencyManoeuvre": "CIRCULAR_PATH",
                "methodOffTermination": "OFF_GLIDING",
                "glideRatio": 11
            }"#,
        )
        .unwrap();
        assert_eq!(config.lateral_manoeuvre, None);
        assert_eq!(config.vertical_manoeuvre, Some(Manoeuvre::CircularPath));
        assert_eq!(config.termination_method, Some(Termination::OffGliding));
        assert_eq!(config.glide_ratio, Some(11.0));
        assert!(ledger.is_empty());
    }

    #[test]
    fn termination_resolves_after_manoeuvres() {
        let (config, _) = reconcile(
            r#"{
                "droneType": "MULTIROTOR",
                "lateralContingencyManoeuvre": "PARACHUTE_TERMINATION",
                "methodOffTermination": "SIMPLIFIED_APPROACH",
                "lateralParachuteTime": 1.2
            }"#,
        )
        .unwrap();
        assert_eq!(config.lateral_manoeuvre, Some(Manoeuvre::ParachuteTermination));
        assert_eq!(config.termination_method, None);
        assert_eq!(config.lateral_parachute_time, Some(1.2));
    }

    #[test]
    fn missing_height_unit_is_derived() {
        let (config, _) = reconcile(r#"{"heightFlightFt": 400}"#).unwrap();
        assert_eq!(config.height_flight, Some(121.92));

        let (config, _) = reconcile(r#"{"heightFlight": 30, "heightFlightFt": 5}"#).unwrap();
        assert_eq!(config.height_flight_ft, Some(98.43));

        let (config, _) = reconcile("{}").unwrap();
        assert_eq!(config.height_flight, None);
        assert_eq!(config.height_flight_ft, None);
    }

    #[test]
    fn lenient_values_and_aliases() {
        let (config, _) = reconcile(
            r#"{
                "operationalSpeed": 12,
                "characteristicDimension": "big",
                "mapError": null,
                "altitudeErrorType": "GPS_BASED",
                "terminationMethod": 7,
                "descentRate": 4.5
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_operational_speed, Some(12.0));
        assert_eq!(config.characteristic_dimension, None);
        assert_eq!(config.map_error, None);
        assert_eq!(config.altitude_error_type, Some(AltitudeErrorType::GpsBased));
        // no parachute termination, so the descent rate is not kept
        assert_eq!(config.descent_rate, None);
    }

    #[test]
    fn unused_dependents_are_cleared_and_response_height_derived() {
        let (config, _) = reconcile(
            r#"{
                "droneType": "ROTORCRAFT",
                "lateralContingencyManoeuvre": "STOPPING",
                "lateralParachuteTime": 2,
                "windSpeed": 9,
                "glideRatio": 10,
                "maxOperationalSpeed": 10,
                "responseTime": 2,
                "responseHeight": 1
            }"#,
        )
        .unwrap();
        assert_eq!(config.lateral_parachute_time, None);
        assert_eq!(config.wind_speed, None);
        assert_eq!(config.glide_ratio, None);
        assert_eq!(config.response_height, Some(14.0));
    }

    #[test]
    fn ledger_is_rebuilt_from_scratch() {
        let (_, ledger) = reconcile(
            r#"{
                "droneType": "MULTIROTOR",
                "maxOperationalSpeed": 2,
                "maxUavDimensions": 1,
                "heightFlight": 2,
                "rollAngle": 0
            }"#,
        )
        .unwrap();
        let keys: Vec<_> = ledger.entries().iter().map(|e| e.message.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                crate::rules::keys::SPEED_BELOW_REALISTIC_MULTIROTOR,
                crate::rules::keys::AT_LEAST,
                crate::rules::keys::HEIGHT_MIN_METRES,
                crate::rules::keys::HEIGHT_MIN_FEET,
            ]
        );
    }

    #[test]
    fn name_is_copied() {
        let (config, _) = reconcile(r#"{"name": " Hex survey "}"#).unwrap();
        assert_eq!(config.name.as_deref(), Some("Hex survey"));
    }
}
