//! Saved-configuration records.
//!
//! The external catalog stores configurations in a nested shape with every
//! number filled in. Records are converted back to the flat import shape and
//! loaded through the reconciler like any other import.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::RecordError;
use crate::models::{Configuration, FieldId, NumericField, WireValue};

/// Selection value stored when no manoeuvre was chosen.
pub const NO_MANOEUVRE: &str = "NO_MANOEUVRE";
/// Selection value stored when no termination method was chosen.
pub const NO_TERMINATION: &str = "NO_TERMINATION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UavRecord {
    #[serde(rename = "type")]
    pub drone_type: String,
    pub max_operational_speed: f64,
    pub max_characteristic_dimension: f64,
    pub altitude_measurement_error_type: String,
    pub altitude_measurement_error: f64,
    pub gps_inaccuracy: f64,
    pub position_holding_error: f64,
    pub map_error: f64,
    pub response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateralVolumeRecord {
    pub contingency_manoeuvre: String,
    pub roll_angle: f64,
    pub pitch_angle: f64,
    pub time_to_open_parachute: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalVolumeRecord {
    pub contingency_manoeuvre: String,
    pub time_to_open_parachute: f64,
    pub response_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundRiskBufferRecord {
    pub termination: String,
    pub time_to_open_parachute: f64,
    pub max_permissible_wind_speed: f64,
    pub rate_of_descent: f64,
    pub glide_ratio: f64,
}

/// A named configuration as the saved catalog stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneRecord {
    pub name: String,
    pub uav: UavRecord,
    pub lateral_contingency_volume: LateralVolumeRecord,
    pub vertical_contingency_volume: VerticalVolumeRecord,
    pub ground_risk_buffer: GroundRiskBufferRecord,
    /// Metres
    pub max_flight_altitude: f64,
}

impl DroneRecord {
    /// Build a record for saving. Absent numbers are stored as zero.
    ///
    /// The drone type and altitude error type have no placeholder and must be set.
    pub fn from_configuration(config: &Configuration) -> Result<Self, RecordError> {
        let name = config
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(RecordError::MissingName)?;
        let drone_type = config
            .drone_type
            .ok_or(RecordError::MissingValue(FieldId::DroneType))?;
        let altitude_error_type = config
            .altitude_error_type
            .ok_or(RecordError::MissingValue(FieldId::AltitudeErrorType))?;
        let number = |field: NumericField| config.number(field).unwrap_or(0.0);

        Ok(Self {
            name: name.to_string(),
            uav: UavRecord {
                drone_type: drone_type.as_str().to_string(),
                max_operational_speed: number(NumericField::MaxOperationalSpeed),
                max_characteristic_dimension: number(NumericField::CharacteristicDimension),
                altitude_measurement_error_type: altitude_error_type.as_str().to_string(),
                altitude_measurement_error: number(NumericField::AltitudeMeasurementError),
                gps_inaccuracy: number(NumericField::GpsInaccuracy),
                position_holding_error: number(NumericField::PositionHoldingError),
                map_error: number(NumericField::MapError),
                response_time: number(NumericField::ResponseTime),
            },
            lateral_contingency_volume: LateralVolumeRecord {
                contingency_manoeuvre: config
                    .lateral_manoeuvre
                    .map_or(NO_MANOEUVRE, WireValue::as_str)
                    .to_string(),
                roll_angle: number(NumericField::RollAngle),
                pitch_angle: number(NumericField::PitchAngle),
                time_to_open_parachute: number(NumericField::LateralParachuteTime),
            },
            vertical_contingency_volume: VerticalVolumeRecord {
                contingency_manoeuvre: config
                    .vertical_manoeuvre
                    .map_or(NO_MANOEUVRE, WireValue::as_str)
                    .to_string(),
                time_to_open_parachute: number(NumericField::VerticalParachuteTime),
                response_height: number(NumericField::ResponseHeight),
            },
            ground_risk_buffer: GroundRiskBufferRecord {
                termination: config
                    .termination_method
                    .map_or(NO_TERMINATION, WireValue::as_str)
                    .to_string(),
                time_to_open_parachute: number(NumericField::GrbParachuteTime),
                max_permissible_wind_speed: number(NumericField::WindSpeed),
                rate_of_descent: number(NumericField::DescentRate),
                glide_ratio: number(NumericField::GlideRatio),
            },
            max_flight_altitude: number(NumericField::HeightFlight),
        })
    }

    /// Flat import shape for the reconciler.
    ///
    /// A stored zero means "not filled in" for every number whose minimum is
    /// above zero, and those are left out. Placeholder selections resolve to
    /// unset on reconciliation.
    pub fn to_import(&self) -> Value {
        let mut flat = Map::new();
        let mut put = |field: FieldId, value: Value| {
            flat.insert(field.as_str().to_string(), value);
        };
        let optional = |value: f64| if value == 0.0 { Value::Null } else { json!(value) };

        put(FieldId::Name, json!(self.name));
        put(FieldId::DroneType, json!(self.uav.drone_type));
        put(
            FieldId::AltitudeErrorType,
            json!(self.uav.altitude_measurement_error_type),
        );
        put(
            FieldId::LateralManoeuvre,
            json!(self.lateral_contingency_volume.contingency_manoeuvre),
        );
        put(
            FieldId::VerticalManoeuvre,
            json!(self.vertical_contingency_volume.contingency_manoeuvre),
        );
        put(FieldId::TerminationMethod, json!(self.ground_risk_buffer.termination));

        let uav = &self.uav;
        let lateral = &self.lateral_contingency_volume;
        let vertical = &self.vertical_contingency_volume;
        let grb = &self.ground_risk_buffer;
        let numbers = [
            (NumericField::MaxOperationalSpeed, optional(uav.max_operational_speed)),
            (NumericField::CharacteristicDimension, optional(uav.max_characteristic_dimension)),
            (NumericField::AltitudeMeasurementError, optional(uav.altitude_measurement_error)),
            (NumericField::GpsInaccuracy, optional(uav.gps_inaccuracy)),
            (NumericField::PositionHoldingError, json!(uav.position_holding_error)),
            (NumericField::MapError, json!(uav.map_error)),
            (NumericField::ResponseTime, json!(uav.response_time)),
            (NumericField::HeightFlight, optional(self.max_flight_altitude)),
            (NumericField::RollAngle, optional(lateral.roll_angle)),
            (NumericField::PitchAngle, optional(lateral.pitch_angle)),
            (NumericField::ResponseHeight, json!(vertical.response_height)),
            (NumericField::LateralParachuteTime, optional(lateral.time_to_open_parachute)),
            (NumericField::VerticalParachuteTime, optional(vertical.time_to_open_parachute)),
            (NumericField::GrbParachuteTime, optional(grb.time_to_open_parachute)),
            (NumericField::WindSpeed, optional(grb.max_permissible_wind_speed)),
            (NumericField::DescentRate, optional(grb.rate_of_descent)),
            (NumericField::GlideRatio, optional(grb.glide_ratio)),
        ];
        for (field, value) in numbers {
            if !value.is_null() {
                put(field.into(), value);
            }
        }

        Value::Object(flat)
    }
}
