//! Nested request handed to the operation volume calculator.
//!
//! The mapping is pure and performs no validation of its own; missing
//! required values are reported instead of defaulted.

use serde::{Deserialize, Serialize};

use crate::error::SubmitError;
use crate::models::{
    AltitudeErrorType, Configuration, DroneType, FieldId, Manoeuvre, NumericField, Termination,
};
use crate::rules::FormRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UavSpec {
    #[serde(rename = "type")]
    pub drone_type: DroneType,
    pub max_operational_speed: f64,
    pub max_characteristic_dimension: f64,
    pub altitude_measurement_error_type: AltitudeErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_measurement_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_inaccuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_holding_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateralContingency {
    pub contingency_manoeuvre: Manoeuvre,
    pub roll_angle: f64,
    pub time_to_open_parachute: f64,
    pub pitch_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalContingency {
    pub contingency_manoeuvre: Manoeuvre,
    pub response_height: f64,
    pub time_to_open_parachute: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundRiskBuffer {
    pub termination: Termination,
    pub time_to_open_parachute: f64,
    pub max_permissible_wind_speed: f64,
    pub rate_of_descent: f64,
    pub glide_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightGeography {
    pub height_flight_geo: f64,
}

/// Request body for the calculator service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub uav: UavSpec,
    #[serde(rename = "lateralCV")]
    pub lateral_cv: LateralContingency,
    #[serde(rename = "verticalCV")]
    pub vertical_cv: VerticalContingency,
    pub grb: GroundRiskBuffer,
    pub flight_geography: FlightGeography,
}

fn required<T>(value: Option<T>, field: impl Into<FieldId>) -> Result<T, SubmitError> {
    value.ok_or_else(|| SubmitError::MissingValue(field.into()))
}

/// `value` when `applies`, otherwise zero.
fn when(applies: bool, value: Option<f64>) -> f64 {
    if applies {
        value.unwrap_or(0.0)
    } else {
        0.0
    }
}

/// Group the flat configuration into the calculator's request shape.
pub fn build_request(config: &Configuration, rules: &FormRules) -> Result<OperationRequest, SubmitError> {
    let lateral = required(config.lateral_manoeuvre, FieldId::LateralManoeuvre)?;
    let vertical = required(config.vertical_manoeuvre, FieldId::VerticalManoeuvre)?;
    let termination = required(config.termination_method, FieldId::TerminationMethod)?;

    let uav = UavSpec {
        drone_type: required(config.drone_type, FieldId::DroneType)?,
        max_operational_speed: required(config.max_operational_speed, NumericField::MaxOperationalSpeed)?,
        max_characteristic_dimension: required(
            config.characteristic_dimension,
            NumericField::CharacteristicDimension,
        )?,
        altitude_measurement_error_type: required(config.altitude_error_type, FieldId::AltitudeErrorType)?,
        altitude_measurement_error: config.altitude_measurement_error,
        gps_inaccuracy: config.gps_inaccuracy,
        position_holding_error: config.position_holding_error,
        map_error: config.map_error,
        response_time: config.response_time,
    };

    let lateral_cv = LateralContingency {
        contingency_manoeuvre: lateral,
        roll_angle: match lateral {
            Manoeuvre::Turn180 => config.roll_angle.unwrap_or(rules.default_roll_angle_deg),
            _ => rules.default_roll_angle_deg,
        },
        time_to_open_parachute: when(
            lateral == Manoeuvre::ParachuteTermination,
            config.lateral_parachute_time,
        ),
        pitch_angle: match lateral {
            Manoeuvre::Stopping => config.pitch_angle.unwrap_or(rules.default_pitch_angle_deg),
            _ => rules.default_pitch_angle_deg,
        },
    };

    let vertical_cv = VerticalContingency {
        contingency_manoeuvre: vertical,
        response_height: config.response_height.unwrap_or(0.0),
        time_to_open_parachute: when(
            vertical == Manoeuvre::ParachuteTermination,
            config.vertical_parachute_time,
        ),
    };

    let parachute = termination == Termination::Parachute;
    let grb = GroundRiskBuffer {
        termination,
        time_to_open_parachute: when(parachute, config.grb_parachute_time),
        max_permissible_wind_speed: when(parachute, config.wind_speed),
        rate_of_descent: when(parachute, config.descent_rate),
        glide_ratio: when(termination == Termination::OffGliding, config.glide_ratio),
    };

    let flight_geography = FlightGeography {
        height_flight_geo: required(config.height_flight, NumericField::HeightFlight)?,
    };

    Ok(OperationRequest {
        uav,
        lateral_cv,
        vertical_cv,
        grb,
        flight_geography,
    })
}
