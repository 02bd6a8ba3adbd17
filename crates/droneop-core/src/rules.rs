//! Validation rules and thresholds for the operation form.

use serde::{Deserialize, Serialize};

use crate::ledger::Message;
use crate::models::{AltitudeErrorType, Configuration, DroneType, NumericField};

/// Message keys handed to the translation layer.
///
/// Each rule family owns a prefix; the Ledger replaces entries by prefix.
pub mod keys {
    pub const INPUT_PREFIX: &str = "input.";
    pub const NOT_A_NUMBER: &str = "input.notANumber";
    pub const AT_LEAST: &str = "input.mustBeAtLeast";
    pub const AT_MOST: &str = "input.mustBeAtMost";
    pub const SPEED_BELOW_REALISTIC_MULTIROTOR: &str = "input.speedBelowRealisticMultirotor";
    pub const WIND_SPEED_BELOW_REALISTIC: &str = "input.windSpeedBelowRealistic";
    pub const DESCENT_RATE_MUST_BE_POSITIVE: &str = "input.descentRateMustBePositive";

    pub const COMPAT_LATERAL_PREFIX: &str = "compatibility.lateral.";
    pub const TURN_180_NOT_FOR_MULTIROTOR: &str = "compatibility.lateral.turn180NotForMultirotor";
    pub const STOPPING_NOT_FOR_FIXEDWING: &str = "compatibility.lateral.stoppingNotForFixedWing";
    pub const COMPAT_TERMINATION_PREFIX: &str = "compatibility.termination.";
    pub const BALLISTIC_ONLY_FOR_ROTARY: &str = "compatibility.termination.ballisticOnlyForRotary";

    pub const HEIGHT_MIN_METRES: &str = "height.minimumMetres";
    pub const HEIGHT_MIN_FEET: &str = "height.minimumFeet";

    pub const SUBMIT_PREFIX: &str = "submit.";
    pub const REQUIRED: &str = "submit.required";
    pub const MUST_BE_POSITIVE: &str = "submit.mustBePositive";
    pub const PARACHUTE_TIME_BELOW_MINIMUM: &str = "submit.parachuteTimeBelowMinimum";
    pub const WIND_SPEED_BELOW_MINIMUM: &str = "submit.windSpeedBelowMinimum";

    pub const NAME_PREFIX: &str = "name.";
    pub const NAME_IN_USE: &str = "name.alreadyInUse";
}

/// Thresholds used by the form engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormRules {
    /// Response height = speed * factor * response time
    pub response_height_factor: f64,
    /// Flight height must be at least this multiple of the characteristic dimension
    pub min_height_multiplier: f64,
    /// Slack (metres) below the minimum height still accepted, absorbs float noise
    pub height_tolerance_m: f64,
    /// Below this speed a multirotor configuration is flagged as unrealistic
    pub multirotor_min_speed_mps: f64,
    /// Minimum wind speed considered realistic for a parachute descent
    pub min_wind_speed_mps: f64,
    /// Minimum ground risk buffer parachute opening time checked on submission
    pub min_grb_parachute_time_s: f64,
    /// Default altitude measurement error for barometric altimeters
    pub barometric_error_m: f64,
    /// Default altitude measurement error for GPS-based altitude
    pub gps_error_m: f64,
    /// Roll angle sent to the calculator when the manoeuvre does not use one
    pub default_roll_angle_deg: f64,
    /// Pitch angle sent to the calculator when the manoeuvre does not use one
    pub default_pitch_angle_deg: f64,
}

impl Default for FormRules {
    fn default() -> Self {
        Self {
            response_height_factor: 0.7,
            min_height_multiplier: 3.0,
            height_tolerance_m: 1e-9,
            multirotor_min_speed_mps: 3.0,
            min_wind_speed_mps: 3.0,
            min_grb_parachute_time_s: 3.0,
            barometric_error_m: 1.0,
            gps_error_m: 4.0,
            default_roll_angle_deg: 30.0,
            default_pitch_angle_deg: 45.0,
        }
    }
}

impl FormRules {
    pub fn default_altitude_error(&self, kind: AltitudeErrorType) -> f64 {
        match kind {
            AltitudeErrorType::Barometric => self.barometric_error_m,
            AltitudeErrorType::GpsBased => self.gps_error_m,
        }
    }

    /// The rule a numeric field is checked against, given the rest of the configuration.
    ///
    /// Fields hidden by the current selections get an empty rule.
    pub fn numeric_rule(&self, field: NumericField, config: &Configuration) -> NumericRule {
        if !config.applies(field) {
            return NumericRule::default();
        }
        match field {
            NumericField::MaxOperationalSpeed => NumericRule::min(0.0001).with_custom(
                (config.drone_type == Some(DroneType::Multirotor)).then_some(
                    CustomRule::MultirotorMinimumSpeed {
                        min: self.multirotor_min_speed_mps,
                    },
                ),
            ),
            NumericField::CharacteristicDimension
            | NumericField::GpsInaccuracy
            | NumericField::GlideRatio => NumericRule::min(0.0001),
            NumericField::AltitudeMeasurementError => NumericRule::min(
                self.default_altitude_error(
                    config.altitude_error_type.unwrap_or(AltitudeErrorType::Barometric),
                ),
            ),
            NumericField::PositionHoldingError
            | NumericField::MapError
            | NumericField::ResponseTime
            | NumericField::LateralParachuteTime
            | NumericField::VerticalParachuteTime
            | NumericField::ResponseHeight
            | NumericField::GrbParachuteTime => NumericRule::min(0.0),
            NumericField::HeightFlight | NumericField::HeightFlightFt => NumericRule::min(0.01),
            NumericField::RollAngle | NumericField::PitchAngle => NumericRule::range(1.0, 90.0),
            NumericField::WindSpeed => NumericRule::default().with_custom(Some(
                CustomRule::RealisticWindSpeed {
                    min: self.min_wind_speed_mps,
                },
            )),
            NumericField::DescentRate => {
                NumericRule::default().with_custom(Some(CustomRule::PositiveDescentRate))
            }
        }
    }

    /// Parse raw input and check it against the field's rule.
    ///
    /// A parse failure yields an absent value and takes precedence over range
    /// checks. Input to a hidden field is stored unchecked.
    pub fn check_input(&self, field: NumericField, input: &str, config: &Configuration) -> InputCheck {
        match parse_number(input) {
            Some(value) => InputCheck {
                value: Some(value),
                message: self.numeric_rule(field, config).check(value),
            },
            None if !config.applies(field) => InputCheck {
                value: None,
                message: None,
            },
            None => InputCheck {
                value: None,
                message: Some(Message::new(keys::NOT_A_NUMBER)),
            },
        }
    }

    /// Check an already stored value.
    pub fn check_value(&self, field: NumericField, value: f64, config: &Configuration) -> Option<Message> {
        self.numeric_rule(field, config).check(value)
    }
}

/// Outcome of parsing and checking one keystroke.
#[derive(Debug, Clone, PartialEq)]
pub struct InputCheck {
    pub value: Option<f64>,
    pub message: Option<Message>,
}

/// Field-specific checks that go beyond min/max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CustomRule {
    MultirotorMinimumSpeed { min: f64 },
    RealisticWindSpeed { min: f64 },
    PositiveDescentRate,
}

impl CustomRule {
    fn check(self, value: f64) -> Option<Message> {
        match self {
            Self::MultirotorMinimumSpeed { min } if value < min => Some(
                Message::new(keys::SPEED_BELOW_REALISTIC_MULTIROTOR).with_param("min", format_number(min)),
            ),
            Self::RealisticWindSpeed { min } if value < min => Some(
                Message::new(keys::WIND_SPEED_BELOW_REALISTIC).with_param("min", format_number(min)),
            ),
            Self::PositiveDescentRate if value <= 0.0 => {
                Some(Message::new(keys::DESCENT_RATE_MUST_BE_POSITIVE))
            }
            _ => None,
        }
    }
}

/// `{min?, max?, custom?}` rule attached to a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub custom: Option<CustomRule>,
}

impl NumericRule {
    pub fn min(min: f64) -> Self {
        Self { min: Some(min), ..Self::default() }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max), custom: None }
    }

    pub fn with_custom(mut self, custom: Option<CustomRule>) -> Self {
        self.custom = custom;
        self
    }

    /// First violated check, in min, max, custom order.
    pub fn check(&self, value: f64) -> Option<Message> {
        if let Some(min) = self.min {
            if value < min {
                return Some(Message::new(keys::AT_LEAST).with_param("min", format_number(min)));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Some(Message::new(keys::AT_MOST).with_param("max", format_number(max)));
            }
        }
        self.custom.and_then(|custom| custom.check(value))
    }
}

/// Parse a numeric keystroke: trimmed, finite decimal.
pub fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Shortest decimal rendering, used for rule parameters.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// Two-decimal rendering, used for derived thresholds.
pub fn format_fixed2(value: f64) -> String {
    format!("{:.2}", value)
}
