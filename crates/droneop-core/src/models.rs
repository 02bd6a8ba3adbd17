//! Core data models for a drone operation configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerated selections that travel over the wire as fixed string values.
pub trait WireValue: Copy + Ord + Sized + 'static {
    /// Every value, in catalog order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Translation key for the option label.
    fn label_key(self) -> &'static str;

    /// Look up a value by its exact wire string.
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }
}

/// Classification of the aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneType {
    Multirotor,
    Rotorcraft,
    Fixedwing,
}

impl DroneType {
    /// Multirotors and rotorcraft share their contingency options.
    pub fn is_rotary(self) -> bool {
        matches!(self, Self::Multirotor | Self::Rotorcraft)
    }
}

impl WireValue for DroneType {
    const ALL: &'static [Self] = &[Self::Multirotor, Self::Rotorcraft, Self::Fixedwing];

    fn as_str(self) -> &'static str {
        match self {
            Self::Multirotor => "MULTIROTOR",
            Self::Rotorcraft => "ROTORCRAFT",
            Self::Fixedwing => "FIXEDWING",
        }
    }

    fn label_key(self) -> &'static str {
        match self {
            Self::Multirotor => "droneType.multirotor",
            Self::Rotorcraft => "droneType.rotorcraft",
            Self::Fixedwing => "droneType.fixedWing",
        }
    }
}

/// Lateral or vertical contingency manoeuvre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Manoeuvre {
    Stopping,
    #[serde(rename = "TURN_180")]
    Turn180,
    EnergyConversion,
    CircularPath,
    ParachuteTermination,
}

impl WireValue for Manoeuvre {
    const ALL: &'static [Self] = &[
        Self::Stopping,
        Self::Turn180,
        Self::EnergyConversion,
        Self::CircularPath,
        Self::ParachuteTermination,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Stopping => "STOPPING",
            Self::Turn180 => "TURN_180",
            Self::EnergyConversion => "ENERGY_CONVERSION",
            Self::CircularPath => "CIRCULAR_PATH",
            Self::ParachuteTermination => "PARACHUTE_TERMINATION",
        }
    }

    fn label_key(self) -> &'static str {
        match self {
            Self::Stopping => "manoeuvre.stopping",
            Self::Turn180 => "manoeuvre.turn180",
            Self::EnergyConversion => "manoeuvre.energyConversion",
            Self::CircularPath => "manoeuvre.circularPath",
            Self::ParachuteTermination => "manoeuvre.triggerParachute",
        }
    }
}

/// Ground risk buffer termination method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Termination {
    /// Power off, no gliding (fixed wing)
    OffNoGliding,
    /// Power off, gliding (fixed wing)
    OffGliding,
    /// Simplified approach (rotary)
    SimplifiedApproach,
    /// Ballistic approach (rotary)
    BallisticApproach,
    Parachute,
}

impl WireValue for Termination {
    const ALL: &'static [Self] = &[
        Self::OffNoGliding,
        Self::OffGliding,
        Self::SimplifiedApproach,
        Self::BallisticApproach,
        Self::Parachute,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::OffNoGliding => "OFF_NO_GLIDING",
            Self::OffGliding => "OFF_GLIDING",
            Self::SimplifiedApproach => "SIMPLIFIED_APPROACH",
            Self::BallisticApproach => "BALLISTIC_APPROACH",
            Self::Parachute => "PARACHUTE",
        }
    }

    fn label_key(self) -> &'static str {
        match self {
            Self::OffNoGliding => "termination.powerOffNoGliding",
            Self::OffGliding => "termination.powerOffGliding",
            Self::SimplifiedApproach => "termination.simplifiedApproach",
            Self::BallisticApproach => "termination.ballisticApproach",
            Self::Parachute => "termination.parachute",
        }
    }
}

/// Source of the altitude measurement error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AltitudeErrorType {
    #[serde(rename = "barometric", alias = "BAROMETRIC")]
    Barometric,
    #[serde(rename = "GPS-based", alias = "GPS_BASED")]
    GpsBased,
}

impl WireValue for AltitudeErrorType {
    const ALL: &'static [Self] = &[Self::Barometric, Self::GpsBased];

    fn as_str(self) -> &'static str {
        match self {
            Self::Barometric => "barometric",
            Self::GpsBased => "GPS-based",
        }
    }

    fn label_key(self) -> &'static str {
        match self {
            Self::Barometric => "altitudeErrorType.barometric",
            Self::GpsBased => "altitudeErrorType.gpsBased",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "barometric" | "BAROMETRIC" => Some(Self::Barometric),
            "GPS-based" | "GPS_BASED" => Some(Self::GpsBased),
            _ => None,
        }
    }
}

macro_rules! impl_display_wire {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_wire!(DroneType, Manoeuvre, Termination, AltitudeErrorType);

/// Numeric fields of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    MaxOperationalSpeed,
    #[serde(rename = "maxUavDimensions")]
    CharacteristicDimension,
    AltitudeMeasurementError,
    GpsInaccuracy,
    #[serde(rename = "positionError")]
    PositionHoldingError,
    MapError,
    ResponseTime,
    HeightFlight,
    HeightFlightFt,
    RollAngle,
    PitchAngle,
    LateralParachuteTime,
    ResponseHeight,
    VerticalParachuteTime,
    GrbParachuteTime,
    WindSpeed,
    #[serde(rename = "parachuteDescent")]
    DescentRate,
    GlideRatio,
}

impl NumericField {
    pub const ALL: [NumericField; 18] = [
        Self::MaxOperationalSpeed,
        Self::CharacteristicDimension,
        Self::AltitudeMeasurementError,
        Self::GpsInaccuracy,
        Self::PositionHoldingError,
        Self::MapError,
        Self::ResponseTime,
        Self::HeightFlight,
        Self::HeightFlightFt,
        Self::RollAngle,
        Self::PitchAngle,
        Self::LateralParachuteTime,
        Self::ResponseHeight,
        Self::VerticalParachuteTime,
        Self::GrbParachuteTime,
        Self::WindSpeed,
        Self::DescentRate,
        Self::GlideRatio,
    ];

    pub fn as_str(self) -> &'static str {
        FieldId::from(self).as_str()
    }

    /// Accepts the wire name or the short alias used on import.
    pub fn parse(value: &str) -> Option<Self> {
        match FieldId::parse(value)? {
            FieldId::Number(field) => Some(field),
            _ => None,
        }
    }
}

/// Identifies any field of the configuration; the Ledger is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    DroneType,
    LateralManoeuvre,
    VerticalManoeuvre,
    TerminationMethod,
    AltitudeErrorType,
    Number(NumericField),
    Name,
}

impl FieldId {
    /// Wire name of the field on the import/export file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DroneType => "droneType",
            Self::LateralManoeuvre => "lateralContingencyManoeuvre",
            Self::VerticalManoeuvre => "verticalContingencyManoeuvre",
            Self::TerminationMethod => "methodOffTermination",
            Self::AltitudeErrorType => "altitudeMeasurementErrorType",
            Self::Name => "name",
            Self::Number(field) => match field {
                NumericField::MaxOperationalSpeed => "maxOperationalSpeed",
                NumericField::CharacteristicDimension => "maxUavDimensions",
                NumericField::AltitudeMeasurementError => "altitudeMeasurementError",
                NumericField::GpsInaccuracy => "gpsInaccuracy",
                NumericField::PositionHoldingError => "positionError",
                NumericField::MapError => "mapError",
                NumericField::ResponseTime => "responseTime",
                NumericField::HeightFlight => "heightFlight",
                NumericField::HeightFlightFt => "heightFlightFt",
                NumericField::RollAngle => "rollAngle",
                NumericField::PitchAngle => "pitchAngle",
                NumericField::LateralParachuteTime => "lateralParachuteTime",
                NumericField::ResponseHeight => "responseHeight",
                NumericField::VerticalParachuteTime => "verticalParachuteTime",
                NumericField::GrbParachuteTime => "grbParachuteTime",
                NumericField::WindSpeed => "windSpeed",
                NumericField::DescentRate => "parachuteDescent",
                NumericField::GlideRatio => "glideRatio",
            },
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let alias = match value {
            "lateralManoeuvre" => Some(Self::LateralManoeuvre),
            "verticalManoeuvre" => Some(Self::VerticalManoeuvre),
            "terminationMethod" => Some(Self::TerminationMethod),
            "altitudeErrorType" => Some(Self::AltitudeErrorType),
            "operationalSpeed" => Some(Self::Number(NumericField::MaxOperationalSpeed)),
            "characteristicDimension" => Some(Self::Number(NumericField::CharacteristicDimension)),
            "positionHoldingError" => Some(Self::Number(NumericField::PositionHoldingError)),
            "descentRate" => Some(Self::Number(NumericField::DescentRate)),
            _ => None,
        };
        alias.or_else(|| {
            [
                Self::DroneType,
                Self::LateralManoeuvre,
                Self::VerticalManoeuvre,
                Self::TerminationMethod,
                Self::AltitudeErrorType,
                Self::Name,
            ]
            .into_iter()
            .chain(NumericField::ALL.into_iter().map(Self::Number))
            .find(|field| field.as_str() == value)
        })
    }
}

impl From<NumericField> for FieldId {
    fn from(field: NumericField) -> Self {
        Self::Number(field)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown field {value:?}")))
    }
}

/// The full set of fields describing one flight operation.
///
/// Serializes to the flat export shape: absent values are omitted, never `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drone_type: Option<DroneType>,
    #[serde(default, rename = "lateralContingencyManoeuvre", skip_serializing_if = "Option::is_none")]
    pub lateral_manoeuvre: Option<Manoeuvre>,
    #[serde(default, rename = "verticalContingencyManoeuvre", skip_serializing_if = "Option::is_none")]
    pub vertical_manoeuvre: Option<Manoeuvre>,
    #[serde(default, rename = "methodOffTermination", skip_serializing_if = "Option::is_none")]
    pub termination_method: Option<Termination>,
    #[serde(default, rename = "altitudeMeasurementErrorType", skip_serializing_if = "Option::is_none")]
    pub altitude_error_type: Option<AltitudeErrorType>,

    /// m/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_operational_speed: Option<f64>,
    /// Largest straight-line span of the airframe, in metres
    #[serde(default, rename = "maxUavDimensions", skip_serializing_if = "Option::is_none")]
    pub characteristic_dimension: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_measurement_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_inaccuracy: Option<f64>,
    #[serde(default, rename = "positionError", skip_serializing_if = "Option::is_none")]
    pub position_holding_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_error: Option<f64>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    /// Flight geography height in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_flight: Option<f64>,
    /// Same height in feet; always a projection of `height_flight`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_flight_ft: Option<f64>,
    /// Degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_angle: Option<f64>,
    /// Degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lateral_parachute_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_parachute_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grb_parachute_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, rename = "parachuteDescent", skip_serializing_if = "Option::is_none")]
    pub descent_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glide_ratio: Option<f64>,

    /// Name under which the configuration is stored in the saved catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Configuration {
    /// An empty configuration: every selection unset, every number absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(&self, field: NumericField) -> Option<f64> {
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

    pub fn number_mut(&mut self, field: NumericField) -> &mut Option<f64> {
        match field {
            NumericField::MaxOperationalSpeed => &mut self.max_operational_speed,
            NumericField::CharacteristicDimension => &mut self.characteristic_dimension,
            NumericField::AltitudeMeasurementError => &mut self.altitude_measurement_error,
            NumericField::GpsInaccuracy => &mut self.gps_inaccuracy,
            NumericField::PositionHoldingError => &mut self.position_holding_error,
            NumericField::MapError => &mut self.map_error,
            NumericField::ResponseTime => &mut self.response_time,
            NumericField::HeightFlight => &mut self.height_flight,
            NumericField::HeightFlightFt => &mut self.height_flight_ft,
            NumericField::RollAngle => &mut self.roll_angle,
            NumericField::PitchAngle => &mut self.pitch_angle,
            NumericField::LateralParachuteTime => &mut self.lateral_parachute_time,
            NumericField::ResponseHeight => &mut self.response_height,
            NumericField::VerticalParachuteTime => &mut self.vertical_parachute_time,
            NumericField::GrbParachuteTime => &mut self.grb_parachute_time,
            NumericField::WindSpeed => &mut self.wind_speed,
            NumericField::DescentRate => &mut self.descent_rate,
            NumericField::GlideRatio => &mut self.glide_ratio,
        }
    }

    pub fn set_number(&mut self, field: NumericField, value: Option<f64>) {
        *self.number_mut(field) = value;
    }

    /// Wire value of a selection field, or `None` for numeric fields and unset selections.
    pub fn selection(&self, field: FieldId) -> Option<&'static str> {
        match field {
            FieldId::DroneType => self.drone_type.map(WireValue::as_str),
            FieldId::LateralManoeuvre => self.lateral_manoeuvre.map(WireValue::as_str),
            FieldId::VerticalManoeuvre => self.vertical_manoeuvre.map(WireValue::as_str),
            FieldId::TerminationMethod => self.termination_method.map(WireValue::as_str),
            FieldId::AltitudeErrorType => self.altitude_error_type.map(WireValue::as_str),
            FieldId::Number(_) | FieldId::Name => None,
        }
    }

    /// Whether `field` is shown on the form for the current selections.
    ///
    /// Hidden fields carry no rules and are cleared on the next selection edit.
    pub fn applies(&self, field: NumericField) -> bool {
        match field {
            NumericField::LateralParachuteTime => {
                self.lateral_manoeuvre == Some(Manoeuvre::ParachuteTermination)
            }
            NumericField::VerticalParachuteTime => {
                self.vertical_manoeuvre == Some(Manoeuvre::ParachuteTermination)
            }
            NumericField::GrbParachuteTime | NumericField::WindSpeed | NumericField::DescentRate => {
                self.termination_method == Some(Termination::Parachute)
            }
            NumericField::GlideRatio => self.termination_method == Some(Termination::OffGliding),
            _ => true,
        }
    }

    /// Whether either contingency manoeuvre already deploys the parachute.
    pub fn has_parachute_manoeuvre(&self) -> bool {
        self.lateral_manoeuvre == Some(Manoeuvre::ParachuteTermination)
            || self.vertical_manoeuvre == Some(Manoeuvre::ParachuteTermination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip_through_parse() {
        for value in Manoeuvre::ALL {
            assert_eq!(Manoeuvre::parse(value.as_str()), Some(*value));
        }
        for value in Termination::ALL {
            assert_eq!(Termination::parse(value.as_str()), Some(*value));
        }
        assert_eq!(DroneType::parse("FIXEDWING"), Some(DroneType::Fixedwing));
        assert_eq!(DroneType::parse(" FIXEDWING "), None);
        assert_eq!(DroneType::parse("fixedwing"), None);
    }

    #[test]
    fn altitude_error_type_accepts_both_spellings() {
        assert_eq!(AltitudeErrorType::parse("GPS-based"), Some(AltitudeErrorType::GpsBased));
        assert_eq!(AltitudeErrorType::parse("GPS_BASED"), Some(AltitudeErrorType::GpsBased));
        assert_eq!(AltitudeErrorType::parse("BAROMETRIC"), Some(AltitudeErrorType::Barometric));
        assert_eq!(AltitudeErrorType::parse("sonar"), None);
    }

    #[test]
    fn field_ids_parse_wire_names_and_aliases() {
        assert_eq!(FieldId::parse("methodOffTermination"), Some(FieldId::TerminationMethod));
        assert_eq!(FieldId::parse("terminationMethod"), Some(FieldId::TerminationMethod));
        assert_eq!(
            NumericField::parse("characteristicDimension"),
            Some(NumericField::CharacteristicDimension)
        );
        assert_eq!(NumericField::parse("maxUavDimensions"), Some(NumericField::CharacteristicDimension));
        assert_eq!(NumericField::parse("droneType"), None);
        for field in NumericField::ALL {
            assert_eq!(NumericField::parse(field.as_str()), Some(field));
        }
    }

    #[test]
    fn export_omits_absent_values() {
        let mut config = Configuration::new();
        config.drone_type = Some(DroneType::Fixedwing);
        config.lateral_manoeuvre = Some(Manoeuvre::Turn180);
        config.height_flight = Some(30.0);

        let json = serde_json::to_value(&config).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object["droneType"], "FIXEDWING");
        assert_eq!(object["lateralContingencyManoeuvre"], "TURN_180");
        assert_eq!(object["heightFlight"], 30.0);
    }

    #[test]
    fn dependent_fields_apply_only_under_their_selection() {
        let mut config = Configuration::new();
        assert!(config.applies(NumericField::HeightFlight));
        assert!(!config.applies(NumericField::WindSpeed));
        assert!(!config.applies(NumericField::GlideRatio));
        assert!(!config.applies(NumericField::LateralParachuteTime));

        config.termination_method = Some(Termination::Parachute);
        config.vertical_manoeuvre = Some(Manoeuvre::ParachuteTermination);
        assert!(config.applies(NumericField::WindSpeed));
        assert!(config.applies(NumericField::DescentRate));
        assert!(config.applies(NumericField::GrbParachuteTime));
        assert!(config.applies(NumericField::VerticalParachuteTime));
        assert!(!config.applies(NumericField::LateralParachuteTime));
        assert!(!config.applies(NumericField::GlideRatio));
    }

    #[test]
    fn number_accessors_cover_every_field() {
        let mut config = Configuration::new();
        for (idx, field) in NumericField::ALL.into_iter().enumerate() {
            config.set_number(field, Some(idx as f64));
        }
        for (idx, field) in NumericField::ALL.into_iter().enumerate() {
            assert_eq!(config.number(field), Some(idx as f64));
        }
    }
}
