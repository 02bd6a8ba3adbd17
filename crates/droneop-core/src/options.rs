//! Option Catalog: the legal choices for each dependent selection.
//!
//! Pure functions of the selections they depend on.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::models::{DroneType, Manoeuvre, Termination, WireValue};

/// An ordered set of options with logarithmic membership lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet<T: WireValue> {
    ordered: Vec<T>,
    index: BTreeSet<T>,
}

impl<T: WireValue> OptionSet<T> {
    fn from_ordered(ordered: Vec<T>) -> Self {
        let index = ordered.iter().copied().collect();
        Self { ordered, index }
    }

    pub fn empty() -> Self {
        Self::from_ordered(Vec::new())
    }

    pub fn contains(&self, value: T) -> bool {
        self.index.contains(&value)
    }

    /// Look an option up by its wire value.
    pub fn find_by_value(&self, value: &str) -> Option<T> {
        T::parse(value).filter(|candidate| self.contains(*candidate))
    }

    /// Keep `candidate` only if it is one of the options.
    pub fn resolve(&self, candidate: Option<T>) -> Option<T> {
        candidate.filter(|value| self.contains(*value))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.ordered.iter().copied()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionEntry {
    value: &'static str,
    label_key: &'static str,
}

impl<T: WireValue> Serialize for OptionSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|value| OptionEntry {
            value: value.as_str(),
            label_key: value.label_key(),
        }))
    }
}

/// Lateral contingency manoeuvres offered for a drone type.
pub fn lateral_options(drone_type: Option<DroneType>) -> OptionSet<Manoeuvre> {
    let Some(drone_type) = drone_type else {
        return OptionSet::empty();
    };
    let first = if drone_type.is_rotary() {
        Manoeuvre::Stopping
    } else {
        Manoeuvre::Turn180
    };
    OptionSet::from_ordered(vec![first, Manoeuvre::ParachuteTermination])
}

/// Vertical contingency manoeuvres offered for a drone type.
pub fn vertical_options(drone_type: Option<DroneType>) -> OptionSet<Manoeuvre> {
    let Some(drone_type) = drone_type else {
        return OptionSet::empty();
    };
    let first = if drone_type.is_rotary() {
        Manoeuvre::EnergyConversion
    } else {
        Manoeuvre::CircularPath
    };
    OptionSet::from_ordered(vec![first, Manoeuvre::ParachuteTermination])
}

/// Termination methods offered for a drone type and its chosen manoeuvres.
///
/// When either manoeuvre already triggers the parachute, only the parachute
/// itself is offered.
pub fn termination_options(
    drone_type: Option<DroneType>,
    lateral: Option<Manoeuvre>,
    vertical: Option<Manoeuvre>,
) -> OptionSet<Termination> {
    let Some(drone_type) = drone_type else {
        return OptionSet::empty();
    };
    let has_parachute = lateral == Some(Manoeuvre::ParachuteTermination)
        || vertical == Some(Manoeuvre::ParachuteTermination);

    let mut options = Vec::with_capacity(3);
    if !has_parachute {
        if drone_type.is_rotary() {
            options.extend([Termination::SimplifiedApproach, Termination::BallisticApproach]);
        } else {
            options.extend([Termination::OffNoGliding, Termination::OffGliding]);
        }
    }
    options.push(Termination::Parachute);
    OptionSet::from_ordered(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_options_without_drone_type() {
        assert!(lateral_options(None).is_empty());
        assert!(vertical_options(None).is_empty());
        assert!(termination_options(None, None, None).is_empty());
    }

    #[test]
    fn lateral_options_by_type() {
        assert_eq!(
            lateral_options(Some(DroneType::Multirotor)).as_slice(),
            &[Manoeuvre::Stopping, Manoeuvre::ParachuteTermination]
        );
        assert_eq!(
            lateral_options(Some(DroneType::Rotorcraft)).as_slice(),
            &[Manoeuvre::Stopping, Manoeuvre::ParachuteTermination]
        );
        assert_eq!(
            lateral_options(Some(DroneType::Fixedwing)).as_slice(),
            &[Manoeuvre::Turn180, Manoeuvre::ParachuteTermination]
        );
    }

    #[test]
    fn vertical_options_by_type() {
        assert_eq!(
            vertical_options(Some(DroneType::Multirotor)).as_slice(),
            &[Manoeuvre::EnergyConversion, Manoeuvre::ParachuteTermination]
        );
        assert_eq!(
            vertical_options(Some(DroneType::Fixedwing)).as_slice(),
            &[Manoeuvre::CircularPath, Manoeuvre::ParachuteTermination]
        );
    }

    #[test]
    fn termination_options_without_parachute_manoeuvre() {
        assert_eq!(
            termination_options(
                Some(DroneType::Fixedwing),
                Some(Manoeuvre::Turn180),
                Some(Manoeuvre::CircularPath)
            )
            .as_slice(),
            &[Termination::OffNoGliding, Termination::OffGliding, Termination::Parachute]
        );
        assert_eq!(
            termination_options(Some(DroneType::Rotorcraft), None, None).as_slice(),
            &[
                Termination::SimplifiedApproach,
                Termination::BallisticApproach,
                Termination::Parachute
            ]
        );
    }

    #[test]
    fn parachute_manoeuvre_suppresses_alternatives() {
        let options = termination_options(
            Some(DroneType::Multirotor),
            Some(Manoeuvre::Stopping),
            Some(Manoeuvre::ParachuteTermination),
        );
        assert_eq!(options.as_slice(), &[Termination::Parachute]);
    }

    #[test]
    fn lookup_by_value() {
        let options = lateral_options(Some(DroneType::Fixedwing));
        assert_eq!(options.find_by_value("TURN_180"), Some(Manoeuvre::Turn180));
        assert_eq!(options.find_by_value("STOPPING"), None);
        assert_eq!(options.find_by_value("HOVER"), None);
        assert_eq!(options.resolve(Some(Manoeuvre::Stopping)), None);
    }

    #[test]
    fn serializes_values_with_label_keys() {
        let json = serde_json::to_value(vertical_options(Some(DroneType::Fixedwing))).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "value": "CIRCULAR_PATH", "labelKey": "manoeuvre.circularPath" },
                { "value": "PARACHUTE_TERMINATION", "labelKey": "manoeuvre.triggerParachute" }
            ])
        );
    }
}
