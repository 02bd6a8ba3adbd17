//! Required-field sweep run before submission and export.

use crate::ledger::{FieldError, Ledger, Message};
use crate::models::{Configuration, FieldId, Manoeuvre, NumericField, Termination};
use crate::rules::{format_number, keys, FormRules};

/// Every `submit.` finding for `config`, in form order.
pub fn validate_for_submission(config: &Configuration, rules: &FormRules) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut push = |field: FieldId, message: Message| errors.push(FieldError { field, message });

    let required_selections = [
        (FieldId::DroneType, config.drone_type.is_some()),
        (FieldId::AltitudeErrorType, config.altitude_error_type.is_some()),
        (FieldId::LateralManoeuvre, config.lateral_manoeuvre.is_some()),
        (FieldId::VerticalManoeuvre, config.vertical_manoeuvre.is_some()),
        (FieldId::TerminationMethod, config.termination_method.is_some()),
    ];
    for (field, present) in required_selections {
        if !present {
            push(field, Message::new(keys::REQUIRED));
        }
    }

    for field in [NumericField::MaxOperationalSpeed, NumericField::CharacteristicDimension] {
        match config.number(field) {
            None => push(field.into(), Message::new(keys::REQUIRED)),
            Some(value) if value <= 0.0 => push(field.into(), Message::new(keys::MUST_BE_POSITIVE)),
            Some(_) => {}
        }
    }

    if config.height_flight.is_none() {
        push(NumericField::HeightFlight.into(), Message::new(keys::REQUIRED));
    }

    let lateral_parachute = config.lateral_manoeuvre == Some(Manoeuvre::ParachuteTermination);
    let vertical_parachute = config.vertical_manoeuvre == Some(Manoeuvre::ParachuteTermination);
    if lateral_parachute && config.lateral_parachute_time.is_none() {
        push(NumericField::LateralParachuteTime.into(), Message::new(keys::REQUIRED));
    }
    // One parachute deployment covers both manoeuvres.
    if vertical_parachute && !lateral_parachute && config.vertical_parachute_time.is_none() {
        push(NumericField::VerticalParachuteTime.into(), Message::new(keys::REQUIRED));
    }

    match config.termination_method {
        Some(Termination::Parachute) => {
            match config.grb_parachute_time {
                None if !config.has_parachute_manoeuvre() => {
                    push(NumericField::GrbParachuteTime.into(), Message::new(keys::REQUIRED))
                }
                Some(time) if time < rules.min_grb_parachute_time_s => push(
                    NumericField::GrbParachuteTime.into(),
                    Message::new(keys::PARACHUTE_TIME_BELOW_MINIMUM)
                        .with_param("min", format_number(rules.min_grb_parachute_time_s)),
                ),
                _ => {}
            }
            match config.wind_speed {
                None => push(NumericField::WindSpeed.into(), Message::new(keys::REQUIRED)),
                Some(speed) if speed < rules.min_wind_speed_mps => push(
                    NumericField::WindSpeed.into(),
                    Message::new(keys::WIND_SPEED_BELOW_MINIMUM)
                        .with_param("min", format_number(rules.min_wind_speed_mps)),
                ),
                Some(_) => {}
            }
            match config.descent_rate {
                None => push(NumericField::DescentRate.into(), Message::new(keys::REQUIRED)),
                Some(rate) if rate <= 0.0 => {
                    push(NumericField::DescentRate.into(), Message::new(keys::MUST_BE_POSITIVE))
                }
                Some(_) => {}
            }
        }
        Some(Termination::OffGliding) if config.glide_ratio.is_none() => {
            push(NumericField::GlideRatio.into(), Message::new(keys::REQUIRED));
        }
        _ => {}
    }

    errors
}

/// Replace all `submit.` entries in `ledger` with a fresh sweep.
pub fn sweep(config: &Configuration, rules: &FormRules, ledger: &mut Ledger) {
    ledger.clear_prefix(keys::SUBMIT_PREFIX);
    for error in validate_for_submission(config, rules) {
        ledger.upsert_rule(error.field, keys::SUBMIT_PREFIX, Some(error.message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AltitudeErrorType, DroneType};

    fn complete() -> Configuration {
        Configuration {
            drone_type: Some(DroneType::Multirotor),
            altitude_error_type: Some(AltitudeErrorType::Barometric),
            lateral_manoeuvre: Some(Manoeuvre::Stopping),
            vertical_manoeuvre: Some(Manoeuvre::EnergyConversion),
            termination_method: Some(Termination::SimplifiedApproach),
            max_operational_speed: Some(10.0),
            characteristic_dimension: Some(1.2),
            height_flight: Some(50.0),
            height_flight_ft: Some(164.04),
            ..Configuration::new()
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<FieldId> {
        errors.iter().map(|error| error.field).collect()
    }

    #[test]
    fn complete_configuration_passes() {
        assert!(validate_for_submission(&complete(), &FormRules::default()).is_empty());
    }

    #[test]
    fn empty_configuration_lists_required_fields() {
        let errors = validate_for_submission(&Configuration::new(), &FormRules::default());
        assert_eq!(
            fields(&errors),
            vec![
                FieldId::DroneType,
                FieldId::AltitudeErrorType,
                FieldId::LateralManoeuvre,
                FieldId::VerticalManoeuvre,
                FieldId::TerminationMethod,
                NumericField::MaxOperationalSpeed.into(),
                NumericField::CharacteristicDimension.into(),
                NumericField::HeightFlight.into(),
            ]
        );
        assert!(errors.iter().all(|error| error.message.key == keys::REQUIRED));
    }

    #[test]
    fn parachute_termination_requirements() {
        let config = Configuration {
            termination_method: Some(Termination::Parachute),
            grb_parachute_time: Some(2.0),
            wind_speed: Some(2.0),
            ..complete()
        };
        let errors = validate_for_submission(&config, &FormRules::default());
        let keys_found: Vec<_> = errors.iter().map(|e| e.message.key.as_str()).collect();
        assert_eq!(
            keys_found,
            vec![keys::PARACHUTE_TIME_BELOW_MINIMUM, keys::WIND_SPEED_BELOW_MINIMUM, keys::REQUIRED]
        );
        assert_eq!(errors[2].field, NumericField::DescentRate.into());
    }

    #[test]
    fn grb_time_optional_when_a_manoeuvre_deploys_the_parachute() {
        let config = Configuration {
            lateral_manoeuvre: Some(Manoeuvre::ParachuteTermination),
            lateral_parachute_time: Some(1.5),
            termination_method: Some(Termination::Parachute),
            wind_speed: Some(5.0),
            descent_rate: Some(4.5),
            ..complete()
        };
        assert!(validate_for_submission(&config, &FormRules::default()).is_empty());
    }

    #[test]
    fn vertical_parachute_time_not_required_after_lateral_parachute() {
        let mut config = Configuration {
            vertical_manoeuvre: Some(Manoeuvre::ParachuteTermination),
            ..complete()
        };
        let errors = validate_for_submission(&config, &FormRules::default());
        assert_eq!(fields(&errors), vec![NumericField::VerticalParachuteTime.into()]);

        config.lateral_manoeuvre = Some(Manoeuvre::ParachuteTermination);
        config.lateral_parachute_time = Some(1.0);
        assert!(validate_for_submission(&config, &FormRules::default()).is_empty());
    }

    #[test]
    fn sweep_replaces_previous_findings() {
        let rules = FormRules::default();
        let mut ledger = Ledger::new();
        ledger.upsert_rule(FieldId::Name, keys::NAME_PREFIX, Some(Message::new(keys::NAME_IN_USE)));

        sweep(&Configuration::new(), &rules, &mut ledger);
        assert_eq!(ledger.len(), 9);

        sweep(&complete(), &rules, &mut ledger);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].field, FieldId::Name);
    }
}
