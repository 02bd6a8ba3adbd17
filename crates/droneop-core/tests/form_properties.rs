//! Property tests for the form engine.
//!
//! Run with: cargo test --test form_properties

use droneop_core::graph::apply;
use droneop_core::{
    keys, lateral_options, termination_options, vertical_options, Configuration, DroneType,
    Edit, FieldId, FormRules, Ledger, Manoeuvre, Message, NumericField, Termination, WireValue,
};
use proptest::prelude::*;
use proptest::sample::select;

fn drone_type() -> impl Strategy<Value = DroneType> {
    select(DroneType::ALL)
}

fn manoeuvre() -> impl Strategy<Value = Manoeuvre> {
    select(Manoeuvre::ALL)
}

fn numeric_field() -> impl Strategy<Value = NumericField> {
    select(NumericField::ALL.to_vec())
}

fn selection_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        proptest::option::of(drone_type()).prop_map(Edit::DroneType),
        proptest::option::of(manoeuvre()).prop_map(Edit::LateralManoeuvre),
        proptest::option::of(manoeuvre()).prop_map(Edit::VerticalManoeuvre),
        proptest::option::of(select(Termination::ALL)).prop_map(Edit::TerminationMethod),
    ]
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        selection_edit(),
        (numeric_field(), -10.0f64..500.0).prop_map(|(field, value)| Edit::number(field, value)),
        (numeric_field(), "[a-z ]{0,4}").prop_map(|(field, text)| Edit::input(field, text)),
    ]
}

fn run(edits: &[Edit]) -> (Configuration, Ledger) {
    let rules = FormRules::default();
    let mut state = (Configuration::new(), Ledger::new());
    for edit in edits {
        state = apply(&state.0, &state.1, edit.clone(), &rules);
    }
    state
}

proptest! {
    /// After a drone type change the lateral manoeuvre never keeps a stale value.
    #[test]
    fn test_cascade_completeness(
        first in drone_type(),
        second in drone_type(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(first != second);
        let options = lateral_options(Some(first));
        let lateral = *pick.get(options.as_slice());

        let (config, ledger) = run(&[
            Edit::DroneType(Some(first)),
            Edit::LateralManoeuvre(Some(lateral)),
            Edit::DroneType(Some(second)),
        ]);
        prop_assert_eq!(config.lateral_manoeuvre, None);
        prop_assert_eq!(ledger.first_message(FieldId::LateralManoeuvre), None);
    }

    /// Upserting the same message twice leaves exactly one entry.
    #[test]
    fn test_upsert_idempotence(field in numeric_field(), min in "[0-9]{1,3}\\.[0-9]{2}") {
        let mut ledger = Ledger::new();
        let message = Message::new(keys::HEIGHT_MIN_METRES).with_param("min", min);
        ledger.upsert_rule(field.into(), keys::HEIGHT_MIN_METRES, Some(message.clone()));
        let changed = ledger.upsert_rule(field.into(), keys::HEIGHT_MIN_METRES, Some(message.clone()));

        prop_assert!(!changed);
        prop_assert_eq!(ledger.len(), 1);
        prop_assert_eq!(ledger.first_message(field.into()), Some(&message));
    }

    /// A parachute manoeuvre leaves parachute as the only termination option.
    #[test]
    fn test_termination_suppression(
        drone in drone_type(),
        lateral in proptest::option::of(manoeuvre()),
        vertical in proptest::option::of(manoeuvre()),
    ) {
        let options = termination_options(Some(drone), lateral, vertical);
        let parachute_manoeuvre = lateral == Some(Manoeuvre::ParachuteTermination)
            || vertical == Some(Manoeuvre::ParachuteTermination);

        prop_assert!(options.contains(Termination::Parachute));
        if parachute_manoeuvre {
            prop_assert_eq!(options.as_slice(), &[Termination::Parachute]);
        } else {
            prop_assert_eq!(options.len(), 3);
        }
    }

    /// Arbitrary edit sequences keep the ledger free of duplicates and the
    /// height pair in step. Once a selection is edited, every number it
    /// controls is absent unless the selection requires it.
    #[test]
    fn test_edit_sequences_stay_consistent(
        mut edits in proptest::collection::vec(edit(), 0..24),
        last in selection_edit(),
    ) {
        edits.push(last);
        let (config, ledger) = run(&edits);

        let entries = ledger.entries();
        for (index, entry) in entries.iter().enumerate() {
            prop_assert!(!entries[index + 1..].contains(entry));
        }
        prop_assert_eq!(config.height_flight.is_some(), config.height_flight_ft.is_some());

        let both_min_entries = [
            (NumericField::HeightFlight, keys::HEIGHT_MIN_METRES),
            (NumericField::HeightFlightFt, keys::HEIGHT_MIN_FEET),
        ]
        .map(|(field, key)| ledger.for_field(field.into()).any(|message| message.key == key));
        prop_assert_eq!(both_min_entries[0], both_min_entries[1]);

        if config.termination_method != Some(Termination::Parachute) {
            prop_assert_eq!(config.wind_speed, None);
            prop_assert_eq!(config.descent_rate, None);
            prop_assert_eq!(config.grb_parachute_time, None);
        }
        if config.termination_method != Some(Termination::OffGliding) {
            prop_assert_eq!(config.glide_ratio, None);
        }
        if config.lateral_manoeuvre != Some(Manoeuvre::ParachuteTermination) {
            prop_assert_eq!(config.lateral_parachute_time, None);
        }
        if config.vertical_manoeuvre != Some(Manoeuvre::ParachuteTermination) {
            prop_assert_eq!(config.vertical_parachute_time, None);
        }
    }

    /// Manoeuvre options always end with the parachute.
    #[test]
    fn test_manoeuvre_options_end_with_parachute(drone in drone_type()) {
        for options in [lateral_options(Some(drone)), vertical_options(Some(drone))] {
            prop_assert_eq!(options.len(), 2);
            prop_assert_eq!(options.as_slice().last(), Some(&Manoeuvre::ParachuteTermination));
        }
    }
}
