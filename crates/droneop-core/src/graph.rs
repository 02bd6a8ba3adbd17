//! Field Dependency Graph.
//!
//! Every user edit goes through [`FieldGraph::apply`], a synchronous reducer
//! over `(Configuration, Ledger)`. Each edit kind runs a fixed sequence of
//! steps: store the primary value, recompute derived fields, reset dependent
//! selections and their dependent numbers, then re-run the rules whose
//! inputs changed.

use tracing::debug;

use crate::ledger::{Ledger, Message};
use crate::models::{
    AltitudeErrorType, Configuration, DroneType, FieldId, Manoeuvre, NumericField, Termination,
};
use crate::rules::{format_fixed2, keys, FormRules};
use crate::units;

/// Numbers shown only for particular manoeuvre or termination selections.
const SELECTION_DEPENDENT: [NumericField; 6] = [
    NumericField::LateralParachuteTime,
    NumericField::VerticalParachuteTime,
    NumericField::GrbParachuteTime,
    NumericField::WindSpeed,
    NumericField::DescentRate,
    NumericField::GlideRatio,
];

/// A single user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    DroneType(Option<DroneType>),
    LateralManoeuvre(Option<Manoeuvre>),
    VerticalManoeuvre(Option<Manoeuvre>),
    TerminationMethod(Option<Termination>),
    AltitudeErrorType(Option<AltitudeErrorType>),
    /// Raw text typed into a numeric field
    Number { field: NumericField, input: String },
    Name(Option<String>),
}

impl Edit {
    pub fn number(field: NumericField, value: f64) -> Self {
        Self::Number {
            field,
            input: value.to_string(),
        }
    }

    pub fn input(field: NumericField, input: impl Into<String>) -> Self {
        Self::Number {
            field,
            input: input.into(),
        }
    }

    /// The field the user touched.
    pub fn field(&self) -> FieldId {
        match self {
            Self::DroneType(_) => FieldId::DroneType,
            Self::LateralManoeuvre(_) => FieldId::LateralManoeuvre,
            Self::VerticalManoeuvre(_) => FieldId::VerticalManoeuvre,
            Self::TerminationMethod(_) => FieldId::TerminationMethod,
            Self::AltitudeErrorType(_) => FieldId::AltitudeErrorType,
            Self::Number { field, .. } => FieldId::Number(*field),
            Self::Name(_) => FieldId::Name,
        }
    }
}

/// Apply one edit to a configuration and its ledger, returning the new pair.
pub fn apply(config: &Configuration, ledger: &Ledger, edit: Edit, rules: &FormRules) -> (Configuration, Ledger) {
    FieldGraph::new(rules).apply(config, ledger, edit)
}

/// Reducer applying edits and their cascades.
#[derive(Debug, Clone, Copy)]
pub struct FieldGraph<'a> {
    rules: &'a FormRules,
    known_names: &'a [String],
}

impl<'a> FieldGraph<'a> {
    pub fn new(rules: &'a FormRules) -> Self {
        Self {
            rules,
            known_names: &[],
        }
    }

    /// Names already present in the saved catalog.
    pub fn with_known_names(mut self, known_names: &'a [String]) -> Self {
        self.known_names = known_names;
        self
    }

    pub fn rules(&self) -> &'a FormRules {
        self.rules
    }

    /// Pure form of [`FieldGraph::apply_in_place`].
    pub fn apply(&self, config: &Configuration, ledger: &Ledger, edit: Edit) -> (Configuration, Ledger) {
        let mut config = config.clone();
        let mut ledger = ledger.clone();
        self.apply_in_place(&mut config, &mut ledger, edit);
        (config, ledger)
    }

    pub fn apply_in_place(&self, config: &mut Configuration, ledger: &mut Ledger, edit: Edit) {
        debug!(field = %edit.field(), "applying edit");
        match edit {
            Edit::DroneType(value) => self.set_drone_type(config, ledger, value),
            Edit::LateralManoeuvre(value) => self.set_lateral(config, ledger, value),
            Edit::VerticalManoeuvre(value) => self.set_vertical(config, ledger, value),
            Edit::TerminationMethod(value) => self.set_termination(config, ledger, value),
            Edit::AltitudeErrorType(value) => self.set_altitude_error_type(config, ledger, value),
            Edit::Number { field, input } => self.set_number(config, ledger, field, &input),
            Edit::Name(value) => self.set_name(config, ledger, value),
        }
    }

    /// Evaluate every rule once against `config`, from scratch.
    pub fn rebuild_ledger(&self, config: &Configuration) -> Ledger {
        let mut ledger = Ledger::new();
        for field in NumericField::ALL {
            self.revalidate_stored(config, &mut ledger, field);
        }
        self.run_compatibility_rules(config, &mut ledger);
        self.run_height_rules(config, &mut ledger);
        debug!(entries = ledger.len(), "ledger rebuilt");
        ledger
    }

    /// Clear dependent numbers whose controlling selection no longer needs
    /// them and re-derive the response height.
    pub(crate) fn settle_dependents(&self, config: &mut Configuration, ledger: &mut Ledger) {
        clear_unused_dependents(config, ledger);
        self.recompute_response_height(config, ledger);
    }

    fn set_drone_type(&self, config: &mut Configuration, ledger: &mut Ledger, value: Option<DroneType>) {
        config.drone_type = value;
        ledger.clear(FieldId::DroneType);

        // Every dependent selection is re-chosen from the new type's catalog.
        reset_selection(config, ledger, FieldId::LateralManoeuvre);
        reset_selection(config, ledger, FieldId::VerticalManoeuvre);
        reset_selection(config, ledger, FieldId::TerminationMethod);
        clear_unused_dependents(config, ledger);
        debug!(drone_type = ?value, "dependent selections reset");

        self.revalidate_stored(config, ledger, NumericField::MaxOperationalSpeed);
        self.revalidate_dependents(config, ledger);
        self.run_compatibility_rules(config, ledger);
    }

    fn set_lateral(&self, config: &mut Configuration, ledger: &mut Ledger, value: Option<Manoeuvre>) {
        config.lateral_manoeuvre = value;
        ledger.clear(FieldId::LateralManoeuvre);
        reset_selection(config, ledger, FieldId::TerminationMethod);
        clear_unused_dependents(config, ledger);

        self.revalidate_dependents(config, ledger);
        self.run_compatibility_rules(config, ledger);
    }

    fn set_vertical(&self, config: &mut Configuration, ledger: &mut Ledger, value: Option<Manoeuvre>) {
        config.vertical_manoeuvre = value;
        ledger.clear(FieldId::VerticalManoeuvre);
        reset_selection(config, ledger, FieldId::TerminationMethod);
        clear_unused_dependents(config, ledger);

        self.revalidate_dependents(config, ledger);
        self.run_compatibility_rules(config, ledger);
    }

    fn set_termination(&self, config: &mut Configuration, ledger: &mut Ledger, value: Option<Termination>) {
        config.termination_method = value;
        ledger.clear(FieldId::TerminationMethod);
        clear_unused_dependents(config, ledger);

        self.revalidate_dependents(config, ledger);
        self.run_compatibility_rules(config, ledger);
    }

    fn set_altitude_error_type(
        &self,
        config: &mut Configuration,
        ledger: &mut Ledger,
        value: Option<AltitudeErrorType>,
    ) {
        config.altitude_error_type = value;
        ledger.clear(FieldId::AltitudeErrorType);

        if let Some(kind) = value {
            config.altitude_measurement_error = Some(self.rules.default_altitude_error(kind));
            ledger.upsert_rule(
                NumericField::AltitudeMeasurementError.into(),
                keys::SUBMIT_PREFIX,
                None,
            );
        }
        self.revalidate_stored(config, ledger, NumericField::AltitudeMeasurementError);
    }

    fn set_number(&self, config: &mut Configuration, ledger: &mut Ledger, field: NumericField, input: &str) {
        let check = self.rules.check_input(field, input, config);
        config.set_number(field, check.value);
        ledger.upsert_rule(field.into(), keys::INPUT_PREFIX, check.message);
        ledger.upsert_rule(field.into(), keys::SUBMIT_PREFIX, None);

        match field {
            NumericField::MaxOperationalSpeed | NumericField::ResponseTime => {
                self.recompute_response_height(config, ledger);
            }
            NumericField::HeightFlight => {
                config.height_flight_ft = check.value.map(units::metres_to_feet);
                clear_entry_rules(ledger, NumericField::HeightFlightFt);
                self.run_height_rules(config, ledger);
            }
            NumericField::HeightFlightFt => {
                config.height_flight = check.value.map(units::feet_to_metres);
                clear_entry_rules(ledger, NumericField::HeightFlight);
                self.run_height_rules(config, ledger);
            }
            NumericField::CharacteristicDimension => self.run_height_rules(config, ledger),
            _ => {}
        }
    }

    fn set_name(&self, config: &mut Configuration, ledger: &mut Ledger, value: Option<String>) {
        let value = value.map(|name| name.trim().to_string()).filter(|name| !name.is_empty());
        let in_use = value
            .as_ref()
            .is_some_and(|name| self.known_names.iter().any(|known| known == name));
        ledger.clear(FieldId::Name);
        ledger.upsert_rule(
            FieldId::Name,
            keys::NAME_PREFIX,
            in_use.then(|| Message::new(keys::NAME_IN_USE)),
        );
        config.name = value;
    }

    /// Re-run a field's numeric rule against its stored value, if any.
    fn revalidate_stored(&self, config: &Configuration, ledger: &mut Ledger, field: NumericField) {
        if let Some(value) = config.number(field) {
            let message = self.rules.check_value(field, value, config);
            ledger.upsert_rule(field.into(), keys::INPUT_PREFIX, message);
        }
    }

    /// A value typed while its field was hidden is checked once the field shows.
    fn revalidate_dependents(&self, config: &Configuration, ledger: &mut Ledger) {
        for field in SELECTION_DEPENDENT {
            self.revalidate_stored(config, ledger, field);
        }
    }

    /// `responseHeight = round(speed * factor * responseTime, 2)` while both drivers are present.
    fn recompute_response_height(&self, config: &mut Configuration, ledger: &mut Ledger) {
        match (config.max_operational_speed, config.response_time) {
            (Some(speed), Some(time)) => {
                let height = units::round_centi(speed * self.rules.response_height_factor * time);
                config.response_height = Some(height);
                clear_entry_rules(ledger, NumericField::ResponseHeight);
                self.revalidate_stored(config, ledger, NumericField::ResponseHeight);
                debug!(response_height = height, "response height derived");
            }
            _ => {
                if config.response_height.take().is_some() {
                    ledger.clear(NumericField::ResponseHeight.into());
                    debug!("response height cleared");
                }
            }
        }
    }

    /// Height must be at least `multiplier` × characteristic dimension.
    ///
    /// The verdict is taken once on the metre value and reported on both
    /// fields, each in its own unit, so the two entries always agree.
    fn run_height_rules(&self, config: &Configuration, ledger: &mut Ledger) {
        let minimum_m = match (config.characteristic_dimension, config.height_flight) {
            (Some(dimension), Some(height)) => {
                let minimum = self.rules.min_height_multiplier * dimension;
                (height < minimum - self.rules.height_tolerance_m).then_some(minimum)
            }
            _ => None,
        };

        let metres_message = minimum_m.map(|minimum| {
            Message::new(keys::HEIGHT_MIN_METRES).with_param("min", format_fixed2(minimum))
        });
        let feet_message = minimum_m
            .filter(|_| config.height_flight_ft.is_some())
            .map(|minimum| {
                Message::new(keys::HEIGHT_MIN_FEET)
                    .with_param("min", format_fixed2(minimum / units::METRES_PER_FOOT))
            });

        ledger.upsert_rule(NumericField::HeightFlight.into(), keys::HEIGHT_MIN_METRES, metres_message);
        ledger.upsert_rule(NumericField::HeightFlightFt.into(), keys::HEIGHT_MIN_FEET, feet_message);
    }

    fn run_compatibility_rules(&self, config: &Configuration, ledger: &mut Ledger) {
        let lateral = match (config.drone_type, config.lateral_manoeuvre) {
            (Some(DroneType::Multirotor), Some(Manoeuvre::Turn180)) => {
                Some(Message::new(keys::TURN_180_NOT_FOR_MULTIROTOR))
            }
            (Some(DroneType::Fixedwing), Some(Manoeuvre::Stopping)) => {
                Some(Message::new(keys::STOPPING_NOT_FOR_FIXEDWING))
            }
            _ => None,
        };
        ledger.upsert_rule(FieldId::LateralManoeuvre, keys::COMPAT_LATERAL_PREFIX, lateral);

        let termination = match (config.drone_type, config.termination_method) {
            (Some(DroneType::Fixedwing), Some(Termination::BallisticApproach)) => {
                Some(Message::new(keys::BALLISTIC_ONLY_FOR_ROTARY))
            }
            _ => None,
        };
        ledger.upsert_rule(FieldId::TerminationMethod, keys::COMPAT_TERMINATION_PREFIX, termination);
    }
}

fn reset_selection(config: &mut Configuration, ledger: &mut Ledger, field: FieldId) {
    match field {
        FieldId::LateralManoeuvre => config.lateral_manoeuvre = None,
        FieldId::VerticalManoeuvre => config.vertical_manoeuvre = None,
        FieldId::TerminationMethod => config.termination_method = None,
        _ => return,
    }
    ledger.clear(field);
}

/// Drop the entry-level (parse/range and submission) findings on a field.
fn clear_entry_rules(ledger: &mut Ledger, field: NumericField) {
    ledger.upsert_rule(field.into(), keys::INPUT_PREFIX, None);
    ledger.upsert_rule(field.into(), keys::SUBMIT_PREFIX, None);
}

fn clear_number(config: &mut Configuration, ledger: &mut Ledger, field: NumericField) {
    if config.number_mut(field).take().is_some() {
        debug!(field = %FieldId::from(field), "dependent value cleared");
    }
    ledger.clear(field.into());
}

/// Clear every number whose controlling selection does not call for it.
fn clear_unused_dependents(config: &mut Configuration, ledger: &mut Ledger) {
    for field in SELECTION_DEPENDENT {
        if !config.applies(field) {
            clear_number(config, ledger, field);
        }
    }
}
