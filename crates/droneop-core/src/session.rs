//! One editing session over a configuration.

use tracing::{debug, info};

use crate::catalog::DroneRecord;
use crate::error::{ExportError, ReconcileError, RecordError, SubmitError};
use crate::graph::{Edit, FieldGraph};
use crate::guard::{Fingerprint, SubmissionGuard};
use crate::ledger::Ledger;
use crate::models::{Configuration, Manoeuvre, Termination};
use crate::options::{lateral_options, termination_options, vertical_options, OptionSet};
use crate::reconcile::{ImportedConfiguration, Reconciler};
use crate::request::{build_request, OperationRequest};
use crate::rules::FormRules;
use crate::validation;

/// Owns the configuration being edited, its ledger and the submission baseline.
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    config: Configuration,
    ledger: Ledger,
    guard: SubmissionGuard,
    rules: FormRules,
    known_names: Vec<String>,
}

impl FormSession {
    pub fn new(rules: FormRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn rules(&self) -> &FormRules {
        &self.rules
    }

    pub fn known_names(&self) -> &[String] {
        &self.known_names
    }

    /// Names already used in the saved catalog.
    pub fn set_known_names(&mut self, names: Vec<String>) {
        self.known_names = names;
    }

    pub fn lateral_options(&self) -> OptionSet<Manoeuvre> {
        lateral_options(self.config.drone_type)
    }

    pub fn vertical_options(&self) -> OptionSet<Manoeuvre> {
        vertical_options(self.config.drone_type)
    }

    pub fn termination_options(&self) -> OptionSet<Termination> {
        termination_options(
            self.config.drone_type,
            self.config.lateral_manoeuvre,
            self.config.vertical_manoeuvre,
        )
    }

    pub fn apply(&mut self, edit: Edit) {
        FieldGraph::new(&self.rules)
            .with_known_names(&self.known_names)
            .apply_in_place(&mut self.config, &mut self.ledger, edit);
    }

    /// Replace the configuration with an imported one.
    ///
    /// On error the session is left exactly as it was.
    pub fn import_json(&mut self, input: &str) -> Result<(), ReconcileError> {
        let (config, ledger) = Reconciler::new(&self.rules).reconcile_str(input)?;
        self.config = config;
        self.ledger = ledger;
        Ok(())
    }

    pub fn import(&mut self, imported: &ImportedConfiguration) -> Result<(), ReconcileError> {
        let (config, ledger) = Reconciler::new(&self.rules).reconcile(imported)?;
        self.config = config;
        self.ledger = ledger;
        Ok(())
    }

    pub fn load_record(&mut self, record: &DroneRecord) -> Result<(), ReconcileError> {
        debug!(name = %record.name, "loading saved configuration");
        let (config, ledger) = Reconciler::new(&self.rules).reconcile_value(record.to_import())?;
        self.config = config;
        self.ledger = ledger;
        Ok(())
    }

    /// Serialize the configuration for the export file.
    pub fn export_json(&mut self) -> Result<String, ExportError> {
        validation::sweep(&self.config, &self.rules, &mut self.ledger);
        if self.ledger.has_any() {
            return Err(ExportError::Invalid(self.ledger.entries().to_vec()));
        }
        Ok(serde_json::to_string_pretty(&self.config)?)
    }

    /// Run the submission sweep and build the calculator request.
    ///
    /// Validation failures take precedence over the unchanged check.
    pub fn prepare_submission(&mut self) -> Result<OperationRequest, SubmitError> {
        validation::sweep(&self.config, &self.rules, &mut self.ledger);
        if self.ledger.has_any() {
            return Err(SubmitError::Invalid(self.ledger.entries().to_vec()));
        }
        if !self.guard.has_changed(&self.config) {
            return Err(SubmitError::Unchanged);
        }
        build_request(&self.config, &self.rules)
    }

    /// Record the current configuration as successfully submitted.
    pub fn mark_submitted(&mut self) -> &Fingerprint {
        let fingerprint = self.guard.mark_submitted(&self.config);
        info!(fingerprint = %fingerprint, "configuration submitted");
        fingerprint
    }

    pub fn has_changed(&self) -> bool {
        self.guard.has_changed(&self.config)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.config)
    }

    /// Discard the configuration and ledger. The submission baseline is kept.
    pub fn reset(&mut self) {
        self.config = Configuration::new();
        self.ledger = Ledger::new();
    }

    pub fn to_record(&self) -> Result<DroneRecord, RecordError> {
        DroneRecord::from_configuration(&self.config)
    }
}
