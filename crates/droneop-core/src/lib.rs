pub mod catalog;
pub mod error;
pub mod graph;
pub mod guard;
pub mod ledger;
pub mod models;
pub mod options;
pub mod reconcile;
pub mod request;
pub mod rules;
pub mod session;
pub mod validation;

mod units;

pub use catalog::DroneRecord;
pub use error::{ExportError, ReconcileError, RecordError, SubmitError};
pub use graph::{Edit, FieldGraph};
pub use guard::{has_changed_since, Fingerprint, SubmissionGuard};
pub use ledger::{FieldError, Ledger, Message};
pub use models::{
    AltitudeErrorType, Configuration, DroneType, FieldId, Manoeuvre, NumericField, Termination,
    WireValue,
};
pub use options::{lateral_options, termination_options, vertical_options, OptionSet};
pub use reconcile::{ImportedConfiguration, Reconciler};
pub use request::{build_request, OperationRequest};
pub use rules::{keys, FormRules, NumericRule};
pub use session::FormSession;
pub use validation::validate_for_submission;
