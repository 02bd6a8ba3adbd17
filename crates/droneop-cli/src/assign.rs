//! `--set field=value` parsing.

use anyhow::{anyhow, bail, Result};
use droneop_core::{
    AltitudeErrorType, DroneType, Edit, FieldId, Manoeuvre, Termination, WireValue,
};

/// An empty value unsets a selection.
fn selection<T: WireValue>(field: FieldId, value: &str) -> Result<Option<T>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    T::parse(value)
        .map(Some)
        .ok_or_else(|| anyhow!("unknown value {value:?} for {field}"))
}

/// Parse one `field=value` assignment into an edit.
///
/// Numeric values are passed through as typed, so malformed numbers reach
/// the ledger the same way a keystroke would.
pub fn parse_assignment(assignment: &str) -> Result<Edit> {
    let Some((name, value)) = assignment.split_once('=') else {
        bail!("expected FIELD=VALUE, got {assignment:?}");
    };
    let field = FieldId::parse(name).ok_or_else(|| anyhow!("unknown field {:?}", name.trim()))?;

    Ok(match field {
        FieldId::DroneType => Edit::DroneType(selection::<DroneType>(field, value)?),
        FieldId::LateralManoeuvre => Edit::LateralManoeuvre(selection::<Manoeuvre>(field, value)?),
        FieldId::VerticalManoeuvre => Edit::VerticalManoeuvre(selection::<Manoeuvre>(field, value)?),
        FieldId::TerminationMethod => {
            Edit::TerminationMethod(selection::<Termination>(field, value)?)
        }
        FieldId::AltitudeErrorType => {
            Edit::AltitudeErrorType(selection::<AltitudeErrorType>(field, value)?)
        }
        FieldId::Number(field) => Edit::input(field, value),
        FieldId::Name => Edit::Name(Some(value.to_string()).filter(|name| !name.trim().is_empty())),
    })
}
