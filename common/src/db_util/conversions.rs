//! Checked conversions between rust and sql types.

use super::*;

pub fn i64_to_bool(i: i64) -> Result<bool> {
    match i {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ReconcileError::Query(format!(
            "confirm flag {i} is neither 0 nor 1"
        ))),
    }
}
pub fn bool_to_i64(b: bool) -> i64 {
    i64::from(b)
}

pub fn i64_to_usize(i: i64) -> Result<usize> {
    usize::try_from(i)
        .map_err(|_| ReconcileError::Query(format!("count {i} cannot be converted to usize")))
}
