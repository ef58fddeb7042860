//! Derived link metrics.
//!
//! - `Q`  = `Q10` / 10, floored
//! - `SN` = `signal` - `noise`
//!
//! A derived field exists only when its inputs parse as integers and the
//! result fits in an `i64`.

use crate::fields::Fields;

pub const QUALITY_X10: &str = "Q10";
pub const QUALITY: &str = "Q";
pub const SIGNAL: &str = "signal";
pub const NOISE: &str = "noise";
pub const SIGNAL_NOISE: &str = "SN";

/// Add derived metrics to `fields`; everything else passes through.
pub fn derive(mut fields: Fields) -> Fields {
    if let Some(q10) = fields.get_int(QUALITY_X10) {
        fields.insert(QUALITY, q10.div_euclid(10));
    }
    if let (Some(signal), Some(noise)) = (fields.get_int(SIGNAL), fields.get_int(NOISE)) {
        if let Some(sn) = signal.checked_sub(noise) {
            fields.insert(SIGNAL_NOISE, sn);
        }
    }
    fields
}

/// Keys [`derive`] can add when the given raw keys are captured.
pub fn derivable_keys<'a>(captured: impl IntoIterator<Item = &'a str>) -> Vec<&'static str> {
    let captured: Vec<&str> = captured.into_iter().collect();
    let mut keys = Vec::new();
    if captured.contains(&QUALITY_X10) {
        keys.push(QUALITY);
    }
    if captured.contains(&SIGNAL) && captured.contains(&NOISE) {
        keys.push(SIGNAL_NOISE);
    }
    keys
}
