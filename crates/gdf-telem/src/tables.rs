/// Static index to label tables for fix type and mortality status.
///
/// Forward lookups are total over the stored index width. Reverse lookups return the *first*
/// index carrying a label: several fix-type indices share a label (most notably "No Fix"), so
/// encoding from a label is lossy and best-effort. Encoding from the numeric index is exact.
use crate::{Error, GdfResult};

const NO_FIX: &str = "No Fix";
const GPS_1_SAT: &str = "GPS-1 Sat";
const GPS_2_SAT: &str = "GPS-2 Sat";
const GPS_2D: &str = "GPS-2D";
const GPS_3D: &str = "GPS-3D";
const VAL_GPS_3D: &str = "val. GPS-3D";

/// Fix type labels, indexed by the raw fix-type value.
#[rustfmt::skip]
pub static FIX_TYPE_LABELS: [&str; 256] = [
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-3", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-3", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-3", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-3", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-2", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-2", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-2", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-2", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-1", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-1", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-1", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-1", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-0", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-0", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-0", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-0", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-A", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-A", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-A", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-A", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-B", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-B", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-B", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-B", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
    NO_FIX, GPS_1_SAT, GPS_2_SAT, GPS_2D, VAL_GPS_3D, "Argos-Z", NO_FIX, NO_FIX,
];

/// Mortality status labels, indexed by the 3-bit raw value. The meaning of each code is
/// collar-specific, so the labels only name the raw value.
pub static MORT_STATUS_LABELS: [&str; 8] = [
    "Status 0", "Status 1", "Status 2", "Status 3", "Status 4", "Status 5", "Status 6", "Status 7",
];

pub fn fix_type_label(index: u8) -> &'static str {
    FIX_TYPE_LABELS[usize::from(index)]
}

/// Only the low 3 bits of `index` are significant.
pub fn mort_status_label(index: u8) -> &'static str {
    MORT_STATUS_LABELS[usize::from(index & 0x07)]
}

/// First fix-type index carrying `label`.
pub fn fix_type_index(label: &str) -> GdfResult<u8> {
    first_index(&FIX_TYPE_LABELS, label)
}

/// First mortality-status index carrying `label`.
pub fn mort_status_index(label: &str) -> GdfResult<u8> {
    first_index(&MORT_STATUS_LABELS, label)
}

fn first_index(labels: &[&str], label: &str) -> GdfResult<u8> {
    labels
        .iter()
        .position(|l| *l == label)
        .and_then(|i| u8::try_from(i).ok())
        .ok_or_else(|| Error::UnknownLabel(label.to_string()))
}
