use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative band around each canonical ratio, as a fraction of that ratio.
pub const RATIO_TOLERANCE: f64 = 0.01;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Aspect bucket of a video, used as the storage partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Bucket a width/height pair.
    ///
    /// Callers must reject a zero height before getting here; a non-finite ratio
    /// lands in `Other`.
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        Self::from_ratio(width / height)
    }

    pub fn from_ratio(ratio: f64) -> Self {
        if within_tolerance(ratio, LANDSCAPE_RATIO) {
            AspectClass::Landscape
        } else if within_tolerance(ratio, PORTRAIT_RATIO) {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    /// Key prefix under which objects of this class are stored.
    pub fn partition(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.partition())
    }
}

fn within_tolerance(ratio: f64, target: f64) -> bool {
    let band = target * RATIO_TOLERANCE;
    ratio >= target - band && ratio <= target + band
}
