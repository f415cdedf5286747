use serde::{Deserialize, Serialize};
use validator::Validate;

/// A form submission: who, how to reach them, where they are
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    #[validate(nested)]
    pub location: LocationPayload,
}

/// WGS84 decimal degrees
///
/// JSON cannot encode NaN/infinity, and the range checks reject anything a
/// lenient client still manages to send, so the engine only ever sees
/// finite in-range coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationPayload {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}
