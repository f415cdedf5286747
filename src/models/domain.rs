use serde::{Deserialize, Serialize};

/// A submitter with a known position
///
/// `phone` is the de-duplication key: re-submitting with the same phone
/// updates name and position in place. `matched_with` holds the partner's
/// id and is either symmetric or absent on both sides.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "matchedWith")]
    pub matched_with: Option<i64>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One mutual pair for the admin view, distance recomputed at read time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    #[serde(rename = "nameA")]
    pub name_a: String,
    #[serde(rename = "phoneA")]
    pub phone_a: String,
    #[serde(rename = "nameB")]
    pub name_b: String,
    #[serde(rename = "phoneB")]
    pub phone_b: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}
