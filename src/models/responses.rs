use serde::{Deserialize, Serialize};

use crate::models::domain::{PairRecord, Participant};

/// Partner details echoed back to a submitter who got paired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPartner {
    pub name: String,
    pub phone: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Response for the submission endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: String,
    #[serde(rename = "participantId")]
    pub participant_id: i64,
    pub matched: Option<MatchedPartner>,
}

/// Admin view: full roster plus the reconstructed pair list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub participants: Vec<Participant>,
    pub pairings: Vec<PairRecord>,
}

/// Response for the admin delete endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
