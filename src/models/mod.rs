// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{PairRecord, Participant};
pub use requests::{LocationPayload, SubmitRequest};
pub use responses::{
    DeleteResponse, ErrorResponse, HealthResponse, MatchedPartner, OverviewResponse,
    SubmitResponse,
};
