// Service exports
pub mod postgres;
pub mod relay;

pub use postgres::{ParticipantStore, StoreError};
pub use relay::{RelayClient, RelayError};
