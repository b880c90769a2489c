pub mod presence;
pub mod scheduler;
pub mod selection;
pub mod service;
pub mod state;
pub mod table;

pub use selection::{Selection, SelectionKind, SelectionParams};
pub use service::PartyService;
pub use state::{PartyState, PlayingTrack};
pub use table::{Party, PartyTable};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    /// Bad or missing client input.
    #[error("{0}")]
    Validation(String),
    /// The request needs state the party does not have.
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("catalog has no selectable tracks")]
    NoCandidates,
}
