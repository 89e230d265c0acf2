//! Domain entities shared between the ledger layer and the API.

mod instance;
mod results;
mod state;

pub use instance::{Candidate, Instance, LedgerEvent, VoterRoles};
pub use results::{ranked_results, RoleResult};
pub use state::InstanceState;

/// Unique identifier of a voting instance, assigned by the ledger
/// starting from 1.
pub type InstanceId = u64;

/// Identifier of a candidate, unique within its instance.
pub type CandidateId = u64;
