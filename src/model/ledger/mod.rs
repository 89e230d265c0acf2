//! The ledger holding voting instances.
//!
//! The trait mirrors the deployed contract's interface: batch inputs are
//! parallel arrays, and replies use the wire encodings below (numeric
//! status codes, epoch-second timestamps). Raw values never reach route
//! responses directly; they pass through the typed decoders in
//! [`decode`](self::decode) first.

mod decode;
mod memory;

pub use decode::{decode_event, decode_instance, decode_voter_roles, DecodeError};
pub use memory::MemoryLedger;

use std::sync::Arc;

use thiserror::Error;

use crate::model::common::{CandidateId, InstanceId, InstanceState};

/// Shared handle to the ledger backing the service.
pub type SharedLedger = Arc<dyn Ledger>;

/// Event kind codes used on the wire.
pub mod event_kind {
    pub const INSTANCE_CREATED: u8 = 0;
    pub const CANDIDATE_ADDED: u8 = 1;
    pub const CANDIDATE_UPDATED: u8 = 2;
    pub const VOTE_CAST: u8 = 3;
}

/// A ledger reply describing one voting instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawInstance {
    pub id: u64,
    pub name: String,
    pub organization_name: String,
    pub description: String,
    pub creator: String,
    /// Status code: 0 Pending, 1 Active, 2 Ended.
    pub status: u8,
    /// Epoch seconds; zero until voting starts.
    pub start_time: u64,
    /// Epoch seconds; zero until voting starts.
    pub end_time: u64,
    pub candidate_count: u64,
    pub is_private: bool,
}

/// A ledger reply describing one candidate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawCandidate {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub description: String,
    pub vote_count: u64,
}

/// Voters and their voted roles, as parallel arrays of equal length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawVoterRoles {
    pub voters: Vec<String>,
    pub roles: Vec<Vec<String>>,
}

/// One recorded event: a kind code plus the fields every kind shares.
/// `candidate_id` is zero and `actor` empty where the kind has no use
/// for them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawEvent {
    pub kind: u8,
    pub instance_id: u64,
    pub candidate_id: u64,
    pub actor: String,
    /// Epoch seconds at which the ledger recorded the event.
    pub timestamp: u64,
}

/// Errors arising from ledger operations.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum LedgerError {
    /// No instance with this id: never created, or since deleted.
    #[error("no voting instance with id {0}")]
    UnknownInstance(InstanceId),
    /// No such candidate within the instance.
    #[error("no candidate {candidate} in voting instance {instance}")]
    UnknownCandidate {
        instance: InstanceId,
        candidate: CandidateId,
    },
    /// The operation is not legal in the instance's current state.
    #[error("voting instance {instance} is {state}: cannot {operation}")]
    WrongState {
        instance: InstanceId,
        state: InstanceState,
        operation: &'static str,
    },
    /// The voter has already used their vote for this role.
    #[error("'{voter}' has already voted for role '{role}' in instance {instance}")]
    AlreadyVoted {
        instance: InstanceId,
        voter: String,
        role: String,
    },
    /// The ledger rejected malformed input.
    #[error("{0}")]
    Invalid(String),
    /// The ledger could not be reached or failed mid-call. Unused by the
    /// in-memory implementation; remote ones need it.
    #[error("ledger transport failure: {0}")]
    Transport(String),
}

/// The voting ledger.
///
/// Every mutating call either fully applies or leaves the ledger
/// untouched; in particular the duplicate-vote check and the tally
/// increment of [`vote`](Ledger::vote) must be atomic.
#[rocket::async_trait]
pub trait Ledger: Send + Sync {
    /// Create a Pending instance and return its id. Ids are assigned
    /// monotonically and never reused, even after deletion.
    async fn create_instance(
        &self,
        name: &str,
        organization_name: &str,
        description: &str,
        creator: &str,
        is_private: bool,
    ) -> Result<InstanceId, LedgerError>;

    async fn get_instance(&self, instance: InstanceId) -> Result<RawInstance, LedgerError>;

    /// All instances, ordered by ascending id.
    async fn get_instances(&self) -> Result<Vec<RawInstance>, LedgerError>;

    async fn delete_instance(&self, instance: InstanceId) -> Result<(), LedgerError>;

    /// Add candidates from parallel `names`/`roles`/`descriptions`
    /// arrays, returning the assigned ids in order.
    async fn add_candidates(
        &self,
        instance: InstanceId,
        names: Vec<String>,
        roles: Vec<String>,
        descriptions: Vec<String>,
    ) -> Result<Vec<CandidateId>, LedgerError>;

    /// Replace a candidate's details wholesale.
    async fn update_candidate(
        &self,
        instance: InstanceId,
        candidate: CandidateId,
        name: String,
        role: String,
        description: String,
    ) -> Result<(), LedgerError>;

    async fn remove_candidate(
        &self,
        instance: InstanceId,
        candidate: CandidateId,
    ) -> Result<(), LedgerError>;

    async fn get_candidates(&self, instance: InstanceId) -> Result<Vec<RawCandidate>, LedgerError>;

    /// Register voters; duplicates are ignored.
    async fn add_voters(&self, instance: InstanceId, voters: Vec<String>)
        -> Result<(), LedgerError>;

    async fn get_voters_and_roles(&self, instance: InstanceId)
        -> Result<RawVoterRoles, LedgerError>;

    /// Open voting on a Pending instance for `duration_secs` seconds.
    async fn start_voting(
        &self,
        instance: InstanceId,
        duration_secs: u64,
    ) -> Result<(), LedgerError>;

    /// Push an Active instance's end time back by `duration_secs`.
    async fn extend_voting(
        &self,
        instance: InstanceId,
        duration_secs: u64,
    ) -> Result<(), LedgerError>;

    /// Force an instance to Ended. Valid from Pending or Active.
    async fn end_voting(&self, instance: InstanceId) -> Result<(), LedgerError>;

    /// Record `voter`'s vote for `candidate`, charging it against the
    /// candidate's role.
    async fn vote(
        &self,
        instance: InstanceId,
        candidate: CandidateId,
        voter: &str,
    ) -> Result<(), LedgerError>;

    /// The recorded events of an instance, oldest first.
    async fn events(&self, instance: InstanceId) -> Result<Vec<RawEvent>, LedgerError>;
}
