use chrono::{DateTime, Utc};

use crate::model::common::{CandidateId, InstanceId, InstanceState};

/// A voting instance as decoded from the ledger.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    pub id: InstanceId,
    pub name: String,
    pub organization_name: String,
    pub description: String,
    /// The identity that created the instance and may administer it.
    pub creator: String,
    pub state: InstanceState,
    /// When voting opened; `None` until the instance is started.
    pub start_time: Option<DateTime<Utc>>,
    /// When voting is due to close. Advisory only; the state field above
    /// decides whether votes are accepted.
    pub end_time: Option<DateTime<Utc>>,
    pub candidate_count: u64,
    pub is_private: bool,
}

/// A candidate standing for one role of an instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    /// The contest this candidate stands in. Each voter gets one vote
    /// per distinct role.
    pub role: String,
    pub description: String,
    pub vote_count: u64,
}

/// A known voter of an instance and the roles they have voted for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoterRoles {
    pub voter: String,
    pub roles: Vec<String>,
}

/// An event recorded by the ledger against an instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LedgerEvent {
    InstanceCreated {
        at: DateTime<Utc>,
    },
    CandidateAdded {
        candidate: CandidateId,
        at: DateTime<Utc>,
    },
    CandidateUpdated {
        candidate: CandidateId,
        at: DateTime<Utc>,
    },
    VoteCast {
        candidate: CandidateId,
        voter: String,
        at: DateTime<Utc>,
    },
}
