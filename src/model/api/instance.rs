use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::common::{
    Candidate, CandidateId, Instance, InstanceId, InstanceState, LedgerEvent, RoleResult,
    VoterRoles,
};

/// Request body for creating a voting instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    pub name: String,
    pub organization_name: String,
    pub description: String,
    pub creator: String,
    #[serde(default)]
    pub is_private: bool,
}

impl InstanceSpec {
    pub fn validate(&self) -> Result<(), Error> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("organizationName", &self.organization_name),
            ("description", &self.description),
            ("creator", &self.creator),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "required fields must not be empty: {}",
                missing.join(", ")
            )))
        }
    }
}

/// One candidate in an add-candidates batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub description: String,
}

/// Request body for adding candidates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddCandidatesRequest {
    pub candidates: Vec<CandidateSpec>,
}

impl AddCandidatesRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.candidates.is_empty() {
            return Err(Error::Validation(
                "at least one candidate is required".to_string(),
            ));
        }
        let mut problems = Vec::new();
        for (index, candidate) in self.candidates.iter().enumerate() {
            if candidate.name.trim().is_empty() {
                problems.push(format!("candidates[{index}]: name must not be empty"));
            }
            if candidate.role.trim().is_empty() {
                problems.push(format!("candidates[{index}]: role must not be empty"));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems.join("; ")))
        }
    }

    /// Split into the parallel arrays the ledger takes.
    pub fn into_columns(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut names = Vec::with_capacity(self.candidates.len());
        let mut roles = Vec::with_capacity(self.candidates.len());
        let mut descriptions = Vec::with_capacity(self.candidates.len());
        for candidate in self.candidates {
            names.push(candidate.name);
            roles.push(candidate.role);
            descriptions.push(candidate.description);
        }
        (names, roles, descriptions)
    }
}

/// Full-replacement update of one candidate's details.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateUpdate {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub description: String,
}

impl CandidateUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
        if self.role.trim().is_empty() {
            return Err(Error::Validation("role must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Request body for registering voters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddVotersRequest {
    pub voters: Vec<String>,
}

impl AddVotersRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.voters.is_empty() {
            return Err(Error::Validation(
                "at least one voter is required".to_string(),
            ));
        }
        if self.voters.iter().any(|voter| voter.trim().is_empty()) {
            return Err(Error::Validation(
                "voter identities must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// Duration payload for starting or extending voting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingDuration {
    pub duration_secs: i64,
}

impl VotingDuration {
    /// Positive seconds or a validation error. Negatives arrive as
    /// perfectly valid JSON and must be caught here rather than left to
    /// deserialisation.
    pub fn checked_secs(self) -> Result<u64, Error> {
        u64::try_from(self.duration_secs)
            .ok()
            .filter(|&secs| secs > 0)
            .ok_or_else(|| {
                Error::Validation("durationSecs must be a positive number of seconds".to_string())
            })
    }
}

/// Ballot payload: which candidate, on whose behalf.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub candidate_id: CandidateId,
    pub voter: String,
}

impl VoteRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.voter.trim().is_empty() {
            return Err(Error::Validation(
                "voter identity must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// A voting instance as served to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDescription {
    pub instance_id: InstanceId,
    pub name: String,
    pub organization_name: String,
    pub description: String,
    pub creator: String,
    pub status: InstanceState,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub end_time: Option<DateTime<Utc>>,
    pub candidate_count: u64,
    pub is_private: bool,
}

impl From<Instance> for InstanceDescription {
    fn from(instance: Instance) -> Self {
        Self {
            instance_id: instance.id,
            name: instance.name,
            organization_name: instance.organization_name,
            description: instance.description,
            creator: instance.creator,
            status: instance.state,
            start_time: instance.start_time,
            end_time: instance.end_time,
            candidate_count: instance.candidate_count,
            is_private: instance.is_private,
        }
    }
}

/// A candidate as served to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDescription {
    pub candidate_id: CandidateId,
    pub name: String,
    pub role: String,
    pub description: String,
    pub vote_count: u64,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            candidate_id: candidate.id,
            name: candidate.name,
            role: candidate.role,
            description: candidate.description,
            vote_count: candidate.vote_count,
        }
    }
}

/// One voter and the roles they have voted for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRolesDescription {
    pub voter: String,
    pub roles: Vec<String>,
}

impl From<VoterRoles> for VoterRolesDescription {
    fn from(row: VoterRoles) -> Self {
        Self {
            voter: row.voter,
            roles: row.roles,
        }
    }
}

/// One role's ranked contest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleResultDescription {
    pub role: String,
    pub candidates: Vec<CandidateDescription>,
}

impl From<RoleResult> for RoleResultDescription {
    fn from(group: RoleResult) -> Self {
        Self {
            role: group.role,
            candidates: group.candidates.into_iter().map(Into::into).collect(),
        }
    }
}

/// Full results of an instance, grouped by role.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsDescription {
    pub instance_id: InstanceId,
    pub status: InstanceState,
    pub results: Vec<RoleResultDescription>,
}

/// A ledger event as served to clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventDescription {
    #[serde(rename_all = "camelCase")]
    InstanceCreated {
        #[serde(with = "chrono::serde::ts_seconds")]
        at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    CandidateAdded {
        candidate_id: CandidateId,
        #[serde(with = "chrono::serde::ts_seconds")]
        at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    CandidateUpdated {
        candidate_id: CandidateId,
        #[serde(with = "chrono::serde::ts_seconds")]
        at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    VoteCast {
        candidate_id: CandidateId,
        voter: String,
        #[serde(with = "chrono::serde::ts_seconds")]
        at: DateTime<Utc>,
    },
}

impl From<LedgerEvent> for EventDescription {
    fn from(event: LedgerEvent) -> Self {
        match event {
            LedgerEvent::InstanceCreated { at } => Self::InstanceCreated { at },
            LedgerEvent::CandidateAdded { candidate, at } => Self::CandidateAdded {
                candidate_id: candidate,
                at,
            },
            LedgerEvent::CandidateUpdated { candidate, at } => Self::CandidateUpdated {
                candidate_id: candidate,
                at,
            },
            LedgerEvent::VoteCast {
                candidate,
                voter,
                at,
            } => Self::VoteCast {
                candidate_id: candidate,
                voter,
                at,
            },
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl InstanceSpec {
        pub fn example() -> Self {
            Self {
                name: "Student Union Elections".to_string(),
                organization_name: "Example University".to_string(),
                description: "Annual elections for the student union officers".to_string(),
                creator: "0xA1B2C3D4E5".to_string(),
                is_private: false,
            }
        }
    }

    impl AddCandidatesRequest {
        pub fn example() -> Self {
            Self {
                candidates: vec![
                    CandidateSpec {
                        name: "Alice".to_string(),
                        role: "President".to_string(),
                        description: "Second-year rep".to_string(),
                    },
                    CandidateSpec {
                        name: "Bob".to_string(),
                        role: "President".to_string(),
                        description: "Societies officer".to_string(),
                    },
                    CandidateSpec {
                        name: "Tom".to_string(),
                        role: "Treasurer".to_string(),
                        description: String::new(),
                    },
                ],
            }
        }
    }
}
