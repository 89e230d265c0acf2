//! The reference ledger used in development and tests.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rocket::tokio::sync::RwLock;

use crate::model::common::{CandidateId, InstanceId, InstanceState};
use crate::model::ledger::{
    event_kind, Ledger, LedgerError, RawCandidate, RawEvent, RawInstance, RawVoterRoles,
};

/// In-memory [`Ledger`] implementing the contract's state machine.
///
/// All writes run under a single lock, which makes the check-then-act
/// sequences (the duplicate-vote test followed by the tally increment)
/// atomic without further ceremony.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: InstanceId,
    instances: BTreeMap<InstanceId, StoredInstance>,
    events: Vec<RawEvent>,
}

#[derive(Debug)]
struct StoredInstance {
    name: String,
    organization_name: String,
    description: String,
    creator: String,
    is_private: bool,
    state: InstanceState,
    start_time: u64,
    end_time: u64,
    last_candidate: CandidateId,
    candidates: Vec<StoredCandidate>,
    /// Insertion-ordered, de-duplicated.
    voters: Vec<String>,
    /// Voter to their (role, candidate) choices, in voting order.
    votes: HashMap<String, Vec<(String, CandidateId)>>,
}

#[derive(Debug)]
struct StoredCandidate {
    id: CandidateId,
    name: String,
    role: String,
    description: String,
    vote_count: u64,
}

impl StoredInstance {
    fn new(
        name: &str,
        organization_name: &str,
        description: &str,
        creator: &str,
        is_private: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            organization_name: organization_name.to_string(),
            description: description.to_string(),
            creator: creator.to_string(),
            is_private,
            state: InstanceState::Pending,
            start_time: 0,
            end_time: 0,
            last_candidate: 0,
            candidates: Vec::new(),
            voters: Vec::new(),
            votes: HashMap::new(),
        }
    }

    fn encode(&self, id: InstanceId) -> RawInstance {
        RawInstance {
            id,
            name: self.name.clone(),
            organization_name: self.organization_name.clone(),
            description: self.description.clone(),
            creator: self.creator.clone(),
            status: self.state.code(),
            start_time: self.start_time,
            end_time: self.end_time,
            candidate_count: self.candidates.len() as u64,
            is_private: self.is_private,
        }
    }

    /// Candidates and voters may only change before the instance ends.
    fn require_editable(
        &self,
        id: InstanceId,
        operation: &'static str,
    ) -> Result<(), LedgerError> {
        match self.state {
            InstanceState::Pending | InstanceState::Active => Ok(()),
            InstanceState::Ended => Err(LedgerError::WrongState {
                instance: id,
                state: self.state,
                operation,
            }),
        }
    }
}

impl StoredCandidate {
    fn encode(&self) -> RawCandidate {
        RawCandidate {
            id: self.id,
            name: self.name.clone(),
            role: self.role.clone(),
            description: self.description.clone(),
            vote_count: self.vote_count,
        }
    }
}

fn instance_mut<'i>(
    instances: &'i mut BTreeMap<InstanceId, StoredInstance>,
    id: InstanceId,
) -> Result<&'i mut StoredInstance, LedgerError> {
    instances.get_mut(&id).ok_or(LedgerError::UnknownInstance(id))
}

fn now_secs() -> u64 {
    Utc::now().timestamp() as u64
}

fn require_positive(duration_secs: u64) -> Result<(), LedgerError> {
    if duration_secs == 0 {
        return Err(LedgerError::Invalid(
            "duration must be a positive number of seconds".to_string(),
        ));
    }
    Ok(())
}

#[rocket::async_trait]
impl Ledger for MemoryLedger {
    async fn create_instance(
        &self,
        name: &str,
        organization_name: &str,
        description: &str,
        creator: &str,
        is_private: bool,
    ) -> Result<InstanceId, LedgerError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.instances.insert(
            id,
            StoredInstance::new(name, organization_name, description, creator, is_private),
        );
        inner.events.push(RawEvent {
            kind: event_kind::INSTANCE_CREATED,
            instance_id: id,
            candidate_id: 0,
            actor: String::new(),
            timestamp: now_secs(),
        });
        Ok(id)
    }

    async fn get_instance(&self, instance: InstanceId) -> Result<RawInstance, LedgerError> {
        let inner = self.inner.read().await;
        inner
            .instances
            .get(&instance)
            .map(|stored| stored.encode(instance))
            .ok_or(LedgerError::UnknownInstance(instance))
    }

    async fn get_instances(&self) -> Result<Vec<RawInstance>, LedgerError> {
        let inner = self.inner.read().await;
        Ok(inner
            .instances
            .iter()
            .map(|(id, stored)| stored.encode(*id))
            .collect())
    }

    async fn delete_instance(&self, instance: InstanceId) -> Result<(), LedgerError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner
            .instances
            .remove(&instance)
            .ok_or(LedgerError::UnknownInstance(instance))?;
        inner.events.retain(|event| event.instance_id != instance);
        Ok(())
    }

    async fn add_candidates(
        &self,
        instance: InstanceId,
        names: Vec<String>,
        roles: Vec<String>,
        descriptions: Vec<String>,
    ) -> Result<Vec<CandidateId>, LedgerError> {
        if names.len() != roles.len() || names.len() != descriptions.len() {
            return Err(LedgerError::Invalid(format!(
                "mismatched candidate arrays: {} names, {} roles, {} descriptions",
                names.len(),
                roles.len(),
                descriptions.len()
            )));
        }
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let stored = instance_mut(&mut inner.instances, instance)?;
        stored.require_editable(instance, "add candidates")?;
        let timestamp = now_secs();
        let mut ids = Vec::with_capacity(names.len());
        for ((name, role), description) in names.into_iter().zip(roles).zip(descriptions) {
            stored.last_candidate += 1;
            let id = stored.last_candidate;
            stored.candidates.push(StoredCandidate {
                id,
                name,
                role,
                description,
                vote_count: 0,
            });
            inner.events.push(RawEvent {
                kind: event_kind::CANDIDATE_ADDED,
                instance_id: instance,
                candidate_id: id,
                actor: String::new(),
                timestamp,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn update_candidate(
        &self,
        instance: InstanceId,
        candidate: CandidateId,
        name: String,
        role: String,
        description: String,
    ) -> Result<(), LedgerError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let stored = instance_mut(&mut inner.instances, instance)?;
        stored.require_editable(instance, "update a candidate")?;
        let found = stored
            .candidates
            .iter_mut()
            .find(|c| c.id == candidate)
            .ok_or(LedgerError::UnknownCandidate {
                instance,
                candidate,
            })?;
        found.name = name;
        found.role = role;
        found.description = description;
        inner.events.push(RawEvent {
            kind: event_kind::CANDIDATE_UPDATED,
            instance_id: instance,
            candidate_id: candidate,
            actor: String::new(),
            timestamp: now_secs(),
        });
        Ok(())
    }

    async fn remove_candidate(
        &self,
        instance: InstanceId,
        candidate: CandidateId,
    ) -> Result<(), LedgerError> {
        let mut guard = self.inner.write().await;
        let stored = instance_mut(&mut guard.instances, instance)?;
        stored.require_editable(instance, "remove a candidate")?;
        let index = stored
            .candidates
            .iter()
            .position(|c| c.id == candidate)
            .ok_or(LedgerError::UnknownCandidate {
                instance,
                candidate,
            })?;
        // Vote records for the role stay; only the row and tally go.
        stored.candidates.remove(index);
        Ok(())
    }

    async fn get_candidates(&self, instance: InstanceId) -> Result<Vec<RawCandidate>, LedgerError> {
        let inner = self.inner.read().await;
        let stored = inner
            .instances
            .get(&instance)
            .ok_or(LedgerError::UnknownInstance(instance))?;
        Ok(stored.candidates.iter().map(StoredCandidate::encode).collect())
    }

    async fn add_voters(
        &self,
        instance: InstanceId,
        voters: Vec<String>,
    ) -> Result<(), LedgerError> {
        let mut guard = self.inner.write().await;
        let stored = instance_mut(&mut guard.instances, instance)?;
        stored.require_editable(instance, "add voters")?;
        for voter in voters {
            if !stored.voters.contains(&voter) {
                stored.voters.push(voter);
            }
        }
        Ok(())
    }

    async fn get_voters_and_roles(
        &self,
        instance: InstanceId,
    ) -> Result<RawVoterRoles, LedgerError> {
        let inner = self.inner.read().await;
        let stored = inner
            .instances
            .get(&instance)
            .ok_or(LedgerError::UnknownInstance(instance))?;
        let roles = stored
            .voters
            .iter()
            .map(|voter| {
                stored
                    .votes
                    .get(voter)
                    .map(|pairs| pairs.iter().map(|(role, _)| role.clone()).collect())
                    .unwrap_or_default()
            })
            .collect();
        Ok(RawVoterRoles {
            voters: stored.voters.clone(),
            roles,
        })
    }

    async fn start_voting(
        &self,
        instance: InstanceId,
        duration_secs: u64,
    ) -> Result<(), LedgerError> {
        require_positive(duration_secs)?;
        let mut guard = self.inner.write().await;
        let stored = instance_mut(&mut guard.instances, instance)?;
        if stored.state != InstanceState::Pending {
            return Err(LedgerError::WrongState {
                instance,
                state: stored.state,
                operation: "start voting",
            });
        }
        let now = now_secs();
        stored.start_time = now;
        stored.end_time = now + duration_secs;
        stored.state = InstanceState::Active;
        Ok(())
    }

    async fn extend_voting(
        &self,
        instance: InstanceId,
        duration_secs: u64,
    ) -> Result<(), LedgerError> {
        require_positive(duration_secs)?;
        let mut guard = self.inner.write().await;
        let stored = instance_mut(&mut guard.instances, instance)?;
        if stored.state != InstanceState::Active {
            return Err(LedgerError::WrongState {
                instance,
                state: stored.state,
                operation: "extend voting",
            });
        }
        stored.end_time += duration_secs;
        Ok(())
    }

    async fn end_voting(&self, instance: InstanceId) -> Result<(), LedgerError> {
        let mut guard = self.inner.write().await;
        let stored = instance_mut(&mut guard.instances, instance)?;
        if stored.state == InstanceState::Ended {
            return Err(LedgerError::WrongState {
                instance,
                state: stored.state,
                operation: "end voting",
            });
        }
        stored.state = InstanceState::Ended;
        Ok(())
    }

    async fn vote(
        &self,
        instance: InstanceId,
        candidate: CandidateId,
        voter: &str,
    ) -> Result<(), LedgerError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let stored = instance_mut(&mut inner.instances, instance)?;
        if stored.state != InstanceState::Active {
            return Err(LedgerError::WrongState {
                instance,
                state: stored.state,
                operation: "vote",
            });
        }
        let found = stored
            .candidates
            .iter_mut()
            .find(|c| c.id == candidate)
            .ok_or(LedgerError::UnknownCandidate {
                instance,
                candidate,
            })?;
        let role = found.role.clone();
        let choices = stored.votes.entry(voter.to_string()).or_default();
        if choices.iter().any(|(voted_role, _)| voted_role == &role) {
            return Err(LedgerError::AlreadyVoted {
                instance,
                voter: voter.to_string(),
                role,
            });
        }
        choices.push((role, candidate));
        found.vote_count += 1;
        if !stored.voters.iter().any(|known| known == voter) {
            stored.voters.push(voter.to_string());
        }
        inner.events.push(RawEvent {
            kind: event_kind::VOTE_CAST,
            instance_id: instance,
            candidate_id: candidate,
            actor: voter.to_string(),
            timestamp: now_secs(),
        });
        Ok(())
    }

    async fn events(&self, instance: InstanceId) -> Result<Vec<RawEvent>, LedgerError> {
        let inner = self.inner.read().await;
        if !inner.instances.contains_key(&instance) {
            return Err(LedgerError::UnknownInstance(instance));
        }
        Ok(inner
            .events
            .iter()
            .filter(|event| event.instance_id == instance)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ledger_with_instance() -> (MemoryLedger, InstanceId) {
        let ledger = MemoryLedger::default();
        let id = ledger
            .create_instance("Union Elections", "Example University", "Officers", "0x01", false)
            .await
            .unwrap();
        (ledger, id)
    }

    async fn add_single(ledger: &MemoryLedger, id: InstanceId, name: &str, role: &str) -> CandidateId {
        ledger
            .add_candidates(
                id,
                vec![name.to_string()],
                vec![role.to_string()],
                vec![String::new()],
            )
            .await
            .unwrap()[0]
    }

    async fn vote_count(ledger: &MemoryLedger, id: InstanceId, candidate: CandidateId) -> u64 {
        ledger
            .get_candidates(id)
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.id == candidate)
            .unwrap()
            .vote_count
    }

    #[rocket::async_test]
    async fn full_lifecycle() {
        let (ledger, id) = ledger_with_instance().await;
        let candidate = add_single(&ledger, id, "Alice", "President").await;

        let raw = ledger.get_instance(id).await.unwrap();
        assert_eq!(InstanceState::Pending.code(), raw.status);
        assert_eq!(0, raw.start_time);
        assert_eq!(0, raw.end_time);

        ledger.start_voting(id, 3600).await.unwrap();
        let raw = ledger.get_instance(id).await.unwrap();
        assert_eq!(InstanceState::Active.code(), raw.status);
        assert!(raw.start_time > 0);
        assert_eq!(raw.start_time + 3600, raw.end_time);

        let started_at = raw.start_time;
        ledger.extend_voting(id, 1800).await.unwrap();
        let raw = ledger.get_instance(id).await.unwrap();
        assert_eq!(started_at, raw.start_time);
        assert_eq!(started_at + 5400, raw.end_time);

        ledger.end_voting(id).await.unwrap();
        let raw = ledger.get_instance(id).await.unwrap();
        assert_eq!(InstanceState::Ended.code(), raw.status);

        assert_eq!(
            Err(LedgerError::WrongState {
                instance: id,
                state: InstanceState::Ended,
                operation: "vote",
            }),
            ledger.vote(id, candidate, "alice").await
        );
    }

    #[rocket::async_test]
    async fn votes_need_an_active_instance() {
        let (ledger, id) = ledger_with_instance().await;
        let candidate = add_single(&ledger, id, "Alice", "President").await;

        let rejected = ledger.vote(id, candidate, "alice").await;
        assert_eq!(
            Err(LedgerError::WrongState {
                instance: id,
                state: InstanceState::Pending,
                operation: "vote",
            }),
            rejected
        );
        assert_eq!(0, vote_count(&ledger, id, candidate).await);
    }

    #[rocket::async_test]
    async fn one_vote_per_role() {
        let (ledger, id) = ledger_with_instance().await;
        let alice = add_single(&ledger, id, "Alice", "President").await;
        let bob = add_single(&ledger, id, "Bob", "President").await;
        let tom = add_single(&ledger, id, "Tom", "Treasurer").await;
        ledger.start_voting(id, 3600).await.unwrap();

        ledger.vote(id, alice, "v1").await.unwrap();
        assert_eq!(
            Err(LedgerError::AlreadyVoted {
                instance: id,
                voter: "v1".to_string(),
                role: "President".to_string(),
            }),
            ledger.vote(id, bob, "v1").await
        );
        // A different role still works for the same voter.
        ledger.vote(id, tom, "v1").await.unwrap();

        assert_eq!(1, vote_count(&ledger, id, alice).await);
        assert_eq!(0, vote_count(&ledger, id, bob).await);
        assert_eq!(1, vote_count(&ledger, id, tom).await);
    }

    #[rocket::async_test]
    async fn unknown_candidate_is_rejected() {
        let (ledger, id) = ledger_with_instance().await;
        ledger.start_voting(id, 3600).await.unwrap();
        assert_eq!(
            Err(LedgerError::UnknownCandidate {
                instance: id,
                candidate: 42,
            }),
            ledger.vote(id, 42, "alice").await
        );
    }

    #[rocket::async_test]
    async fn transitions_cannot_skip_or_reverse() {
        let (ledger, id) = ledger_with_instance().await;

        // Extending needs Active.
        assert!(matches!(
            ledger.extend_voting(id, 60).await,
            Err(LedgerError::WrongState { .. })
        ));

        ledger.start_voting(id, 3600).await.unwrap();
        // Starting twice is a conflict, not a reset.
        assert!(matches!(
            ledger.start_voting(id, 3600).await,
            Err(LedgerError::WrongState { .. })
        ));

        ledger.end_voting(id).await.unwrap();
        assert!(matches!(
            ledger.end_voting(id).await,
            Err(LedgerError::WrongState { .. })
        ));
        assert!(matches!(
            ledger.extend_voting(id, 60).await,
            Err(LedgerError::WrongState { .. })
        ));
    }

    #[rocket::async_test]
    async fn ending_straight_from_pending_is_allowed() {
        let (ledger, id) = ledger_with_instance().await;
        ledger.end_voting(id).await.unwrap();
        let raw = ledger.get_instance(id).await.unwrap();
        assert_eq!(InstanceState::Ended.code(), raw.status);
        assert_eq!(0, raw.start_time);
        assert_eq!(0, raw.end_time);
    }

    #[rocket::async_test]
    async fn zero_durations_are_invalid() {
        let (ledger, id) = ledger_with_instance().await;
        assert!(matches!(
            ledger.start_voting(id, 0).await,
            Err(LedgerError::Invalid(_))
        ));
        ledger.start_voting(id, 3600).await.unwrap();
        assert!(matches!(
            ledger.extend_voting(id, 0).await,
            Err(LedgerError::Invalid(_))
        ));
    }

    #[rocket::async_test]
    async fn nothing_mutates_after_the_end() {
        let (ledger, id) = ledger_with_instance().await;
        let candidate = add_single(&ledger, id, "Alice", "President").await;
        ledger.end_voting(id).await.unwrap();

        assert!(matches!(
            ledger
                .add_candidates(
                    id,
                    vec!["Bob".to_string()],
                    vec!["President".to_string()],
                    vec![String::new()],
                )
                .await,
            Err(LedgerError::WrongState { .. })
        ));
        assert!(matches!(
            ledger
                .update_candidate(
                    id,
                    candidate,
                    "Alice".to_string(),
                    "Treasurer".to_string(),
                    String::new(),
                )
                .await,
            Err(LedgerError::WrongState { .. })
        ));
        assert!(matches!(
            ledger.remove_candidate(id, candidate).await,
            Err(LedgerError::WrongState { .. })
        ));
        assert!(matches!(
            ledger.add_voters(id, vec!["alice".to_string()]).await,
            Err(LedgerError::WrongState { .. })
        ));
    }

    #[rocket::async_test]
    async fn candidate_arrays_must_be_parallel() {
        let (ledger, id) = ledger_with_instance().await;
        let result = ledger
            .add_candidates(
                id,
                vec!["Alice".to_string(), "Bob".to_string()],
                vec!["President".to_string()],
                vec![String::new(), String::new()],
            )
            .await;
        assert!(matches!(result, Err(LedgerError::Invalid(_))));
        assert!(ledger.get_candidates(id).await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn updating_and_removing_candidates() {
        let (ledger, id) = ledger_with_instance().await;
        let alice = add_single(&ledger, id, "Alice", "President").await;
        let bob = add_single(&ledger, id, "Bob", "President").await;

        ledger
            .update_candidate(
                id,
                bob,
                "Robert".to_string(),
                "Treasurer".to_string(),
                "New details".to_string(),
            )
            .await
            .unwrap();
        let candidates = ledger.get_candidates(id).await.unwrap();
        assert_eq!("Robert", candidates[1].name);
        assert_eq!("Treasurer", candidates[1].role);

        ledger.remove_candidate(id, alice).await.unwrap();
        let candidates = ledger.get_candidates(id).await.unwrap();
        assert_eq!(1, candidates.len());
        assert_eq!(bob, candidates[0].id);

        assert_eq!(
            Err(LedgerError::UnknownCandidate {
                instance: id,
                candidate: alice,
            }),
            ledger.remove_candidate(id, alice).await
        );
    }

    #[rocket::async_test]
    async fn ids_are_monotonic_and_never_reused() {
        let ledger = MemoryLedger::default();
        let mut ids = Vec::new();
        for n in 0..3 {
            ids.push(
                ledger
                    .create_instance(&format!("Instance {n}"), "Org", "About", "0x01", false)
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(vec![1, 2, 3], ids);

        ledger.delete_instance(2).await.unwrap();
        let next = ledger
            .create_instance("Instance 3", "Org", "About", "0x01", false)
            .await
            .unwrap();
        assert_eq!(4, next);
    }

    #[rocket::async_test]
    async fn deletion_removes_every_trace() {
        let (ledger, id) = ledger_with_instance().await;
        add_single(&ledger, id, "Alice", "President").await;

        ledger.delete_instance(id).await.unwrap();
        assert_eq!(
            Err(LedgerError::UnknownInstance(id)),
            ledger.get_instance(id).await
        );
        assert_eq!(
            Err(LedgerError::UnknownInstance(id)),
            ledger.events(id).await
        );
        assert_eq!(
            Err(LedgerError::UnknownInstance(id)),
            ledger.delete_instance(id).await
        );
    }

    #[rocket::async_test]
    async fn voters_register_once_and_on_first_vote() {
        let (ledger, id) = ledger_with_instance().await;
        let alice = add_single(&ledger, id, "Alice", "President").await;
        ledger
            .add_voters(
                id,
                vec!["v1".to_string(), "v2".to_string(), "v1".to_string()],
            )
            .await
            .unwrap();
        ledger.start_voting(id, 3600).await.unwrap();
        // v3 never registered; voting registers them at the end.
        ledger.vote(id, alice, "v3").await.unwrap();

        let raw = ledger.get_voters_and_roles(id).await.unwrap();
        assert_eq!(vec!["v1", "v2", "v3"], raw.voters);
        assert_eq!(
            vec![Vec::<String>::new(), Vec::new(), vec!["President".to_string()]],
            raw.roles
        );
    }

    #[rocket::async_test]
    async fn events_track_instance_history() {
        let (ledger, id) = ledger_with_instance().await;
        let alice = add_single(&ledger, id, "Alice", "President").await;
        ledger
            .update_candidate(
                id,
                alice,
                "Alice".to_string(),
                "President".to_string(),
                "Updated".to_string(),
            )
            .await
            .unwrap();
        ledger.start_voting(id, 3600).await.unwrap();
        ledger.vote(id, alice, "v1").await.unwrap();

        let events = ledger.events(id).await.unwrap();
        let kinds: Vec<u8> = events.iter().map(|event| event.kind).collect();
        assert_eq!(
            vec![
                event_kind::INSTANCE_CREATED,
                event_kind::CANDIDATE_ADDED,
                event_kind::CANDIDATE_UPDATED,
                event_kind::VOTE_CAST,
            ],
            kinds
        );
        assert_eq!("v1", events[3].actor);
        assert_eq!(alice, events[3].candidate_id);

        // Another instance's history is not visible here.
        let other = ledger
            .create_instance("Other", "Org", "About", "0x02", false)
            .await
            .unwrap();
        assert_eq!(1, ledger.events(other).await.unwrap().len());
        assert_eq!(4, ledger.events(id).await.unwrap().len());
    }
}
