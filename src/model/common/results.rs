use crate::model::common::Candidate;

/// One role's contest: its candidates ranked by vote count.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleResult {
    pub role: String,
    pub candidates: Vec<Candidate>,
}

/// Group candidates by role and rank each group by descending vote count.
///
/// Roles appear in the order they were first seen and the sort is stable,
/// so tied candidates keep their original relative order. This makes
/// rankings fully deterministic.
pub fn ranked_results(candidates: Vec<Candidate>) -> Vec<RoleResult> {
    let mut results: Vec<RoleResult> = Vec::new();
    for candidate in candidates {
        match results.iter_mut().find(|group| group.role == candidate.role) {
            Some(group) => group.candidates.push(candidate),
            None => results.push(RoleResult {
                role: candidate.role.clone(),
                candidates: vec![candidate],
            }),
        }
    }
    for group in &mut results {
        group.candidates.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    }
    results
}
