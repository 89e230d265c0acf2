use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::api::instance::{
    AddCandidatesRequest, AddVotersRequest, CandidateDescription, CandidateUpdate,
    InstanceDescription, InstanceSpec, VotingDuration,
};
use crate::model::api::ApiMessage;
use crate::model::common::{Candidate, CandidateId, InstanceId};
use crate::model::ledger::SharedLedger;

use super::common::{described_candidate, described_instance};

pub fn routes() -> Vec<Route> {
    routes![
        create_instance,
        delete_instance,
        add_candidates,
        update_candidate,
        remove_candidate,
        add_voters,
        start_voting,
        extend_voting,
        end_voting,
    ]
}

#[post("/instances", data = "<spec>", format = "json")]
pub async fn create_instance(
    spec: Json<InstanceSpec>,
    ledger: &State<SharedLedger>,
) -> Result<Json<InstanceDescription>> {
    let spec = spec.into_inner();
    spec.validate()?;

    let id = ledger
        .create_instance(
            &spec.name,
            &spec.organization_name,
            &spec.description,
            &spec.creator,
            spec.is_private,
        )
        .await?;
    info!("Created voting instance {id} '{}'", spec.name);

    Ok(Json(described_instance(ledger, id).await?))
}

#[delete("/instances/<id>")]
pub async fn delete_instance(
    id: InstanceId,
    ledger: &State<SharedLedger>,
) -> Result<Json<ApiMessage>> {
    ledger.delete_instance(id).await?;
    info!("Deleted voting instance {id}");

    Ok(Json(ApiMessage {
        message: format!("Voting instance {id} deleted"),
    }))
}

#[post("/instances/<id>/candidates", data = "<request>", format = "json")]
pub async fn add_candidates(
    id: InstanceId,
    request: Json<AddCandidatesRequest>,
    ledger: &State<SharedLedger>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let request = request.into_inner();
    request.validate()?;

    let (names, roles, descriptions) = request.into_columns();
    let ids = ledger.add_candidates(id, names, roles, descriptions).await?;
    info!("Added {} candidate(s) to voting instance {id}", ids.len());

    // Echo back the newly created candidates.
    let candidates = ledger
        .get_candidates(id)
        .await?
        .into_iter()
        .filter(|candidate| ids.contains(&candidate.id))
        .map(Candidate::from)
        .map(Into::into)
        .collect();
    Ok(Json(candidates))
}

#[put("/instances/<id>/candidates/<cid>", data = "<update>", format = "json")]
pub async fn update_candidate(
    id: InstanceId,
    cid: CandidateId,
    update: Json<CandidateUpdate>,
    ledger: &State<SharedLedger>,
) -> Result<Json<CandidateDescription>> {
    let update = update.into_inner();
    update.validate()?;

    ledger
        .update_candidate(id, cid, update.name, update.role, update.description)
        .await?;
    info!("Updated candidate {cid} in voting instance {id}");

    Ok(Json(described_candidate(ledger, id, cid).await?))
}

#[delete("/instances/<id>/candidates/<cid>")]
pub async fn remove_candidate(
    id: InstanceId,
    cid: CandidateId,
    ledger: &State<SharedLedger>,
) -> Result<Json<ApiMessage>> {
    ledger.remove_candidate(id, cid).await?;
    info!("Removed candidate {cid} from voting instance {id}");

    Ok(Json(ApiMessage {
        message: format!("Candidate {cid} removed"),
    }))
}

#[post("/instances/<id>/voters", data = "<request>", format = "json")]
pub async fn add_voters(
    id: InstanceId,
    request: Json<AddVotersRequest>,
    ledger: &State<SharedLedger>,
) -> Result<Json<ApiMessage>> {
    let request = request.into_inner();
    request.validate()?;

    let count = request.voters.len();
    ledger.add_voters(id, request.voters).await?;
    info!("Registered {count} voter(s) for voting instance {id}");

    Ok(Json(ApiMessage {
        message: format!("{count} voter(s) registered"),
    }))
}

#[post("/instances/<id>/start", data = "<duration>", format = "json")]
pub async fn start_voting(
    id: InstanceId,
    duration: Json<VotingDuration>,
    ledger: &State<SharedLedger>,
) -> Result<Json<InstanceDescription>> {
    let secs = duration.into_inner().checked_secs()?;

    ledger.start_voting(id, secs).await?;
    info!("Voting instance {id} started, open for {secs}s");

    Ok(Json(described_instance(ledger, id).await?))
}

#[post("/instances/<id>/extend", data = "<duration>", format = "json")]
pub async fn extend_voting(
    id: InstanceId,
    duration: Json<VotingDuration>,
    ledger: &State<SharedLedger>,
) -> Result<Json<InstanceDescription>> {
    let secs = duration.into_inner().checked_secs()?;

    ledger.extend_voting(id, secs).await?;
    info!("Voting instance {id} extended by {secs}s");

    Ok(Json(described_instance(ledger, id).await?))
}

#[post("/instances/<id>/end")]
pub async fn end_voting(
    id: InstanceId,
    ledger: &State<SharedLedger>,
) -> Result<Json<InstanceDescription>> {
    ledger.end_voting(id).await?;
    info!("Voting instance {id} ended");

    Ok(Json(described_instance(ledger, id).await?))
}
