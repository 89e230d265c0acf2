use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::api::instance::{CandidateDescription, VoteRequest};
use crate::model::common::InstanceId;
use crate::model::ledger::SharedLedger;

use super::common::described_candidate;

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

#[post("/instances/<id>/votes", data = "<request>", format = "json")]
pub async fn cast_vote(
    id: InstanceId,
    request: Json<VoteRequest>,
    ledger: &State<SharedLedger>,
) -> Result<Json<CandidateDescription>> {
    let request = request.into_inner();
    request.validate()?;

    // The duplicate check and the tally increment happen atomically
    // inside the ledger.
    ledger.vote(id, request.candidate_id, &request.voter).await?;
    info!(
        "Vote recorded in instance {id} for candidate {}",
        request.candidate_id
    );

    Ok(Json(
        described_candidate(ledger, id, request.candidate_id).await?,
    ))
}
