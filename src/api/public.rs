use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::api::instance::{
    CandidateDescription, EventDescription, InstanceDescription, ResultsDescription,
    VoterRolesDescription,
};
use crate::model::common::{ranked_results, Candidate, InstanceId};
use crate::model::ledger::{decode_event, decode_instance, decode_voter_roles, SharedLedger};

use super::common::described_instance;

pub fn routes() -> Vec<Route> {
    routes![
        get_instances,
        get_instance,
        get_candidates,
        get_voters,
        get_results,
        get_events,
    ]
}

#[get("/instances?<creator>")]
pub async fn get_instances(
    creator: Option<String>,
    ledger: &State<SharedLedger>,
) -> Result<Json<Vec<InstanceDescription>>> {
    let raw = ledger.get_instances().await?;
    let mut instances = Vec::with_capacity(raw.len());
    for instance in raw {
        instances.push(InstanceDescription::from(decode_instance(instance)?));
    }
    if let Some(creator) = creator {
        instances.retain(|instance| instance.creator == creator);
    }
    Ok(Json(instances))
}

#[get("/instances/<id>")]
pub async fn get_instance(
    id: InstanceId,
    ledger: &State<SharedLedger>,
) -> Result<Json<InstanceDescription>> {
    Ok(Json(described_instance(ledger, id).await?))
}

#[get("/instances/<id>/candidates")]
pub async fn get_candidates(
    id: InstanceId,
    ledger: &State<SharedLedger>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let raw = ledger.get_candidates(id).await?;
    Ok(Json(
        raw.into_iter()
            .map(Candidate::from)
            .map(Into::into)
            .collect(),
    ))
}

#[get("/instances/<id>/voters")]
pub async fn get_voters(
    id: InstanceId,
    ledger: &State<SharedLedger>,
) -> Result<Json<Vec<VoterRolesDescription>>> {
    let raw = ledger.get_voters_and_roles(id).await?;
    let rows = decode_voter_roles(raw)?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[get("/instances/<id>/results")]
pub async fn get_results(
    id: InstanceId,
    ledger: &State<SharedLedger>,
) -> Result<Json<ResultsDescription>> {
    let instance = decode_instance(ledger.get_instance(id).await?)?;
    let candidates: Vec<Candidate> = ledger
        .get_candidates(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ResultsDescription {
        instance_id: id,
        status: instance.state,
        results: ranked_results(candidates)
            .into_iter()
            .map(Into::into)
            .collect(),
    }))
}

#[get("/instances/<id>/events")]
pub async fn get_events(
    id: InstanceId,
    ledger: &State<SharedLedger>,
) -> Result<Json<Vec<EventDescription>>> {
    let raw = ledger.events(id).await?;
    let mut events = Vec::with_capacity(raw.len());
    for event in raw {
        events.push(EventDescription::from(decode_event(event)?));
    }
    Ok(Json(events))
}
