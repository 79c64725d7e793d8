//! Request handlers.

use crate::error::{ApiError, ApiResult};
use crate::payload::member_ids_input;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use log::info;
use mpk_core::{
    Member, MemberFilter, MemberService, MemberUpsertRow, ProposalMembers, ProposalService,
    SqliteMemberRepository, SqliteProposalRepository,
};
use serde::Serialize;
use serde_json::Value;

/// Response of `POST /members/bulk`.
#[derive(Debug, Serialize)]
pub struct BulkUpsertResponse {
    pub added_or_updated: usize,
}

/// Response of `PUT /proposals/:id/members`.
#[derive(Debug, Serialize)]
pub struct SetMembersResponse {
    pub ok: bool,
    pub count: usize,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: mpk_core::core_version(),
    })
}

/// `POST /members/bulk`. Null entries are skipped like rows without a name.
pub async fn bulk_upsert_members(
    State(state): State<AppState>,
    body: Result<Json<Vec<Option<MemberUpsertRow>>>, JsonRejection>,
) -> ApiResult<Json<BulkUpsertResponse>> {
    let Json(rows) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let rows: Vec<MemberUpsertRow> = rows.into_iter().flatten().collect();

    let added_or_updated = state
        .with_connection(move |conn| {
            let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
            Ok(service.bulk_upsert(&rows)?)
        })
        .await?;

    Ok(Json(BulkUpsertResponse { added_or_updated }))
}

/// `GET /members?name=&org_unit=`.
pub async fn list_members(
    State(state): State<AppState>,
    query: Result<Query<MemberFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Member>>> {
    let Query(filter) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let members = state
        .with_connection(move |conn| {
            let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
            Ok(service.list(&filter)?)
        })
        .await?;

    Ok(Json(members))
}

/// `PUT /proposals/:id/members`.
pub async fn set_proposal_members(
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SetMembersResponse>> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let input = member_ids_input(&body);

    let log_id = proposal_id.clone();
    let outcome = state
        .with_connection(move |conn| {
            let mut service = ProposalService::new(SqliteProposalRepository::try_new(conn)?);
            Ok(service.set_members(&proposal_id, &input)?)
        })
        .await?;

    info!(
        "event=http_set_members module=api status=ok proposal_id={} count={}",
        log_id, outcome.count
    );
    Ok(Json(SetMembersResponse {
        ok: true,
        count: outcome.count,
    }))
}

/// `GET /proposals/:id/members`.
pub async fn get_proposal_members(
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> ApiResult<Json<ProposalMembers>> {
    let lookup_id = proposal_id.clone();
    let found = state
        .with_connection(move |conn| {
            let service = ProposalService::new(SqliteProposalRepository::try_new(conn)?);
            Ok(service.members_of(&lookup_id)?)
        })
        .await?;

    found
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("proposal {proposal_id} not found")))
}
