use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use skillswap_core::{
    AvailabilityFilter, Profile, ProfileId, RequestId, SessionContext, StatusFilter, SwapAction,
    SwapError, SwapRequest,
};
use skillswap_directory::{DirectoryPage, DirectoryQuery, NewProfile, PageLabel, ProfileUpdate};
use skillswap_ledger::{Direction, NewSwapRequest, RequestListing};
use skillswap_match::SwapOptions;
use std::num::IntErrorKind;

/// Header carrying the signed-in member for owner-only endpoints
pub const MEMBER_HEADER: &str = "x-member-id";

/// Parse a page or page size. Zero and negative numbers become 0 and numbers
/// too large for `usize` saturate. Only non-numeric text is rejected.
fn parse_number(name: &str, value: Option<&str>) -> ApiResult<Option<usize>> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match v.parse::<i64>() {
        Ok(n) if n <= 0 => Ok(Some(0)),
        Ok(n) => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(Some(usize::MAX)),
            IntErrorKind::NegOverflow => Ok(Some(0)),
            _ => Err(ApiError(SwapError::InvalidInput(format!(
                "{} must be a number: {}",
                name, v
            )))),
        },
    }
}

fn session(headers: &HeaderMap) -> Option<SessionContext> {
    headers
        .get(MEMBER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(SessionContext::new)
}

fn require_session(headers: &HeaderMap) -> ApiResult<SessionContext> {
    session(headers).ok_or_else(|| {
        ApiError(SwapError::not_authorized(
            &ProfileId::from("anonymous"),
            "edit profiles without signing in",
        ))
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub profiles: usize,
    pub requests: usize,
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let requests = state
        .requests
        .request_count()
        .await
        .map_err(SwapError::from)?;
    Ok(Json(HealthResponse {
        status: "ok",
        profiles: state.directory.len(),
        requests,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryParams {
    pub query: Option<String>,
    pub availability: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DirectoryResponse {
    #[serde(flatten)]
    pub page: DirectoryPage,
    pub pages: Vec<PageLabel>,
}

pub async fn search_directory(
    State(state): State<AppState>,
    params: Result<Query<DirectoryParams>, QueryRejection>,
) -> ApiResult<Json<DirectoryResponse>> {
    let Query(params) = params?;

    let availability: AvailabilityFilter = params
        .availability
        .as_deref()
        .unwrap_or("")
        .parse()?;

    let query = DirectoryQuery {
        text: params.query.unwrap_or_default(),
        availability,
        page: parse_number("page", params.page.as_deref())?.unwrap_or(1),
        page_size: parse_number("pageSize", params.page_size.as_deref())?,
    };

    let page = state.directory.search(&query);
    let pages = page.window();
    Ok(Json(DirectoryResponse { page, pages }))
}

pub async fn register_profile(
    State(state): State<AppState>,
    body: Result<Json<NewProfile>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    let Json(new) = body?;
    let profile = state.directory.register(new).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Public profiles for everyone; owners also see their own private profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Profile>> {
    let id = ProfileId::from(id);
    let is_owner = session(&headers).is_some_and(|s| s.is(&id));

    let profile = if is_owner {
        state
            .directory
            .get(&id)
            .ok_or_else(|| SwapError::NotFound(format!("profile {}", id)))?
    } else {
        state.directory.get_public(&id)?
    };
    Ok(Json((*profile).clone()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<Json<Profile>> {
    let session = require_session(&headers)?;
    let Json(update) = body?;
    let profile = state
        .directory
        .update(&session, &ProfileId::from(id), update)
        .await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct SwapOptionsParams {
    pub requester: String,
}

pub async fn swap_options(
    State(state): State<AppState>,
    Path(recipient): Path<String>,
    params: Result<Query<SwapOptionsParams>, QueryRejection>,
) -> ApiResult<Json<SwapOptions>> {
    let Query(params) = params?;
    let options = state
        .ledger
        .swap_options(&ProfileId::from(params.requester), &ProfileId::from(recipient))?;
    Ok(Json(options))
}

pub async fn create_request(
    State(state): State<AppState>,
    body: Result<Json<NewSwapRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SwapRequest>)> {
    let Json(new) = body?;
    let request = state.ledger.create(new).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBody {
    pub actor_id: ProfileId,
}

pub async fn transition_request(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
    body: Result<Json<TransitionBody>, JsonRejection>,
) -> ApiResult<Json<SwapRequest>> {
    let action: SwapAction = action.parse()?;
    let Json(body) = body?;
    let request = state
        .ledger
        .transition(&RequestId::from(id), &body.actor_id, action)
        .await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub viewer: String,
    pub direction: Option<String>,
    pub status: Option<String>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<RequestListing>> {
    let Query(params) = params?;
    let direction: Direction = params.direction.as_deref().unwrap_or("").parse()?;
    let status: StatusFilter = params.status.as_deref().unwrap_or("").parse()?;

    let listing = state
        .queries
        .list(&ProfileId::from(params.viewer), direction, status)
        .await?;
    Ok(Json(listing))
}

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    pub viewer: String,
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<ViewerParams>, QueryRejection>,
) -> ApiResult<Json<SwapRequest>> {
    let Query(params) = params?;
    let request = state
        .ledger
        .get_for(&RequestId::from(id), &ProfileId::from(params.viewer))
        .await?;
    Ok(Json(request))
}
