//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domain::{ServiceDay, SquadId};
use crate::itinerary::manual_transport_needs;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/squads", get(list_squads))
        .route("/squads/:id/itinerary", get(squad_itinerary))
        .route("/loads", get(trip_loads))
        .route("/manual-transport", get(manual_transport))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_squads(State(state): State<AppState>) -> Json<SquadsResponse> {
    let squads = state
        .run
        .itineraries
        .iter()
        .map(|i| SquadSummary {
            id: i.squad,
            name: i.name.clone(),
            headcount: i.headcount,
            segments: i.segments.len(),
            manual_transport: i
                .segments
                .iter()
                .filter(|s| s.segment.needs_manual_transport())
                .count(),
        })
        .collect();

    Json(SquadsResponse {
        squads,
        failures: state.run.failures.clone(),
    })
}

async fn squad_itinerary(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let squad = SquadId(id);
    let itinerary = state.run.itinerary(squad).ok_or_else(|| AppError::NotFound {
        message: format!("no itinerary for {squad}"),
    })?;

    Ok(Json(ItineraryResponse {
        squad,
        name: itinerary.name.clone(),
        headcount: itinerary.headcount,
        segments: itinerary
            .segments
            .iter()
            .map(|s| SegmentView::new(s, &state))
            .collect(),
    }))
}

/// Committed headcount per trip instance.
async fn trip_loads(
    State(state): State<AppState>,
    Query(query): Query<LoadsQuery>,
) -> Json<LoadsResponse> {
    let loads: Vec<LoadView> = state
        .run
        .loads
        .iter()
        .filter(|l| !query.over_limit || l.over_limit())
        .map(|l| LoadView {
            load: *l,
            over_limit: l.over_limit(),
        })
        .collect();
    let total_headcount = loads.iter().map(|l| u64::from(l.load.headcount)).sum();

    Json(LoadsResponse {
        loads,
        total_headcount,
    })
}

/// Segments that need transport arranged by hand, optionally for one day.
async fn manual_transport(
    State(state): State<AppState>,
    Query(query): Query<ManualTransportQuery>,
) -> Result<Json<ManualTransportResponse>, AppError> {
    let day = query
        .day
        .as_deref()
        .map(ServiceDay::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    let needs = manual_transport_needs(&state.run)
        .into_iter()
        .filter(|n| day.is_none_or(|d| n.segment.segment.day == d))
        .map(|n| ManualNeedView {
            squad: n.squad,
            squad_name: n.squad_name,
            headcount: n.headcount,
            segment: SegmentView::new(&n.segment, &state),
        })
        .collect();

    Ok(Json(ManualTransportResponse { needs }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
