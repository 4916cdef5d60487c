use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use super::domain::CheckRequest;
use super::engine::{start_of_day, Assessment, RecordSource, ScreeningEngine, ScreeningReport};
use crate::error::AppError;

/// Shared handler state: the engine plus the configured record source.
pub struct ScreeningState<S: ?Sized> {
    pub engine: Arc<ScreeningEngine>,
    pub source: Arc<S>,
}

impl<S: ?Sized> Clone for ScreeningState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            source: self.source.clone(),
        }
    }
}

/// Body for scoring a record document the caller already holds.
#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub document: Value,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Router exposing document assessment and full background checks.
pub fn screening_router<S>(engine: Arc<ScreeningEngine>, source: Arc<S>) -> Router
where
    S: RecordSource + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/screenings", post(check_handler::<S>))
        .route("/api/v1/screenings/assess", post(assess_handler::<S>))
        .with_state(ScreeningState { engine, source })
}

pub(crate) async fn assess_handler<S>(
    State(state): State<ScreeningState<S>>,
    Json(payload): Json<AssessRequest>,
) -> Result<Json<Assessment>, AppError>
where
    S: RecordSource + ?Sized + 'static,
{
    let as_of = payload
        .as_of
        .map(start_of_day)
        .unwrap_or_else(|| Local::now().naive_local());
    let assessment = state.engine.assess_at(&payload.document, as_of)?;
    Ok(Json(assessment))
}

pub(crate) async fn check_handler<S>(
    State(state): State<ScreeningState<S>>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<ScreeningReport>, AppError>
where
    S: RecordSource + ?Sized + 'static,
{
    let report = state
        .engine
        .run_background_check(state.source.as_ref(), request)?;
    Ok(Json(report))
}
