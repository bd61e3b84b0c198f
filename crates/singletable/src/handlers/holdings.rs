use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use singletable_core::entities::{Holding, NewHolding};
use singletable_core::storage::{Page, PageRequest, Timestamped};

use crate::handlers::error::AppError;
use crate::handlers::extract::{self, Path, Query};
use crate::state::AppState;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

/// List a user's holdings (GET /api/users/{user_id}/holdings).
#[axum::debug_handler]
pub async fn list_holdings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Timestamped<Holding>>>, AppError> {
    let page = PageRequest::new(params.limit, params.cursor)?;
    let holdings = state.holdings.list_by_user(&user_id, &page).await?;

    tracing::debug!(
        %user_id,
        count = holdings.items.len(),
        has_more = holdings.has_more(),
        "Listed holdings"
    );

    Ok(Json(holdings))
}

/// Add a holding (POST /api/users/{user_id}/holdings).
#[axum::debug_handler]
pub async fn create_holding(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    extract::Json(request): extract::Json<NewHolding>,
) -> Result<(StatusCode, Json<Timestamped<Holding>>), AppError> {
    let holding = request.into_holding(user_id);
    holding.validate()?;
    let holding = state.holdings.create(holding).await?;

    tracing::info!(
        user_id = %holding.user_id,
        ticker_id = %holding.ticker_id,
        "Created holding"
    );

    Ok((StatusCode::CREATED, Json(holding)))
}
