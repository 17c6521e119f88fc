//! Category handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use bazaar_core::CategoryId;

use crate::error::Result;
use crate::state::AppState;

/// All categories, including disabled ones.
pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "categories": state.catalog().categories().await }))
}

/// Category detail.
pub async fn show(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Value>> {
    let category = state
        .catalog()
        .category(&CategoryId::new(category_id))
        .await?;
    Ok(Json(json!({ "category": category })))
}
