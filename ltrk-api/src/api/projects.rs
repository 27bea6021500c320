//! Project-interest lookup surface
//!
//! Submissions key on a project interest; marketers need the active list to
//! submit against. Managing the catalog itself happens out of band.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use ltrk_common::Error;

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub guid: String,
    pub name: String,
    pub description: Option<String>,
}

/// GET /projects - active project interests, alphabetical
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectView>>, ApiError> {
    let rows: Vec<(String, String, Option<String>)> = sqlx::query_as(
        "SELECT guid, name, description FROM project_interests WHERE active = 1 ORDER BY name ASC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(Error::from)?;

    let views = rows
        .into_iter()
        .map(|(guid, name, description)| ProjectView {
            guid,
            name,
            description,
        })
        .collect();

    Ok(Json(views))
}
