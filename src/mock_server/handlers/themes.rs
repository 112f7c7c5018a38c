//! Theme endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{envelope, error, not_found, paginate, parse_id, unwrap_body};
use super::{FieldsQuery, ListQuery, SharedState};
use crate::Theme;

/// GET /admin/api/{version}/themes.json
pub async fn list_themes(
    State(state): State<SharedState>,
    uri: Uri,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let link_base = format!("{}{}", state.origin, uri.path());

    match paginate(&query, &link_base, |since_id| {
        state.list_themes(since_id).into_iter().cloned().collect::<Vec<Theme>>()
    }) {
        Ok(page) => page.into_response("themes", query.fields.as_deref()),
        Err(response) => response,
    }
}

/// POST /admin/api/{version}/themes.json
pub async fn create_theme(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let theme: Theme = match unwrap_body(&body, "theme") {
        Ok(theme) => theme,
        Err(response) => return response,
    };

    if theme.name.as_deref().map_or(true, str::is_empty) {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "name": ["can't be blank"] }),
        );
    }

    let created = state.write().await.create_theme(theme);
    let mut response = envelope("theme", &created, None);
    *response.status_mut() = StatusCode::CREATED;
    response
}

/// GET /admin/api/{version}/themes/{id}.json
pub async fn get_theme(
    State(state): State<SharedState>,
    Path((_version, file)): Path<(String, String)>,
    Query(query): Query<FieldsQuery>,
) -> Response {
    let Some(id) = parse_id(&file) else {
        return not_found();
    };
    let state = state.read().await;
    match state.get_theme(id) {
        Some(theme) => envelope("theme", theme, query.fields.as_deref()),
        None => not_found(),
    }
}

/// PUT /admin/api/{version}/themes/{id}.json
pub async fn update_theme(
    State(state): State<SharedState>,
    Path((_version, file)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(id) = parse_id(&file) else {
        return not_found();
    };
    let patch: Theme = match unwrap_body(&body, "theme") {
        Ok(patch) => patch,
        Err(response) => return response,
    };

    if patch.name.as_deref() == Some("") {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "name": ["can't be blank"] }),
        );
    }

    match state.write().await.update_theme(id, patch) {
        Some(theme) => envelope("theme", &theme, None),
        None => not_found(),
    }
}

/// DELETE /admin/api/{version}/themes/{id}.json
pub async fn delete_theme(
    State(state): State<SharedState>,
    Path((_version, file)): Path<(String, String)>,
) -> Response {
    let Some(id) = parse_id(&file) else {
        return not_found();
    };

    let mut state = state.write().await;
    match state.get_theme(id).map(Theme::is_main) {
        Some(true) => error(
            StatusCode::FORBIDDEN,
            json!("The main theme cannot be deleted"),
        ),
        Some(false) => {
            state.delete_theme(id);
            (StatusCode::OK, Json(json!({}))).into_response()
        }
        None => not_found(),
    }
}
