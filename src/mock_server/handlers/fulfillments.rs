//! Fulfillment endpoint handlers.
//!
//! All routes are nested under an order: `/orders/{order_id}/fulfillments`.

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{envelope, error, not_found, paginate, parse_id, unwrap_body};
use super::{FieldsQuery, ListQuery, SharedState};
use crate::{Fulfillment, FulfillmentStatus};

/// GET /admin/api/{version}/orders/{order_id}/fulfillments.json
pub async fn list_fulfillments(
    State(state): State<SharedState>,
    Path((_version, order_id)): Path<(String, u64)>,
    uri: Uri,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    let link_base = format!("{}{}", state.origin, uri.path());

    match paginate(&query, &link_base, |since_id| {
        state
            .list_fulfillments(order_id, since_id)
            .into_iter()
            .cloned()
            .collect::<Vec<Fulfillment>>()
    }) {
        Ok(page) => page.into_response("fulfillments", query.fields.as_deref()),
        Err(response) => response,
    }
}

/// POST /admin/api/{version}/orders/{order_id}/fulfillments.json
pub async fn create_fulfillment(
    State(state): State<SharedState>,
    Path((_version, order_id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> Response {
    let fulfillment: Fulfillment = match unwrap_body(&body, "fulfillment") {
        Ok(fulfillment) => fulfillment,
        Err(response) => return response,
    };

    if fulfillment.location_id.is_none() {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "location_id": ["can't be blank"] }),
        );
    }

    let created = state.write().await.create_fulfillment(order_id, fulfillment);
    let mut response = envelope("fulfillment", &created, None);
    *response.status_mut() = StatusCode::CREATED;
    response
}

/// GET /admin/api/{version}/orders/{order_id}/fulfillments/{id}.json
/// and GET .../fulfillments/count.json
pub async fn get_fulfillment(
    State(state): State<SharedState>,
    Path((_version, order_id, file)): Path<(String, u64, String)>,
    Query(query): Query<FieldsQuery>,
) -> Response {
    let state = state.read().await;

    if file == "count.json" {
        let count = state.list_fulfillments(order_id, None).len();
        return (StatusCode::OK, Json(json!({ "count": count }))).into_response();
    }

    let Some(id) = parse_id(&file) else {
        return not_found();
    };
    match state.get_fulfillment(order_id, id) {
        Some(fulfillment) => envelope("fulfillment", fulfillment, query.fields.as_deref()),
        None => not_found(),
    }
}

/// PUT /admin/api/{version}/orders/{order_id}/fulfillments/{id}.json
pub async fn update_fulfillment(
    State(state): State<SharedState>,
    Path((_version, order_id, file)): Path<(String, u64, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(id) = parse_id(&file) else {
        return not_found();
    };
    let patch: Fulfillment = match unwrap_body(&body, "fulfillment") {
        Ok(patch) => patch,
        Err(response) => return response,
    };

    match state.write().await.update_fulfillment(order_id, id, patch) {
        Some(fulfillment) => envelope("fulfillment", &fulfillment, None),
        None => not_found(),
    }
}

/// POST /admin/api/{version}/orders/{order_id}/fulfillments/{id}/{action}.json
///
/// `action` is one of `complete`, `cancel` or `open`.
pub async fn transition_fulfillment(
    State(state): State<SharedState>,
    Path((_version, order_id, id, action)): Path<(String, u64, u64, String)>,
) -> Response {
    let status = match action.as_str() {
        "complete.json" => FulfillmentStatus::Success,
        "cancel.json" => FulfillmentStatus::Cancelled,
        "open.json" => FulfillmentStatus::Open,
        _ => return not_found(),
    };

    let mut state = state.write().await;
    let current = match state.get_fulfillment(order_id, id) {
        Some(fulfillment) => fulfillment.status.clone(),
        None => return not_found(),
    };
    if current == Some(FulfillmentStatus::Cancelled) {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "base": ["Cannot change the status of a cancelled fulfillment"] }),
        );
    }

    match state.set_fulfillment_status(order_id, id, status) {
        Some(fulfillment) => envelope("fulfillment", &fulfillment, None),
        None => not_found(),
    }
}
