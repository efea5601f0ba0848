//! Cache revalidation webhook.
//!
//! Vendure (or an event-forwarding plugin) posts here when catalog data
//! changes. The topic header names the event, e.g. `products/update`.
//! The endpoint always answers `200` so the sender does not retry.

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use vendure_storefront_core::CacheTag;

use crate::state::AppState;

/// Header carrying the webhook topic.
pub const TOPIC_HEADER: &str = "x-vendure-topic";

/// Webhook query parameters.
#[derive(Debug, Deserialize)]
pub struct RevalidateParams {
    pub secret: Option<String>,
}

/// Webhook response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidateResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revalidated: Option<bool>,
    /// Unix time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now: Option<i64>,
}

impl RevalidateResponse {
    const fn ignored() -> Self {
        Self {
            status: 200,
            revalidated: None,
            now: None,
        }
    }
}

/// The cache tag a webhook topic invalidates.
#[must_use]
pub fn topic_tag(topic: &str) -> Option<CacheTag> {
    match topic {
        "collections/create" | "collections/update" | "collections/delete" => {
            Some(CacheTag::Collections)
        }
        "products/create" | "products/update" | "products/delete" => Some(CacheTag::Products),
        _ => None,
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// Handle a revalidation webhook.
#[instrument(skip(state, headers, params))]
pub async fn revalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RevalidateParams>,
) -> Json<RevalidateResponse> {
    let expected = state.config().vendure.revalidation_secret.expose_secret();
    let authorized = params
        .secret
        .as_deref()
        .is_some_and(|secret| constant_time_compare(secret, expected));
    if !authorized {
        tracing::error!("Invalid revalidation secret.");
        return Json(RevalidateResponse::ignored());
    }

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let Some(tag) = topic_tag(topic) else {
        tracing::debug!(topic, "Ignoring revalidation topic");
        return Json(RevalidateResponse::ignored());
    };

    state.vendure().revalidate_tag(tag);

    Json(RevalidateResponse {
        status: 200,
        revalidated: Some(true),
        now: Some(chrono::Utc::now().timestamp_millis()),
    })
}
