//! Professional and client search.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregate::{fetch_clients, fetch_professionals, RoleFilter, SearchFilter};
use crate::http::auth::Authenticated;
use crate::http::error::GatewayError;
use crate::http::server::AppState;
use crate::session::Role;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub role: Option<String>,
    pub q: Option<String>,
}

pub async fn search_professionals(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, GatewayError> {
    auth.require_role(Role::User, "Professional search is only available to users.")?;

    let people = fetch_professionals(&state.upstream, &auth.token)
        .await
        .map_err(|e| GatewayError::from_upstream(e, "Could not load professionals."))?;

    let filter = SearchFilter::new(RoleFilter::parse(params.role.as_deref()), params.q.as_deref());
    let professionals = filter.apply(&people);
    tracing::debug!(found = people.len(), matched = professionals.len(), "Professional search");

    Ok(Json(json!({ "professionals": professionals })))
}

pub async fn search_clients(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, GatewayError> {
    if !auth.session.role.is_professional() {
        return Err(GatewayError::Forbidden(
            "Client search is only available to professionals.".to_string(),
        ));
    }

    let people = fetch_clients(&state.upstream, &auth.token, &auth.session).await;
    let filter = SearchFilter::new(RoleFilter::Any, params.q.as_deref());
    Ok(Json(json!({ "clients": filter.apply(&people) })))
}
