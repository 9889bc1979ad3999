//! Fetch HTTP Routes
//!
//! `GET` carries the request in the query string (every value is text);
//! `POST` carries it as a JSON body (values keep their native shape).
//! The pipeline is synchronous and runs on the blocking pool.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::catalog::{Catalog, Row};
use crate::query::{AssembledQuery, FetchRequest, QueryService};

use super::errors::{ServerError, ServerResult};

/// Fetch and explain endpoints, mounted under `/api`
pub fn fetch_routes<C: Catalog + 'static>(service: Arc<QueryService<C>>) -> Router {
    Router::new()
        .route(
            "/method/fetch",
            get(fetch_query_handler::<C>).post(fetch_body_handler::<C>),
        )
        .route("/method/explain", post(explain_handler::<C>))
        .with_state(service)
}

async fn fetch_query_handler<C: Catalog + 'static>(
    State(service): State<Arc<QueryService<C>>>,
    Query(params): Query<HashMap<String, String>>,
) -> ServerResult<Json<Vec<Row>>> {
    let request = FetchRequest::from_query_params(&params);
    run_blocking(service, move |service| service.fetch(&request)).await
}

async fn fetch_body_handler<C: Catalog + 'static>(
    State(service): State<Arc<QueryService<C>>>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> ServerResult<Json<Vec<Row>>> {
    let Json(request) = body.map_err(|e| ServerError::InvalidBody(e.body_text()))?;
    run_blocking(service, move |service| service.fetch(&request)).await
}

/// Returns the statement that `fetch` would run, or `null` on a soft failure
async fn explain_handler<C: Catalog + 'static>(
    State(service): State<Arc<QueryService<C>>>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> ServerResult<Json<Option<AssembledQuery>>> {
    let Json(request) = body.map_err(|e| ServerError::InvalidBody(e.body_text()))?;
    run_blocking(service, move |service| service.plan(&request)).await
}

async fn run_blocking<C, T, F>(service: Arc<QueryService<C>>, job: F) -> ServerResult<Json<T>>
where
    C: Catalog + 'static,
    T: Send + 'static,
    F: FnOnce(&QueryService<C>) -> crate::query::QueryResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || job(&service))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(Json(result?))
}
