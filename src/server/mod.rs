//! Relation backend: serves a relation corpus over HTTP for the explorer.
//!
//! Routes:
//! - `GET /query` initial relation text (query file, or the whole corpus)
//! - `GET /entity/:id` relations scoped to one entity, 404 when unknown
//! - `GET /health`

mod corpus;

pub use corpus::RelationCorpus;

use crate::config::Config;
use crate::error::{PiiGraphError, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const TEXT_PLAIN: &str = "text/plain; charset=UTF-8";

/// HTTP server for one relation corpus
pub struct RelationServer {
    corpus: Arc<RelationCorpus>,
    query: Arc<String>,
    allowed_origins: Vec<String>,
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    corpus: Arc<RelationCorpus>,
    query: Arc<String>,
}

impl RelationServer {
    /// Serve `corpus`; `query` defaults to the whole corpus.
    pub fn new(
        corpus: RelationCorpus,
        query: Option<String>,
        allowed_origins: Vec<String>,
    ) -> Self {
        let query = query.unwrap_or_else(|| corpus.to_text());
        Self {
            corpus: Arc::new(corpus),
            query: Arc::new(query),
            allowed_origins,
        }
    }

    /// Load the corpus and optional query file named in `[server]`
    pub fn from_config(config: &Config) -> Result<Self> {
        let relations_file = &config.server.relations_file;
        let text = std::fs::read_to_string(relations_file).map_err(|e| {
            PiiGraphError::Config(format!(
                "Failed to read relations file {}: {}",
                relations_file.display(),
                e
            ))
        })?;
        let corpus = RelationCorpus::parse(&text);
        log::info!(
            "Loaded {} relation lines from {}",
            corpus.len(),
            relations_file.display()
        );

        let query = match &config.server.query_file {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
                PiiGraphError::Config(format!(
                    "Failed to read query file {}: {}",
                    path.display(),
                    e
                ))
            })?),
            None => None,
        };

        Ok(Self::new(corpus, query, config.server.allowed_origins.clone()))
    }

    /// Run the HTTP server
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.router();

        let addr = format!("127.0.0.1:{}", port);
        log::info!("Serving relations on http://{}/query", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| PiiGraphError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| PiiGraphError::Server(format!("HTTP server error: {}", e)))?;

        Ok(())
    }

    /// Create the axum router
    pub fn router(&self) -> Router {
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new().allow_origin(Any).allow_methods(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
        };

        Router::new()
            .route("/query", get(handle_query))
            .route("/entity/:id", get(handle_entity))
            .route("/health", get(handle_health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(AppState {
                corpus: Arc::clone(&self.corpus),
                query: Arc::clone(&self.query),
            })
    }
}

fn relation_text(body: String) -> Response {
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

async fn handle_query(State(state): State<AppState>) -> Response {
    relation_text(state.query.as_ref().clone())
}

async fn handle_entity(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.corpus.entity(&id) {
        Some(text) => relation_text(text),
        None => {
            log::debug!("unknown entity requested: {}", id);
            (StatusCode::NOT_FOUND, format!("Unknown entity: {}", id)).into_response()
        }
    }
}

async fn handle_health() -> &'static str {
    "ok"
}
