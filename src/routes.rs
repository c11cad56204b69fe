//! HTTP routes for reading the chain and recording checkouts.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::chain::{verify_chain, ChainFault};
use crate::error::AppError;
use crate::ledger::{AppendOutcome, SharedLedger};
use crate::model::{Book, CheckoutEvent, HashedBlock};

/// Response header telling whether `POST /` actually grew the chain.
pub const APPEND_HEADER: &str = "x-ledger-append";

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
}

impl AppState {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_chain).post(write_block))
        .route("/new", post(new_book))
        .route("/validate", get(validate_chain))
        .route("/health", get(health))
        .route("/version", get(version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / — every block, genesis first.
pub async fn get_chain(State(state): State<AppState>) -> Json<Vec<HashedBlock>> {
    Json(state.ledger.snapshot())
}

/// POST / — record a checkout. Echoes the payload whether or not the block
/// was accepted; rejections only show in the log and `x-ledger-append`.
pub async fn write_block(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutEvent>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(checkout) = payload.map_err(|e| {
        tracing::warn!(error = %e, "could not write block");
        AppError::Decode(e.body_text())
    })?;

    let outcome = state.ledger.append(checkout.clone()).map_err(|e| {
        tracing::error!(error = %e, "could not build block");
        AppError::from(e)
    })?;

    let status = match outcome {
        AppendOutcome::Appended { position } => {
            tracing::info!(position, book_id = %checkout.book_id, "block appended");
            "appended"
        }
        AppendOutcome::Rejected { reason } => {
            tracing::warn!(%reason, book_id = %checkout.book_id, "block rejected");
            "rejected"
        }
    };

    Ok(([(APPEND_HEADER, status)], Json(checkout)))
}

/// POST /new — assign an id to a book record.
pub async fn new_book(
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(mut book) = payload.map_err(|e| {
        tracing::warn!(error = %e, "could not create book");
        AppError::Decode(e.body_text())
    })?;
    book.id = book.mint_id();
    tracing::debug!(id = %book.id, isbn = %book.isbn, "book minted");
    Ok(Json(book))
}

/// GET /validate — audit linkage, hashes and positions of the whole chain.
#[derive(Serialize)]
pub struct ValidateResp {
    pub ok: bool,
    pub length: usize,
    pub faults: Vec<ChainFault>,
}

pub async fn validate_chain(State(state): State<AppState>) -> Json<ValidateResp> {
    let blocks = state.ledger.snapshot();
    let faults = verify_chain(&blocks);
    if !faults.is_empty() {
        tracing::error!(count = faults.len(), "chain audit failed");
    }
    Json(ValidateResp {
        ok: faults.is_empty(),
        length: blocks.len(),
        faults,
    })
}

/// GET /health
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub length: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        length: state.ledger.len(),
    })
}

/// GET /version
#[derive(Serialize)]
pub struct Version {
    pub version: &'static str,
    pub git_sha: Option<&'static str>,
}

pub async fn version() -> Json<Version> {
    Json(Version {
        version: env!("CARGO_PKG_VERSION"),
        git_sha: option_env!("GIT_SHA"),
    })
}
