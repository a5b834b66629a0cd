//! HTTP routes: full-log dump, event submission and product lookup.

use crate::block::Event;
use crate::error::{LedgerError, Result};
use crate::service::{LookupResult, Provenance, SubmitResult};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1 << 20;

const INTERNAL_ERROR_BODY: &str = "HTTP 500: Internal Server Error";

/// Body of a product lookup request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProductQuery {
    pub product_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Rejected<'a> {
    rejected_msg: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody<'a> {
    error: &'a str,
}

pub fn router(provenance: Provenance) -> Router {
    Router::new()
        .route("/", get(get_blockchain).post(write_block))
        .route("/GetDetails", post(product_details))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(provenance)
}

/// GET /
pub async fn get_blockchain(State(provenance): State<Provenance>) -> Response {
    respond_with_json(StatusCode::OK, &provenance.get_all())
}

/// POST /
pub async fn write_block(State(provenance): State<Provenance>, body: Bytes) -> Response {
    match decode::<Event>(&body) {
        Ok(event) => provenance.submit_event(event).into_response(),
        Err(LedgerError::MalformedInput(msg)) => SubmitResult::Malformed(msg).into_response(),
        Err(err) => err.into_response(),
    }
}

/// POST /GetDetails
pub async fn product_details(State(provenance): State<Provenance>, body: Bytes) -> Response {
    match decode::<ProductQuery>(&body) {
        Ok(query) => provenance.lookup_product(&query.product_id).into_response(),
        Err(err) => err.into_response(),
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| LedgerError::MalformedInput(e.to_string()))
}

/// Pretty-print `payload`; an encoding failure becomes a bodiless 500.
fn respond_with_json<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_string_pretty(payload) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => LedgerError::from(e).into_response(),
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let code = status(self.status_code());
        if code.is_server_error() {
            error!(error = %self, "request failed");
            return (code, INTERNAL_ERROR_BODY).into_response();
        }
        let msg = self.to_string();
        respond_with_json(code, &ErrorBody { error: &msg })
    }
}

impl IntoResponse for SubmitResult {
    fn into_response(self) -> Response {
        let code = status(self.status_code());
        match &self {
            SubmitResult::Accepted(block) => respond_with_json(code, block),
            SubmitResult::Rejected(msg) => respond_with_json(code, &Rejected { rejected_msg: msg }),
            SubmitResult::Malformed(msg) => respond_with_json(code, &ErrorBody { error: msg }),
        }
    }
}

impl IntoResponse for LookupResult {
    fn into_response(self) -> Response {
        respond_with_json(status(self.status_code()), self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::ledger::Ledger;
    use crate::query::ProductView;
    use crate::quality::REJECTED_MSG;
    use std::sync::Arc;

    fn state() -> State<Provenance> {
        State(Provenance::new(Arc::new(Ledger::new())))
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn payload(json: &str) -> Bytes {
        Bytes::from(json.to_owned())
    }

    #[tokio::test]
    async fn submit_accepted_returns_201_and_block() {
        let st = state();
        let resp = write_block(
            st.clone(),
            payload(r#"{"Temperature": 24, "Humidity": 45, "ProductId": "abc", "FarmId": "farm1"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let block: Block = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(block.index, 1);
        assert!(block.verify());
        assert_eq!(st.0.get_all().len(), 2);
    }

    #[tokio::test]
    async fn submit_rejected_returns_406() {
        let st = state();
        let resp = write_block(
            st.clone(),
            payload(r#"{"Temperature": 18, "Humidity": 45, "ProductId": "abc", "FarmId": "farm1"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(body_json(resp).await["RejectedMsg"], REJECTED_MSG);
        assert_eq!(st.0.get_all().len(), 1);
    }

    #[tokio::test]
    async fn malformed_submit_returns_400() {
        let st = state();
        let resp = write_block(st.clone(), payload(r#"{"Temperature": "hot"}"#)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = write_block(st.clone(), payload("")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(st.0.get_all().len(), 1);
    }

    #[tokio::test]
    async fn lookup_found_and_missing() {
        let st = state();
        for body in [
            r#"{"Temperature": 22, "Humidity": 42, "ProductId": "p1", "FarmId": "farm1"}"#,
            r#"{"Temperature": 25, "Humidity": 45, "ProductId": "p2", "FarmId": "farm1"}"#,
            r#"{"Temperature": 28, "Humidity": 48, "ProductId": "p1", "FarmId": "farm2"}"#,
        ] {
            write_block(st.clone(), payload(body)).await;
        }

        let resp = product_details(st.clone(), payload(r#"{"ProductId": "p1"}"#)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let view: ProductView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view.temperature, 22);
        assert_eq!(view.farm_id, "farm1");

        let resp = product_details(st.clone(), payload(r#"{"ProductId": "zzz"}"#)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let view: ProductView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view, ProductView::not_found());
    }

    #[tokio::test]
    async fn malformed_lookup_returns_400() {
        let resp = product_details(state(), payload("[1, 2")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_log_is_pretty_json_array() {
        let st = state();
        let resp = get_blockchain(st).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("[\n  {"));
        let blocks: Vec<Block> = serde_json::from_str(&text).unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_genesis());
    }

    #[tokio::test]
    async fn encoding_failure_is_a_bodiless_500() {
        let err = LedgerError::from(serde_json::from_str::<u8>("oops").unwrap_err());
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], INTERNAL_ERROR_BODY.as_bytes());
    }

    #[tokio::test]
    async fn malformed_submit_names_the_decode_error() {
        let resp = write_block(state(), payload("{")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(!body["Error"].as_str().unwrap().is_empty());
    }

    #[test]
    fn router_builds() {
        let _ = router(Provenance::new(Arc::new(Ledger::new())));
    }
}
