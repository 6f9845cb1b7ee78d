//! Route handlers.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use astviz::{AstvizError, MAX_INPUT_CHARS, SourceInput};

use crate::{
    AppState,
    http::{json_error, json_ok},
};

pub const SUCCESS_MESSAGE: &str = "AST image successfully generated.";
pub const MISSING_IMAGE_DETAIL: &str = "Failed to generate AST image.";

#[derive(Debug, Deserialize)]
pub struct VisualizeQuery {
    input_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VisualizeResponse<'a> {
    pub input_code: &'a str,
    pub file_path: &'a str,
    pub message: &'a str,
}

pub async fn health() -> impl IntoResponse {
    "ok"
}

/// `GET /api/ast/visualize?input_code=...`
pub async fn visualize_ast(
    State(state): State<AppState>,
    query: Result<Query<VisualizeQuery>, QueryRejection>,
) -> Response {
    let input_code = match validate(query) {
        Ok(input_code) => input_code,
        Err(detail) => {
            info!(detail; "Rejected visualization request");
            return json_error(StatusCode::UNPROCESSABLE_ENTITY, detail);
        }
    };

    let visualizer = state.visualizer.clone();
    let store = state.store.clone();
    let source = SourceInput::text(input_code.clone());

    match tokio::task::spawn_blocking(move || visualizer.visualize(&source, &store)).await {
        Ok(Ok(artifact)) => json_ok(&VisualizeResponse {
            input_code: &input_code,
            file_path: artifact.public_path(),
            message: SUCCESS_MESSAGE,
        }),
        Ok(Err(err)) => {
            let (status, detail) = error_response(&err);
            if status.is_server_error() {
                error!(err:err; "Visualization failed");
            } else {
                warn!(status = status.as_u16(), err:err; "Visualization rejected");
            }
            json_error(status, detail)
        }
        Err(err) => {
            error!(err:err; "Visualization worker join error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("visualization worker join error: {err}"),
            )
        }
    }
}

fn validate(query: Result<Query<VisualizeQuery>, QueryRejection>) -> Result<String, String> {
    let Query(query) = query.map_err(|rejection| format!("invalid query: {rejection}"))?;

    let input_code = query
        .input_code
        .ok_or_else(|| "input_code: field required".to_string())?;

    if input_code.chars().count() > MAX_INPUT_CHARS {
        return Err(format!(
            "input_code: ensure this value has at most {MAX_INPUT_CHARS} characters"
        ));
    }

    Ok(input_code)
}

/// Maps a pipeline failure to its HTTP status and `detail` text.
pub fn error_response(err: &AstvizError) -> (StatusCode, String) {
    match err {
        AstvizError::AstProcessing(_) | AstvizError::Render(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        AstvizError::MemoryLimitExceeded { .. } => (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()),
        AstvizError::MissingArtifact(_) | AstvizError::Io(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            MISSING_IMAGE_DETAIL.to_string(),
        ),
    }
}
