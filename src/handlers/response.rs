use axum::Json;
use serde::Serialize;

/// The response payload for simple acknowledgements.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Wraps an acknowledgement text as a JSON body.
pub fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}
