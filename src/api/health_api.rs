use axum::http::StatusCode;

pub async fn health_api() -> StatusCode {
    StatusCode::OK
}
