use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::dto::{AddSwiftCodeRequest, CountryResponse, FieldErrors, MessageResponse, SwiftCodeDetails};
use crate::service::SwiftCodeService;

use super::error::ApiError;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /v1/swift-codes/:swift_code - branch or headquarters-with-branches
pub async fn get_swift_details(
    State(service): State<SwiftCodeService>,
    Path(swift_code): Path<String>,
) -> Result<Json<SwiftCodeDetails>, ApiError> {
    Ok(Json(service.get_details(&swift_code)?))
}

/// GET /v1/swift-codes/country/:iso2
pub async fn get_swift_by_country(
    State(service): State<SwiftCodeService>,
    Path(iso2): Path<String>,
) -> Result<Json<CountryResponse>, ApiError> {
    Ok(Json(service.get_by_country(&iso2)?))
}

/// DELETE /v1/swift-codes/:swift_code
pub async fn delete_swift(
    State(service): State<SwiftCodeService>,
    Path(swift_code): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = service.delete(&swift_code)?;
    Ok(Json(MessageResponse::new(message)))
}

/// POST /v1/swift-codes
pub async fn add_swift(
    State(service): State<SwiftCodeService>,
    payload: Result<Json<AddSwiftCodeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        let mut errors = FieldErrors::new();
        errors.insert("body".to_string(), rejection.body_text());
        ApiError::Validation(errors)
    })?;

    let new_code = request.validate().map_err(ApiError::Validation)?;
    let message = service.add(new_code)?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new(message))))
}
