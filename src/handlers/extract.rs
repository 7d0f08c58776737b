//! Extractors that reject malformed input with 422 before a handler body runs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Json, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, FieldViolation};
use crate::models::Normalize;

/// JSON body that has been deserialised, normalised and validated.
pub struct ValidatedJson<T>(pub T);

fn body_violation(rejection: JsonRejection) -> AppError {
    let code = match &rejection {
        JsonRejection::JsonDataError(_) => "invalid_type",
        JsonRejection::JsonSyntaxError(_) => "invalid_json",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        _ => "invalid_body",
    };
    AppError::Validation(vec![FieldViolation::new("body", code, rejection.body_text())])
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Normalize,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(body_violation)?;

        let data = data.normalize();
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

/// Integer `{id}` path segment.
pub struct ProductId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(vec![FieldViolation::new("product_id", "path", e.body_text())]))?;

        raw.parse::<i32>().map(ProductId).map_err(|_| {
            AppError::Validation(vec![FieldViolation::new(
                "product_id",
                "int_parsing",
                format!("Input should be a valid integer, unable to parse '{}'", raw),
            )])
        })
    }
}
