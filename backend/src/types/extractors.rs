//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, FromRequest, Multipart, Request},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::gallery::UploadFile;
use crate::types::error::AppError;

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First extract JSON
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_content_type",
                    "Missing Content-Type: application/json header",
                    false,
                ),
                _ => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_json",
                    "Invalid JSON payload",
                    false,
                ),
            })?;

        // Then validate
        payload.validate().map_err(|errors| {
            // The first field error carrying a message wins
            for field_errors in errors.field_errors().values() {
                if let Some(message) = field_errors.first().and_then(|e| e.message.as_ref()) {
                    return AppError::validation_from_str(message, "validation_error");
                }
            }
            AppError::validation_from_str("", "validation_error")
        })?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(ctx: &mut aide::generate::GenContext, operation: &mut aide::openapi::Operation) {
        // Delegate to Json<T>'s implementation since ValidatedJson has the same structure
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        // Document validation error responses
        AppError::inferred_responses(ctx, operation)
    }
}

/// Multipart upload form: an optional `bucket` text field and any number of
/// `files` parts, kept in submission order
#[derive(Debug, Default)]
pub struct UploadForm {
    /// Value of the `bucket` field, if the form carried one
    pub bucket: Option<String>,
    /// Files picked or dropped by the user
    pub files: Vec<UploadFile>,
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                MultipartRejection::InvalidBoundary(_) => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_content_type",
                    "Expected a multipart/form-data body",
                    false,
                ),
                other => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_multipart",
                    other.body_text(),
                    false,
                ),
            })?;

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
            let field_name = field.name().map(ToString::to_string);
            match field_name.as_deref() {
                Some("bucket") => {
                    form.bucket = Some(field.text().await.map_err(invalid_multipart)?);
                }
                Some("files") => {
                    // An empty file input still submits one part without a name
                    let name = field.file_name().unwrap_or_default().to_string();
                    if name.is_empty() {
                        continue;
                    }
                    let content_type = field.content_type().map(ToString::to_string);
                    let content = field.bytes().await.map_err(invalid_multipart)?;

                    tracing::debug!(name = %name, size = content.len(), "Received upload part");
                    form.files.push(UploadFile {
                        name,
                        content,
                        content_type,
                    });
                }
                other => tracing::debug!(field = ?other, "Skipping unknown multipart field"),
            }
        }

        Ok(form)
    }
}

fn invalid_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!(error = %err, "Failed to read multipart field");
    AppError::new(err.status(), "invalid_multipart", err.body_text(), false)
}

impl OperationInput for UploadForm {
    fn operation_input(ctx: &mut aide::generate::GenContext, operation: &mut aide::openapi::Operation) {
        Multipart::operation_input(ctx, operation);
    }
}
