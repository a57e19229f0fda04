//! Loosely-typed request input for handlers that validate field by field.

use crate::errors::AppError;
use axum::{
    body::Bytes,
    extract::{Form, FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Map, Value};

/// A file part received in a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file was sent under
    pub field: String,
    /// File name as sent by the client
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Request fields and files, independent of the body encoding.
///
/// Accepts `application/json` (an object), `application/x-www-form-urlencoded`
/// and `multipart/form-data`. Text from form encodings arrives as
/// `Value::String`; typing is left to the validator. An empty body yields
/// no fields so that "required" rules can report them.
///
/// # Example
/// ```ignore
/// async fn create(FormInput { fields, files }: FormInput) -> Response {
///     let name = fields.get("name");
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub fields: Map<String, Value>,
    pub files: Vec<UploadedFile>,
}

impl FormInput {
    /// Build from query-string pairs; the last value for a key wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let fields = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Self {
            fields,
            files: Vec::new(),
        }
    }

    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    /// Remove and return the file sent under `field`.
    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.field == field)?;
        Some(self.files.swap_remove(index))
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut input = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;

                    // A zero-byte part carries no file, whatever its name.
                    if bytes.is_empty() {
                        continue;
                    }

                    input.files.retain(|f| f.field != name);
                    input.files.push(UploadedFile {
                        field: name,
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                None => {
                    let text = field.text().await.map_err(multipart_error)?;
                    input.fields.insert(name, Value::String(text));
                }
            }
        }

        Ok(input)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => Ok(Self {
                fields,
                files: Vec::new(),
            }),
            Ok(_) => Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
            Err(e) => Err(AppError::BadRequest(format!(
                "Failed to parse the request body as JSON: {}",
                e
            ))),
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self::from_pairs(pairs));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(e.body_text())
            } else {
                AppError::BadRequest(e.body_text())
            }
        })?;
        Self::from_json(&bytes)
    }
}
