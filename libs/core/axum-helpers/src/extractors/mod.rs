//! Custom extractors for Axum handlers.

pub mod form_input;
pub mod id_path;

pub use form_input::{FormInput, UploadedFile};
pub use id_path::IdPath;
