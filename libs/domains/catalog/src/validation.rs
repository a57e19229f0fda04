//! Field-by-field input validation.
//!
//! Each field runs a chain of predicates; the first failure is recorded as a
//! single message and the remaining fields are still checked. Checks that need
//! the store (`unique`, `exists`) are made by the services, and only for fields
//! whose shape is already valid.
//!
//! ```ignore
//! let mut report = Report::new();
//! let draft = validation::category(&input.fields, &mut report);
//! if let Some(name) = &draft.name {
//!     if repository.name_taken(name, None).await? {
//!         report.fail("name", Rule::Unique);
//!     }
//! }
//! report.finish()?;
//! ```

use axum_helpers::UploadedFile;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use validator::{ValidationError, ValidationErrors};

use crate::models::{CategoryInput, PageRequest, ProductFilter, ProductInput};

pub const NAME_MAX_CHARS: usize = 255;
pub const IMAGE_MAX_KILOBYTES: usize = 2048;
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpeg", "png", "jpg", "gif"];

/// A failed validation rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Required,
    String,
    MaxChars(usize),
    Unique,
    Boolean,
    Numeric,
    Min(f64),
    Integer,
    Exists,
    Image,
    Mimes,
    MaxKilobytes(usize),
}

impl Rule {
    pub fn code(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::MaxChars(_) | Rule::MaxKilobytes(_) => "max",
            Rule::Unique => "unique",
            Rule::Boolean => "boolean",
            Rule::Numeric => "numeric",
            Rule::Min(_) => "min",
            Rule::Integer => "integer",
            Rule::Exists => "exists",
            Rule::Image => "image",
            Rule::Mimes => "mimes",
        }
    }

    /// Message shown to clients; underscores in `field` become spaces.
    pub fn message(&self, field: &str) -> String {
        let field = field.replace('_', " ");
        match self {
            Rule::Required => format!("The {} field is required.", field),
            Rule::String => format!("The {} field must be a string.", field),
            Rule::MaxChars(max) => format!(
                "The {} field must not be greater than {} characters.",
                field, max
            ),
            Rule::Unique => format!("The {} has already been taken.", field),
            Rule::Boolean => format!("The {} field must be true or false.", field),
            Rule::Numeric => format!("The {} field must be a number.", field),
            Rule::Min(min) => format!("The {} field must be at least {}.", field, min),
            Rule::Integer => format!("The {} field must be an integer.", field),
            Rule::Exists => format!("The selected {} is invalid.", field),
            Rule::Image => format!("The {} field must be an image.", field),
            Rule::Mimes => format!(
                "The {} field must be a file of type: {}.",
                field,
                IMAGE_EXTENSIONS.join(", ")
            ),
            Rule::MaxKilobytes(max) => format!(
                "The {} field must not be greater than {} kilobytes.",
                field, max
            ),
        }
    }
}

/// Collects at most one failure per field.
#[derive(Debug)]
pub struct Report {
    errors: ValidationErrors,
    failed: BTreeSet<&'static str>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
            failed: BTreeSet::new(),
        }
    }

    /// Record `rule` for `field` unless the field already failed.
    pub fn fail(&mut self, field: &'static str, rule: Rule) {
        if self.failed.insert(field) {
            self.errors.add(
                field,
                ValidationError::new(rule.code()).with_message(rule.message(field).into()),
            );
        }
    }

    /// Unwrap a predicate result, recording the failure.
    pub fn check<T>(&mut self, field: &'static str, result: Result<T, Rule>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(rule) => {
                self.fail(field, rule);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Predicates
// ============================================================================

/// `null` and blank strings count as absent.
pub fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

pub fn required(value: Option<&Value>) -> Result<&Value, Rule> {
    present(value).ok_or(Rule::Required)
}

/// Run `parse` when the value is present.
pub fn optional<T>(
    value: Option<&Value>,
    parse: impl FnOnce(&Value) -> Result<T, Rule>,
) -> Result<Option<T>, Rule> {
    present(value).map(parse).transpose()
}

/// Trimmed string content
pub fn string(value: &Value) -> Result<String, Rule> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        _ => Err(Rule::String),
    }
}

pub fn max_chars(value: &str, max: usize) -> Result<(), Rule> {
    if value.chars().count() > max {
        Err(Rule::MaxChars(max))
    } else {
        Ok(())
    }
}

pub fn boolean(value: &Value) -> Result<bool, Rule> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(Rule::Boolean),
        },
        Value::String(s) => match s.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(Rule::Boolean),
        },
        _ => Err(Rule::Boolean),
    }
}

pub fn numeric(value: &Value) -> Result<f64, Rule> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).ok_or(Rule::Numeric)
}

pub fn min(value: f64, min: f64) -> Result<(), Rule> {
    if value < min { Err(Rule::Min(min)) } else { Ok(()) }
}

/// Integers that fit an id column
pub fn integer(value: &Value) -> Result<i32, Rule> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or(Rule::Integer),
        Value::String(s) => s.trim().parse::<i32>().map_err(|_| Rule::Integer),
        _ => Err(Rule::Integer),
    }
}

/// Image formats recognised by their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageKind::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else {
            None
        }
    }
}

/// File content is a JPEG, PNG or GIF.
pub fn image(file: &UploadedFile) -> Result<ImageKind, Rule> {
    ImageKind::sniff(&file.bytes).ok_or(Rule::Image)
}

/// File name carries one of [`IMAGE_EXTENSIONS`].
pub fn mimes(file: &UploadedFile) -> Result<(), Rule> {
    let extension = file
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(Rule::Mimes),
    }
}

pub fn max_kilobytes(file: &UploadedFile, max: usize) -> Result<(), Rule> {
    if file.size() > max * 1024 {
        Err(Rule::MaxKilobytes(max))
    } else {
        Ok(())
    }
}

// ============================================================================
// Field sets
// ============================================================================

fn name(value: Option<&Value>) -> Result<String, Rule> {
    let name = string(required(value)?)?;
    max_chars(&name, NAME_MAX_CHARS)?;
    Ok(name)
}

fn is_active(fields: &Map<String, Value>) -> Result<bool, Rule> {
    boolean(required(fields.get("is_active"))?)
}

/// Category fields that passed their shape checks
#[derive(Debug, Default)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl CategoryDraft {
    pub fn complete(self) -> Option<CategoryInput> {
        Some(CategoryInput {
            name: self.name?,
            is_active: self.is_active?,
        })
    }
}

pub fn category(fields: &Map<String, Value>, report: &mut Report) -> CategoryDraft {
    CategoryDraft {
        name: report.check("name", name(fields.get("name"))),
        is_active: report.check("is_active", is_active(fields)),
    }
}

/// The `is_active` flag of a status update
pub fn status(fields: &Map<String, Value>, report: &mut Report) -> Option<bool> {
    report.check("is_active", is_active(fields))
}

/// Product fields that passed their shape checks
#[derive(Debug, Default)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub category_id: Option<i32>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

impl ProductDraft {
    pub fn complete(self) -> Option<ProductInput> {
        Some(ProductInput {
            name: self.name?,
            category_id: self.category_id?,
            price: self.price?,
            is_active: self.is_active?,
        })
    }
}

/// Shape checks for a product body and its optional image.
///
/// A `category_id` that is not an integer cannot exist, so it fails `exists`.
pub fn product(
    fields: &Map<String, Value>,
    image_file: Option<&UploadedFile>,
    report: &mut Report,
) -> ProductDraft {
    let draft = ProductDraft {
        name: report.check("name", name(fields.get("name"))),
        category_id: report.check(
            "category_id",
            required(fields.get("category_id")).and_then(|v| integer(v).map_err(|_| Rule::Exists)),
        ),
        price: report.check(
            "price",
            required(fields.get("price")).and_then(numeric).and_then(|price| {
                min(price, 0.0)?;
                Ok(price)
            }),
        ),
        is_active: report.check("is_active", is_active(fields)),
    };

    match image_file {
        Some(file) => {
            let result = image(file)
                .and_then(|_| mimes(file))
                .and_then(|_| max_kilobytes(file, IMAGE_MAX_KILOBYTES));
            report.check("image", result);
        }
        // Non-file image values
        None if present(fields.get("image")).is_some() => report.fail("image", Rule::Image),
        None => {}
    }

    draft
}

/// Shape checks for the filtered product listing.
pub fn product_filter(fields: &Map<String, Value>, report: &mut Report) -> ProductFilter {
    let price_bound = |value: &Value| -> Result<f64, Rule> {
        let price = numeric(value)?;
        min(price, 0.0)?;
        Ok(price)
    };

    ProductFilter {
        search: report
            .check(
                "search",
                optional(fields.get("search"), |value| {
                    let search = string(value)?;
                    max_chars(&search, NAME_MAX_CHARS)?;
                    Ok(search)
                }),
            )
            .flatten(),
        category_id: report
            .check("category_id", optional(fields.get("category_id"), integer))
            .flatten(),
        min_price: report
            .check("min_price", optional(fields.get("min_price"), price_bound))
            .flatten(),
        max_price: report
            .check("max_price", optional(fields.get("max_price"), price_bound))
            .flatten(),
    }
}

/// `Some` when the query selects the paged listing (carries `page` or `limit`).
///
/// Unparseable values fall back to the defaults.
pub fn page_request(fields: &Map<String, Value>) -> Option<PageRequest> {
    if !fields.contains_key("page") && !fields.contains_key("limit") {
        return None;
    }

    let parse = |key: &str| {
        present(fields.get(key)).and_then(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    };

    Some(PageRequest::new(parse("page"), parse("limit")))
}
