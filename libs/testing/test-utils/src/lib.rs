//! Shared test utilities for the catalog crates
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied (feature: "postgres")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `fixtures`: image bytes and multipart bodies for upload tests
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let name = builder.name("category", "main");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded random data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_category");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let name = builder.name("category", "main");
    /// assert!(name.starts_with("test-category-"));
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A positive price with two decimals, stable for a given seed.
    pub fn price(&self) -> f64 {
        ((self.seed % 100_000) as f64 + 1.0) / 100.0
    }
}

/// Byte fixtures for upload tests
pub mod fixtures {
    /// Smallest byte sequence recognised as PNG.
    pub fn png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(b"\0\0\0\rIHDR");
        bytes
    }

    pub fn jpeg_bytes() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
    }

    pub fn gif_bytes() -> Vec<u8> {
        b"GIF89a\x01\x00\x01\x00".to_vec()
    }

    /// Builder for `multipart/form-data` request bodies.
    ///
    /// ```
    /// use test_utils::fixtures::{MultipartBody, png_bytes};
    ///
    /// let body = MultipartBody::new()
    ///     .text("name", "Lamp")
    ///     .file("image", "lamp.png", "image/png", &png_bytes());
    /// assert!(body.content_type().starts_with("multipart/form-data; boundary="));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MultipartBody {
        boundary: String,
        body: Vec<u8>,
    }

    impl MultipartBody {
        pub fn new() -> Self {
            Self {
                boundary: "test-utils-boundary-7MA4YWxkTrZu0gW".to_string(),
                body: Vec::new(),
            }
        }

        pub fn text(mut self, name: &str, value: &str) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    self.boundary, name, value
                )
                .as_bytes(),
            );
            self
        }

        pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    self.boundary, name, file_name, content_type
                )
                .as_bytes(),
            );
            self.body.extend_from_slice(bytes);
            self.body.extend_from_slice(b"\r\n");
            self
        }

        pub fn content_type(&self) -> String {
            format!("multipart/form-data; boundary={}", self.boundary)
        }

        /// Close the body and return its bytes.
        pub fn finish(mut self) -> Vec<u8> {
            self.body
                .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
            self.body
        }
    }

    impl Default for MultipartBody {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert two prices are equal to the cent
    pub fn assert_price_eq(actual: f64, expected: f64, context: &str) {
        assert!(
            (actual - expected).abs() < 0.005,
            "{}: expected price {}, got {}",
            context,
            expected,
            actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.price(), builder2.price());
        assert_eq!(
            builder1.name("category", "test"),
            builder2.name("category", "test")
        );
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.name("p", "x"), builder2.name("p", "x"));
    }

    #[test]
    fn test_price_is_positive() {
        assert!(TestDataBuilder::new(0).price() > 0.0);
        assert!(TestDataBuilder::new(u64::MAX).price() > 0.0);
    }

    #[test]
    fn test_multipart_body_is_terminated() {
        let body = fixtures::MultipartBody::new().text("name", "Lamp").finish();
        let text = String::from_utf8(body).unwrap();
        assert!(text.ends_with("--\r\n"));
        assert!(text.contains("name=\"name\""));
    }
}
