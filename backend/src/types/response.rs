//! Success envelope shared by all API responses

use schemars::JsonSchema;
use serde::Serialize;

/// Wraps every successful payload under a `data` key
#[derive(Debug, Serialize, JsonSchema)]
pub struct Data<T> {
    /// The response payload
    pub data: T,
}

impl<T> Data<T> {
    /// Wraps a payload in the success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}
