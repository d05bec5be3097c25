mod environment;
mod error;
mod extractors;
mod response;

pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
pub use extractors::{ValidatedJson, ValidatedQuery};
pub use response::Data;
