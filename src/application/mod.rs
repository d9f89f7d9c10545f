//! Application layer: services and use cases
//!
//! This layer wraps the domain tree for callers that share it.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
