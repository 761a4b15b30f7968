pub mod error;
pub mod proforma;
pub mod time_value;
pub mod types;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "store")]
pub mod store;

pub use error::ProjectFinanceError;
pub use types::*;

/// Standard result type for all pro forma operations
pub type ProjectFinanceResult<T> = Result<T, ProjectFinanceError>;
