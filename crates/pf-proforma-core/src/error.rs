use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Not found: no {entity} for project_id={id}")]
    NotFound { entity: String, id: i64 },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ProjectFinanceError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ProjectFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        ProjectFinanceError::Overflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for ProjectFinanceError {
    fn from(e: serde_json::Error) -> Self {
        ProjectFinanceError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for ProjectFinanceError {
    fn from(e: std::io::Error) -> Self {
        ProjectFinanceError::Storage(e.to_string())
    }
}
