// ============================================================================
// ERRORES - Taxonomía de errores de la app
// ============================================================================
// Todo error se captura en el handler que inició la operación, se loguea y
// se traduce a una notificación no bloqueante.
// ============================================================================

use thiserror::Error;

use crate::models::notification::Notification;
use crate::models::product::FieldError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("a product with the same name, brand and model already exists")]
    Duplicate,

    #[error("product not found: {0}")]
    NotFound(String),

    #[error("remote store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("failed to save product {id}: {reason}")]
    WriteFailure { id: String, reason: String },

    #[error("failed to delete product {id}: {reason}")]
    DeleteFailure { id: String, reason: String },

    #[error("failed to clear products: {0}")]
    ClearFailure(String),

    #[error("invalid import file: {0}")]
    ImportFormat(String),

    #[error("local storage error: {0}")]
    Storage(String),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Traducción a aviso para el usuario
    pub fn to_notification(&self) -> Notification {
        match self {
            AppError::Validation(_) => {
                Notification::error("Product validation failed, please check the form.")
            }
            AppError::Duplicate => {
                Notification::warning("A similar product already exists, please check for duplicates")
            }
            AppError::NotFound(_) => Notification::error("Product does not exist"),
            AppError::StoreUnavailable(_) => {
                Notification::warning("Offline: changes will be synced when the connection returns")
            }
            AppError::WriteFailure { .. } => {
                Notification::error("Failed to save product, please try again")
            }
            AppError::DeleteFailure { .. } => {
                Notification::error("Failed to delete product, please try again")
            }
            AppError::ClearFailure(_) => {
                Notification::error("Failed to clear data, please try again")
            }
            AppError::ImportFormat(_) => {
                Notification::error("Import failed, please check the file format")
            }
            AppError::Storage(_) => Notification::error("Could not access local storage"),
        }
    }

    /// Error de conectividad (la operación puede reintentarse al reconectar)
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ImportFormat(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationKind;
    use crate::models::product::Field;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = AppError::Validation(vec![
            FieldError::new(Field::Name, "product name is required"),
            FieldError::new(Field::Price, "price must be a non-negative number"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: productName: product name is required, price: price must be a non-negative number"
        );
    }

    #[test]
    fn test_offline_is_a_warning_not_an_error() {
        let err = AppError::StoreUnavailable("timeout".into());
        assert!(err.is_unavailable());
        assert_eq!(err.to_notification().kind, NotificationKind::Warning);
        assert_eq!(
            AppError::ImportFormat("x".into()).to_notification().kind,
            NotificationKind::Error
        );
    }
}
