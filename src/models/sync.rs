use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::product::Product;

/// Estado de la conexión con el store remoto
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

// ============================================================================
// QUEUE DE OPERACIONES PENDIENTES (solo mientras no hay conexión)
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PendingOperation {
    Save { product: Product },
    Delete { product_id: String },
}

impl PendingOperation {
    /// Id del producto afectado
    pub fn product_id(&self) -> &str {
        match self {
            PendingOperation::Save { product } => &product.id,
            PendingOperation::Delete { product_id } => product_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PendingOperation::Save { .. } => "save",
            PendingOperation::Delete { .. } => "delete",
        }
    }
}

/// Resultado de una escritura desde el punto de vista del llamador
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Confirmada por el store remoto
    Applied,
    /// Encolada hasta que vuelva la conexión
    Queued,
}

/// Resumen de una pasada de vaciado de la queue
#[derive(Debug, Default)]
pub struct DrainReport {
    pub attempted: usize,
    pub applied: usize,
    /// Operaciones rechazadas por el store (no se reintentan)
    pub rejected: Vec<(PendingOperation, AppError)>,
    /// Operaciones devueltas a la queue porque se perdió la conexión
    pub requeued: usize,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.requeued == 0
    }
}
