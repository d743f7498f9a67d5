// ============================================================================
// VIEWMODELS - Estado + lógica de casos de uso (sin DOM)
// ============================================================================

pub mod registry_viewmodel;

pub use registry_viewmodel::{ImportReport, ProductRegistry};
