// ============================================================================
// VIEWS - Funciones que pintan el DOM (sin lógica de negocio)
// ============================================================================

pub mod form;
pub mod header;
pub mod modal;
pub mod notification;
pub mod product_card;
pub mod product_list;
pub mod transfer;

pub use notification::notify;
pub use product_card::render_card;
pub use product_list::render_product_list;
