// ============================================================================
// STATE MODULE - State Management con Rc<RefCell> + notificaciones
// ============================================================================

pub mod app_state;
pub mod product_cache;
pub mod render_cache;

pub use app_state::AppState;
pub use product_cache::ProductCache;
pub use render_cache::{RenderCache, RenderKey};
