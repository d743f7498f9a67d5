// ============================================================================
// PRODUCT REGISTRY PWA - FRONTEND MVVM (RUST PURO)
// ============================================================================
// Arquitectura MVVM:
// - Views: Funciones que renderizan DOM (sin lógica)
// - ViewModels: Registry de productos (validación + cache + sync)
// - Services: SOLO comunicación con el store remoto
// - State: Estado de UI y caches con Rc<RefCell>
// - Models: Tipos del dominio (producto, garantía, filtros, sync)
// ============================================================================

mod app;
mod config;
mod dom;
mod error;
mod models;
mod services;
mod state;
mod utils;
mod viewmodels;
mod views;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use wasm_logger::Config;

use crate::app::App;
use crate::config::CONFIG;

// Instancia viva de la app (no hay otro acceso global a ella)
thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Inicializar panic hook para mejor debugging
    console_error_panic_hook::set_once();

    let level = if CONFIG.is_logging_enabled() {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    wasm_logger::init(Config::new(level));
    log::info!("🚀 Product Registry - Rust Puro + MVVM");
    log::info!("🔧 Store: {} / {}", CONFIG.project_id, CONFIG.collection_path);

    let app = App::new(&CONFIG)?;
    APP.with(|cell| {
        *cell.borrow_mut() = Some(app.clone());
    });
    spawn_local(app.start());

    Ok(())
}

/// Libera listeners, suscripción e intervalo (llamable desde JavaScript)
#[wasm_bindgen]
pub fn shutdown_app() {
    APP.with(|cell| {
        if let Some(app) = cell.borrow_mut().take() {
            app.lifetime().abort();
        }
    });
}
