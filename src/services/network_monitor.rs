// ============================================================================
// MONITOR DE ESTADO DE RED
// ============================================================================
// Traduce los eventos `online`/`offline` del navegador en transiciones del
// SyncController (vía callback). Los listeners pertenecen a `AppLifetime`.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Event;

use crate::dom::{window, AppLifetime};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NetworkStatus {
    Online,
    Offline,
    Unknown,
}

pub struct NetworkMonitor {
    status: Rc<Cell<NetworkStatus>>,
}

impl NetworkMonitor {
    pub fn new() -> Self {
        Self {
            status: Rc::new(Cell::new(Self::navigator_status())),
        }
    }

    /// `navigator.onLine` leído con js_sys (sin feature Navigator)
    fn navigator_status() -> NetworkStatus {
        let Some(win) = window() else {
            return NetworkStatus::Unknown;
        };
        js_sys::Reflect::get(&win, &JsValue::from_str("navigator"))
            .ok()
            .and_then(|nav| js_sys::Reflect::get(&nav, &JsValue::from_str("onLine")).ok())
            .and_then(|v| v.as_bool())
            .map(|online| if online { NetworkStatus::Online } else { NetworkStatus::Offline })
            .unwrap_or(NetworkStatus::Unknown)
    }

    /// Registra los listeners una sola vez, con dueño en `lifetime`
    pub fn start<F>(&self, lifetime: &AppLifetime, callback: F) -> Result<(), JsValue>
    where
        F: Fn(NetworkStatus) + 'static,
    {
        let win = window().ok_or_else(|| JsValue::from_str("No window"))?;
        let callback = Rc::new(callback);

        for (event_type, status) in [("online", NetworkStatus::Online), ("offline", NetworkStatus::Offline)] {
            let current = Rc::clone(&self.status);
            let callback = Rc::clone(&callback);
            lifetime.listen(&win, event_type, move |_event: Event| {
                match status {
                    NetworkStatus::Online => log::info!("🌐 Network: ONLINE"),
                    _ => log::warn!("📴 Network: OFFLINE"),
                }
                current.set(status);
                callback(status);
            })?;
        }

        log::info!("✅ NetworkMonitor: listeners registrados");
        Ok(())
    }

    pub fn current_status(&self) -> NetworkStatus {
        self.status.get()
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.current_status(), NetworkStatus::Offline)
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}
