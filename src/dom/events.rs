// ============================================================================
// EVENT HANDLING - Listeners con dueño + ciclo de vida de la app
// ============================================================================
// Nada de closure.forget() para listeners globales: cada listener vive en un
// `ListenerHandle` que lo desregistra en su Drop. `AppLifetime` es el dueño
// de todos ellos (más la suscripción push y el intervalo de limpieza) y los
// libera de una vez en `abort()` (evento `pagehide`).
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget};

use crate::services::remote_store::Subscription;

/// Listener registrado; se elimina del target al hacer drop
pub struct ListenerHandle {
    target: EventTarget,
    event_type: String,
    closure: Closure<dyn FnMut(Event)>,
}

impl ListenerHandle {
    pub fn new<F>(target: &EventTarget, event_type: &str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event_type: event_type.to_string(),
            closure,
        })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.event_type, self.closure.as_ref().unchecked_ref());
    }
}

/// Dueño de todos los recursos de larga duración de la app
#[derive(Default)]
pub struct AppLifetime {
    listeners: RefCell<Vec<ListenerHandle>>,
    subscription: RefCell<Option<Subscription>>,
    cleanup: RefCell<Option<Interval>>,
    aborted: Cell<bool>,
}

impl AppLifetime {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn listen<F>(&self, target: &EventTarget, event_type: &str, handler: F) -> Result<(), JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        if self.aborted.get() {
            return Ok(());
        }
        let handle = ListenerHandle::new(target, event_type, handler)?;
        self.listeners.borrow_mut().push(handle);
        Ok(())
    }

    pub fn hold_subscription(&self, subscription: Subscription) {
        if self.aborted.get() {
            subscription.cancel();
            return;
        }
        // La anterior (si existe) se cierra al reemplazarla
        *self.subscription.borrow_mut() = Some(subscription);
    }

    pub fn hold_interval(&self, interval: Interval) {
        if self.aborted.get() {
            drop(interval);
            return;
        }
        *self.cleanup.borrow_mut() = Some(interval);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Libera listeners, suscripción e intervalo. Idempotente.
    pub fn abort(&self) {
        if self.aborted.replace(true) {
            return;
        }
        let listeners: Vec<ListenerHandle> = self.listeners.borrow_mut().drain(..).collect();
        let count = listeners.len();
        drop(listeners);
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.cancel();
        }
        if let Some(interval) = self.cleanup.borrow_mut().take() {
            drop(interval);
        }
        log::info!("🔌 App liberada: {} listeners, suscripción e intervalo", count);
    }
}

// ============================================================================
// DEBOUNCE / THROTTLE
// ============================================================================

/// Solo se ejecuta la última llamada tras `delay_ms` sin llamadas nuevas
pub struct Debouncer {
    delay_ms: u32,
    pending: RefCell<Option<Timeout>>,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            pending: RefCell::new(None),
        }
    }

    pub fn call(&self, f: impl FnOnce() + 'static) {
        // Reemplazar el Timeout lo cancela
        *self.pending.borrow_mut() = Some(Timeout::new(self.delay_ms, f));
    }
}

/// Como mucho una ejecución por ventana de `interval_ms`
pub struct Throttle {
    interval_ms: u32,
    busy: Rc<Cell<bool>>,
    pending: RefCell<Option<Timeout>>,
}

impl Throttle {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            busy: Rc::new(Cell::new(false)),
            pending: RefCell::new(None),
        }
    }

    pub fn call(&self, f: impl FnOnce() + 'static) {
        if self.busy.replace(true) {
            return;
        }
        let busy = Rc::clone(&self.busy);
        *self.pending.borrow_mut() = Some(Timeout::new(self.interval_ms, move || {
            busy.set(false);
            f();
        }));
    }
}
