// ============================================================================
// FIREBASE STORE - Adaptador REST + streaming (SSE) de Realtime Database
// ============================================================================
// SOLO comunicación: sin lógica de negocio. Lecturas con timeout acotado,
// escrituras por hijo, push vía EventSource (`text/event-stream`).
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::{select, Either};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, EventSource, MessageEvent};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::product::{is_store_key, Product};
use crate::services::remote_store::{
    decode_snapshot, encode_record, ErrorCallback, RemoteStore, SnapshotCallback, Subscription,
};

/// Eventos del stream REST de Firebase que implican un cambio de datos
const CHANGE_EVENTS: [&str; 2] = ["put", "patch"];

#[derive(Clone)]
pub struct FirebaseStore {
    config: AppConfig,
    /// true tras la primera lectura completa; antes se ignoran los eventos push
    ready: Rc<Cell<bool>>,
}

impl FirebaseStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ready: Rc::new(Cell::new(false)),
        }
    }

    async fn fetch_snapshot(&self) -> AppResult<Value> {
        let url = self.config.collection_url(None);
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Network error: {}", e)))?;

        if !response.ok() {
            return Err(AppError::StoreUnavailable(http_error(&response)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Parse error: {}", e)))
    }
}

fn http_error(response: &Response) -> String {
    format!("HTTP {}: {}", response.status(), response.status_text())
}

#[async_trait(?Send)]
impl RemoteStore for FirebaseStore {
    async fn read_all(&self) -> AppResult<Vec<Product>> {
        log::info!("📥 Leyendo colección '{}'...", self.config.collection_path);

        let fetch = Box::pin(self.fetch_snapshot());
        let timeout = Box::pin(TimeoutFuture::new(self.config.connect_timeout_ms()));

        match select(fetch, timeout).await {
            Either::Left((result, _)) => {
                let products = decode_snapshot(result?);
                self.ready.set(true);
                log::info!("✅ Colección leída: {} productos", products.len());
                Ok(products)
            }
            Either::Right(_) => {
                log::error!(
                    "❌ Sin respuesta del store en {}s",
                    self.config.connect_timeout_seconds
                );
                Err(AppError::StoreUnavailable(format!(
                    "no response within {}s",
                    self.config.connect_timeout_seconds
                )))
            }
        }
    }

    async fn write_one(&self, product: &Product) -> AppResult<()> {
        if !is_store_key(&product.id) {
            return Err(AppError::WriteFailure {
                id: product.id.clone(),
                reason: "id is not a valid store key".to_string(),
            });
        }
        let url = self.config.collection_url(Some(&product.id));
        let body = encode_record(product)?;

        let response = Request::put(&url)
            .json(&body)
            .map_err(|e| AppError::WriteFailure {
                id: product.id.clone(),
                reason: format!("Request build error: {}", e),
            })?
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Network error: {}", e)))?;

        if !response.ok() {
            return Err(AppError::WriteFailure {
                id: product.id.clone(),
                reason: http_error(&response),
            });
        }

        log::info!("💾 Producto guardado: {}", product.id);
        Ok(())
    }

    async fn delete_one(&self, id: &str) -> AppResult<()> {
        let url = self.config.collection_url(Some(id));
        let response = Request::delete(&url)
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Network error: {}", e)))?;

        if !response.ok() {
            return Err(AppError::DeleteFailure {
                id: id.to_string(),
                reason: http_error(&response),
            });
        }

        log::info!("🗑️ Producto eliminado: {}", id);
        Ok(())
    }

    async fn remove_all(&self) -> AppResult<()> {
        let url = self.config.collection_url(None);
        let response = Request::delete(&url)
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Network error: {}", e)))?;

        if !response.ok() {
            return Err(AppError::ClearFailure(http_error(&response)));
        }

        log::info!("🗑️ Colección '{}' vaciada", self.config.collection_path);
        Ok(())
    }

    fn subscribe(&self, on_change: SnapshotCallback, on_error: ErrorCallback) -> AppResult<Subscription> {
        let url = self.config.collection_url(None);
        let source = EventSource::new(&url)
            .map_err(|e| AppError::StoreUnavailable(format!("EventSource error: {:?}", e)))?;

        // Cada evento de cambio dispara una relectura completa: el callback
        // siempre recibe la colección entera, nunca un diff.
        let on_message = {
            let store = self.clone();
            let on_error = Rc::clone(&on_error);
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                if !store.ready.get() {
                    log::debug!("⏳ Evento '{}' antes de la carga inicial, ignorado", event.type_());
                    return;
                }
                let store = store.clone();
                let on_change = Rc::clone(&on_change);
                let on_error = Rc::clone(&on_error);
                spawn_local(async move {
                    match store.read_all().await {
                        Ok(products) => on_change(products),
                        Err(e) => on_error(e),
                    }
                });
            })
        };

        for name in CHANGE_EVENTS {
            source
                .add_event_listener_with_callback(name, on_message.as_ref().unchecked_ref())
                .map_err(|e| AppError::StoreUnavailable(format!("listener error: {:?}", e)))?;
        }

        let on_stream_error = {
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                log::warn!("📴 Stream del store interrumpido");
                on_error(AppError::StoreUnavailable("push stream interrupted".to_string()));
            })
        };
        source.set_onerror(Some(on_stream_error.as_ref().unchecked_ref()));

        log::info!("📡 Suscripción push abierta");

        Ok(Subscription::new(move || {
            source.close();
            source.set_onerror(None);
            drop(on_message);
            drop(on_stream_error);
            log::info!("🔌 Suscripción push cerrada");
        }))
    }
}
