// ============================================================================
// REMOTE STORE - Contrato con la base de datos realtime
// ============================================================================
// Esquema remoto: { "<id>": { campos sin id } } bajo una ruta fija.
// Las lecturas devuelven la colección completa; el push también.
// ============================================================================

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::product::Product;
use crate::state::product_cache::sort_products;

pub type SnapshotCallback = Rc<dyn Fn(Vec<Product>)>;
pub type ErrorCallback = Rc<dyn Fn(AppError)>;

/// Store remoto. Un solo hilo (WASM): los futures no son `Send`.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Colección completa. `StoreUnavailable` si no hay respuesta a tiempo.
    async fn read_all(&self) -> AppResult<Vec<Product>>;

    /// Upsert idempotente por id
    async fn write_one(&self, product: &Product) -> AppResult<()>;

    async fn delete_one(&self, id: &str) -> AppResult<()>;

    async fn remove_all(&self) -> AppResult<()>;

    /// Canal push de larga duración: cada cambio entrega la colección entera
    fn subscribe(&self, on_change: SnapshotCallback, on_error: ErrorCallback) -> AppResult<Subscription>;
}

/// Handle de una suscripción. Al hacer drop (o `cancel`) se libera el canal.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Decodifica un snapshot remoto. Los registros inválidos se descartan con
/// un warning; `null` es una colección vacía.
pub fn decode_snapshot(value: Value) -> Vec<Product> {
    let records = match value {
        Value::Null => return Vec::new(),
        Value::Object(records) => records,
        other => {
            log::warn!("⚠️ Snapshot remoto con forma inesperada: {}", type_name(&other));
            return Vec::new();
        }
    };

    let mut products: Vec<Product> = records
        .into_iter()
        .filter_map(|(id, record)| {
            let Value::Object(mut fields) = record else {
                log::warn!("⚠️ Registro {} descartado: no es un objeto", id);
                return None;
            };
            fields.insert("id".to_string(), Value::String(id.clone()));
            match serde_json::from_value::<Product>(Value::Object(fields)) {
                Ok(product) if product.name.trim().is_empty() => {
                    log::warn!("⚠️ Registro {} descartado: nombre vacío", id);
                    None
                }
                Ok(product) => Some(product),
                Err(e) => {
                    log::warn!("⚠️ Registro {} descartado: {}", id, e);
                    None
                }
            }
        })
        .collect();

    sort_products(&mut products);
    products
}

/// Cuerpo de escritura: el id es la clave del hijo, no se repite dentro
pub fn encode_record(product: &Product) -> AppResult<Value> {
    let mut value = serde_json::to_value(product).map_err(|e| AppError::WriteFailure {
        id: product.id.clone(),
        reason: e.to_string(),
    })?;
    if let Value::Object(fields) = &mut value {
        fields.remove("id");
    }
    Ok(value)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_null_snapshot_is_empty() {
        assert!(decode_snapshot(Value::Null).is_empty());
    }

    #[test]
    fn test_decode_uses_child_key_as_id_and_sorts() {
        let snapshot = json!({
            "k1": {
                "name": "Kettle", "brand": "Acme", "purchaseDate": "2024-06-01",
                "warrantyPeriod": 12, "price": 49.9,
                "createdAt": "2024-06-01T10:00:00.000Z", "updatedAt": "2024-06-01T10:00:00.000Z"
            },
            "k2": {
                "name": "Toaster", "purchaseDate": "2024-07-01",
                "createdAt": "2024-07-01T10:00:00Z", "updatedAt": "2024-07-02T10:00:00Z"
            }
        });
        let products = decode_snapshot(snapshot);
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["k2", "k1"]);
        assert_eq!(products[1].brand.as_deref(), Some("Acme"));
        assert_eq!(products[0].warranty_period, 0);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let snapshot = json!({
            "ok": {
                "name": "Kettle", "purchaseDate": "2024-06-01",
                "createdAt": "2024-06-01T10:00:00Z", "updatedAt": "2024-06-01T10:00:00Z"
            },
            "no-date": { "name": "Broken", "createdAt": "2024-06-01T10:00:00Z", "updatedAt": "2024-06-01T10:00:00Z" },
            "blank": {
                "name": "  ", "purchaseDate": "2024-06-01",
                "createdAt": "2024-06-01T10:00:00Z", "updatedAt": "2024-06-01T10:00:00Z"
            },
            "scalar": 42
        });
        let products = decode_snapshot(snapshot);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "ok");
    }

    #[test]
    fn test_encode_record_drops_id() {
        let snapshot = json!({
            "k1": {
                "name": "Kettle", "purchaseDate": "2024-06-01",
                "createdAt": "2024-06-01T10:00:00Z", "updatedAt": "2024-06-01T10:00:00Z"
            }
        });
        let product = decode_snapshot(snapshot).remove(0);
        let body = encode_record(&product).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["name"], "Kettle");
    }

    #[test]
    fn test_subscription_releases_once() {
        let released = Rc::new(Cell::new(0));
        let counter = Rc::clone(&released);
        let sub = Subscription::new(move || counter.set(counter.get() + 1));
        sub.cancel();
        assert_eq!(released.get(), 1);

        let counter = Rc::clone(&released);
        {
            let _sub = Subscription::new(move || counter.set(counter.get() + 1));
        }
        assert_eq!(released.get(), 2);
    }
}
