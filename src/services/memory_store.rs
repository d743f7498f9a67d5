// ============================================================================
// MEMORY STORE - RemoteStore en memoria para tests (inyección de fallos)
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use crate::error::{AppError, AppResult};
use crate::models::product::Product;
use crate::services::remote_store::{ErrorCallback, RemoteStore, SnapshotCallback, Subscription};
use crate::state::product_cache::sort_products;

#[derive(Default)]
struct Inner {
    records: BTreeMap<String, Product>,
    unreachable: bool,
    /// Operaciones de escritura que quedan antes de "perder la red"
    unreachable_after: Option<usize>,
    reject_ids: HashSet<String>,
    calls: Vec<String>,
    subscribers: Vec<(Rc<Cell<bool>>, SnapshotCallback)>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let store = Self::new();
        store
            .inner
            .borrow_mut()
            .records
            .extend(products.into_iter().map(|p| (p.id.clone(), p)));
        store
    }

    pub fn set_reachable(&self, reachable: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.unreachable = !reachable;
        inner.unreachable_after = None;
    }

    /// Acepta `n` escrituras más y luego se comporta como sin conexión
    pub fn go_offline_after(&self, n: usize) {
        self.inner.borrow_mut().unreachable_after = Some(n);
    }

    /// Las escrituras/borrados de este id fallarán con un error de store
    pub fn reject(&self, id: &str) {
        self.inner.borrow_mut().reject_ids.insert(id.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.borrow().records.keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Product> {
        self.inner.borrow().records.get(id).cloned()
    }

    /// Entrega la colección actual a todas las suscripciones activas
    pub fn push_snapshot(&self) {
        let (snapshot, subscribers) = {
            let inner = self.inner.borrow();
            let subscribers: Vec<SnapshotCallback> = inner
                .subscribers
                .iter()
                .filter(|(active, _)| active.get())
                .map(|(_, cb)| Rc::clone(cb))
                .collect();
            (self.snapshot(&inner), subscribers)
        };
        for callback in subscribers {
            callback(snapshot.clone());
        }
    }

    fn snapshot(&self, inner: &Inner) -> Vec<Product> {
        let mut products: Vec<Product> = inner.records.values().cloned().collect();
        sort_products(&mut products);
        products
    }

    fn gate(&self, call: String) -> AppResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(call);
        match inner.unreachable_after {
            Some(0) => {
                inner.unreachable = true;
                inner.unreachable_after = None;
            }
            Some(n) => inner.unreachable_after = Some(n - 1),
            None => {}
        }
        if inner.unreachable {
            Err(AppError::StoreUnavailable("memory store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryStore {
    async fn read_all(&self) -> AppResult<Vec<Product>> {
        let inner = self.inner.borrow();
        if inner.unreachable {
            return Err(AppError::StoreUnavailable("memory store offline".to_string()));
        }
        Ok(self.snapshot(&inner))
    }

    async fn write_one(&self, product: &Product) -> AppResult<()> {
        self.gate(format!("save:{}", product.id))?;
        let mut inner = self.inner.borrow_mut();
        if inner.reject_ids.contains(&product.id) {
            return Err(AppError::WriteFailure {
                id: product.id.clone(),
                reason: "permission denied".to_string(),
            });
        }
        inner.records.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn delete_one(&self, id: &str) -> AppResult<()> {
        self.gate(format!("delete:{}", id))?;
        let mut inner = self.inner.borrow_mut();
        if inner.reject_ids.contains(id) {
            return Err(AppError::DeleteFailure {
                id: id.to_string(),
                reason: "permission denied".to_string(),
            });
        }
        inner.records.remove(id);
        Ok(())
    }

    async fn remove_all(&self) -> AppResult<()> {
        self.gate("clear".to_string())?;
        self.inner.borrow_mut().records.clear();
        Ok(())
    }

    fn subscribe(&self, on_change: SnapshotCallback, _on_error: ErrorCallback) -> AppResult<Subscription> {
        let active = Rc::new(Cell::new(true));
        self.inner
            .borrow_mut()
            .subscribers
            .push((Rc::clone(&active), on_change));
        Ok(Subscription::new(move || active.set(false)))
    }
}

/// Producto de prueba con fechas fijas; `seq` ordena por createdAt
pub fn sample(id: &str, name: &str, seq: u32) -> Product {
    let t = Utc
        .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(seq as i64);
    Product {
        id: id.into(),
        name: name.into(),
        brand: None,
        model: None,
        category: None,
        serial_number: None,
        store: None,
        notes: None,
        purchase_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        warranty_period: 12,
        price: 0.0,
        created_at: t,
        updated_at: t,
    }
}
