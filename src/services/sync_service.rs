// ============================================================================
// SYNC CONTROLLER - Conexión con el store + queue de operaciones pendientes
// ============================================================================
// Disconnected → Connecting → Connected (y vuelta a Disconnected al perder red)
// - Sin conexión: save/delete se encolan y devuelven `Queued`
// - Al conectar: lectura completa, reconciliación y vaciado FIFO de la queue
// - Un rechazo del store no bloquea al resto y queda en el `DrainReport`
// - Perder la conexión a mitad de vaciado deja el resto en la queue
// - Durante el vaciado las escrituras nuevas van detrás en la queue
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{AppError, AppResult};
use crate::models::product::Product;
use crate::models::sync::{ConnectionState, DrainReport, PendingOperation, WriteOutcome};
use crate::services::remote_store::{ErrorCallback, RemoteStore, Subscription};
use crate::state::product_cache::{sort_products, ProductCache};

/// Resultado de `connect()`
#[derive(Debug, Default)]
pub struct ConnectOutcome {
    /// La colección local cambió con la lectura inicial
    pub changed: bool,
    pub drain: DrainReport,
}

pub struct SyncController<S, F> {
    store: Rc<S>,
    cache: Rc<RefCell<ProductCache<F>>>,
    state: Rc<Cell<ConnectionState>>,
    queue: Rc<RefCell<VecDeque<PendingOperation>>>,
    /// Hay un vaciado en curso: la queue es la única vía de escritura
    draining: Rc<Cell<bool>>,
}

impl<S, F> Clone for SyncController<S, F> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            cache: Rc::clone(&self.cache),
            state: Rc::clone(&self.state),
            queue: Rc::clone(&self.queue),
            draining: Rc::clone(&self.draining),
        }
    }
}

impl<S, F> SyncController<S, F>
where
    S: RemoteStore + 'static,
    F: Clone + 'static,
{
    pub fn new(store: Rc<S>, cache: Rc<RefCell<ProductCache<F>>>) -> Self {
        Self {
            store,
            cache,
            state: Rc::new(Cell::new(ConnectionState::Disconnected)),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            draining: Rc::new(Cell::new(false)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn pending_operations(&self) -> Vec<PendingOperation> {
        self.queue.borrow().iter().cloned().collect()
    }

    pub fn set_disconnected(&self) {
        if self.state.get() != ConnectionState::Disconnected {
            log::warn!("📴 Store desconectado ({} operaciones pendientes)", self.pending_count());
        }
        self.state.set(ConnectionState::Disconnected);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    /// Escritura directa solo con conexión y sin vaciado en curso;
    /// si no, una op anterior de la queue podría pisarla en el remoto.
    fn writes_directly(&self) -> bool {
        self.state.get().is_connected() && !self.draining.get()
    }

    fn enqueue(&self, op: PendingOperation) {
        log::info!("📥 Operación encolada: {} {}", op.kind(), op.product_id());
        self.queue.borrow_mut().push_back(op);
    }

    // ==========================================
    // ESCRITURAS
    // ==========================================

    pub async fn save(&self, product: Product) -> AppResult<WriteOutcome> {
        if !self.writes_directly() {
            self.enqueue(PendingOperation::Save { product });
            return Ok(WriteOutcome::Queued);
        }

        match self.store.write_one(&product).await {
            Ok(()) => Ok(WriteOutcome::Applied),
            Err(e) if e.is_unavailable() => {
                log::warn!("⚠️ Guardado de {} sin conexión: {}", product.id, e);
                self.set_disconnected();
                self.enqueue(PendingOperation::Save { product });
                Ok(WriteOutcome::Queued)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, product_id: &str) -> AppResult<WriteOutcome> {
        let op = PendingOperation::Delete {
            product_id: product_id.to_string(),
        };
        if !self.writes_directly() {
            self.enqueue(op);
            return Ok(WriteOutcome::Queued);
        }

        match self.store.delete_one(product_id).await {
            Ok(()) => Ok(WriteOutcome::Applied),
            Err(e) if e.is_unavailable() => {
                log::warn!("⚠️ Borrado de {} sin conexión: {}", product_id, e);
                self.set_disconnected();
                self.enqueue(op);
                Ok(WriteOutcome::Queued)
            }
            Err(e) => Err(e),
        }
    }

    /// Borrado remoto completo. Solo con conexión y sin vaciado en curso;
    /// no se encola.
    pub async fn clear_all(&self) -> AppResult<()> {
        if !self.state.get().is_connected() {
            return Err(AppError::StoreUnavailable("not connected".to_string()));
        }
        if self.draining.get() {
            return Err(AppError::StoreUnavailable("offline changes are still syncing".to_string()));
        }
        if let Err(e) = self.store.remove_all().await {
            if e.is_unavailable() {
                self.set_disconnected();
            }
            return Err(e);
        }
        self.queue.borrow_mut().clear();
        Ok(())
    }

    // ==========================================
    // CONEXIÓN Y VACIADO DE LA QUEUE
    // ==========================================

    pub async fn connect(&self) -> AppResult<ConnectOutcome> {
        if self.state.get() == ConnectionState::Connecting {
            log::debug!("⏳ Conexión ya en curso");
            return Ok(ConnectOutcome::default());
        }

        log::info!("🔌 Conectando con el store...");
        self.state.set(ConnectionState::Connecting);

        match self.store.read_all().await {
            Ok(products) => {
                self.state.set(ConnectionState::Connected);
                log::info!("✅ Conectado ({} productos remotos)", products.len());
                let changed = self.on_snapshot(products);
                let drain = self.drain().await;
                Ok(ConnectOutcome { changed, drain })
            }
            Err(e) => {
                log::error!("❌ No se pudo conectar: {}", e);
                self.state.set(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Una pasada FIFO sobre la queue. Cada op sigue en la queue mientras
    /// está en vuelo y solo sale al resolverse; lo encolado durante la
    /// pasada va detrás y entra en la misma pasada.
    pub async fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();
        if self.draining.replace(true) {
            log::debug!("⏳ Vaciado ya en curso");
            return report;
        }
        if !self.queue.borrow().is_empty() {
            log::info!("🔄 Vaciando queue: {} operaciones", self.pending_count());
        }

        loop {
            let Some(op) = self.queue.borrow().front().cloned() else {
                break;
            };
            report.attempted += 1;
            let result = match &op {
                PendingOperation::Save { product } => self.store.write_one(product).await,
                PendingOperation::Delete { product_id } => self.store.delete_one(product_id).await,
            };

            match result {
                Ok(()) => {
                    self.queue.borrow_mut().pop_front();
                    report.applied += 1;
                }
                Err(e) if e.is_unavailable() => {
                    report.requeued = self.pending_count();
                    log::warn!("📴 Conexión perdida vaciando la queue, {} pendientes", report.requeued);
                    self.draining.set(false);
                    self.set_disconnected();
                    return report;
                }
                Err(e) => {
                    self.queue.borrow_mut().pop_front();
                    log::error!("❌ Operación {} {} rechazada: {}", op.kind(), op.product_id(), e);
                    report.rejected.push((op, e));
                }
            }
        }

        self.draining.set(false);
        if report.attempted > 0 {
            log::info!(
                "✅ Queue vaciada: {} aplicadas, {} rechazadas",
                report.applied,
                report.rejected.len()
            );
        }
        report
    }

    // ==========================================
    // RECONCILIACIÓN
    // ==========================================

    /// Aplica un snapshot remoto. Devuelve `true` si la colección local cambió.
    /// Las operaciones aún en la queue se superponen al snapshot.
    pub fn on_snapshot(&self, mut products: Vec<Product>) -> bool {
        for op in self.queue.borrow().iter() {
            match op {
                PendingOperation::Save { product } => {
                    match products.iter_mut().find(|p| p.id == product.id) {
                        Some(existing) => *existing = product.clone(),
                        None => products.push(product.clone()),
                    }
                }
                PendingOperation::Delete { product_id } => products.retain(|p| &p.id != product_id),
            }
        }
        sort_products(&mut products);

        let mut cache = self.cache.borrow_mut();
        if cache.products() == products.as_slice() {
            log::debug!("🔁 Snapshot sin cambios");
            return false;
        }
        log::info!("📡 Snapshot aplicado: {} productos", products.len());
        cache.replace_all(products);
        true
    }

    /// Suscripción push. `on_update` recibe si la colección local cambió.
    pub fn subscribe(&self, on_update: Rc<dyn Fn(bool)>, on_error: ErrorCallback) -> AppResult<Subscription> {
        let controller = self.clone();
        let on_change = Rc::new(move |products: Vec<Product>| {
            let changed = controller.on_snapshot(products);
            on_update(changed);
        });

        let controller = self.clone();
        let on_stream_error = Rc::new(move |e: AppError| {
            if e.is_unavailable() {
                controller.set_disconnected();
            }
            on_error(e);
        });

        self.store.subscribe(on_change, on_stream_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory_store::{sample, MemoryStore};
    use crate::services::remote_store::SnapshotCallback;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use futures::join;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    fn controller(store: &MemoryStore) -> SyncController<MemoryStore, String> {
        let cache = Rc::new(RefCell::new(ProductCache::new(0)));
        SyncController::new(Rc::new(store.clone()), cache)
    }

    #[test]
    fn test_writes_are_queued_while_disconnected() {
        let store = MemoryStore::new();
        let sync = controller(&store);

        let outcome = block_on(sync.save(sample("a", "Kettle", 1))).unwrap();
        assert_eq!(outcome, WriteOutcome::Queued);
        assert_eq!(block_on(sync.delete("b")).unwrap(), WriteOutcome::Queued);
        assert_eq!(sync.pending_count(), 2);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_connect_drains_fifo_and_empties_queue() {
        let store = MemoryStore::new();
        let sync = controller(&store);
        block_on(sync.save(sample("a", "Kettle", 1))).unwrap();
        block_on(sync.save(sample("b", "Toaster", 2))).unwrap();
        block_on(sync.delete("a")).unwrap();

        let outcome = block_on(sync.connect()).unwrap();
        assert_eq!(sync.state(), ConnectionState::Connected);
        assert_eq!(store.calls(), vec!["save:a", "save:b", "delete:a"]);
        assert_eq!(outcome.drain.applied, 3);
        assert!(outcome.drain.is_clean());
        assert_eq!(sync.pending_count(), 0);
        assert_eq!(store.ids(), vec!["b".to_string()]);
    }

    #[test]
    fn test_rejected_second_op_does_not_block_third() {
        let store = MemoryStore::new();
        store.reject("b");
        let sync = controller(&store);
        for (id, seq) in [("a", 1), ("b", 2), ("c", 3)] {
            block_on(sync.save(sample(id, "Item", seq))).unwrap();
        }

        let report = block_on(sync.connect()).unwrap().drain;
        assert_eq!(store.calls(), vec!["save:a", "save:b", "save:c"]);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.applied, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0.product_id(), "b");
        assert_eq!(sync.pending_count(), 0);
        assert_eq!(store.ids(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_connection_lost_mid_drain_requeues_in_order() {
        let store = MemoryStore::new();
        let sync = controller(&store);
        for (id, seq) in [("a", 1), ("b", 2), ("c", 3)] {
            block_on(sync.save(sample(id, "Item", seq))).unwrap();
        }

        store.go_offline_after(1);
        let report = block_on(sync.connect()).unwrap().drain;
        assert_eq!(report.applied, 1);
        assert_eq!(report.requeued, 2);
        assert_eq!(sync.state(), ConnectionState::Disconnected);
        let pending: Vec<String> = sync
            .pending_operations()
            .iter()
            .map(|op| op.product_id().to_string())
            .collect();
        assert_eq!(pending, vec!["b", "c"]);

        store.set_reachable(true);
        let report = block_on(sync.connect()).unwrap().drain;
        assert_eq!(report.applied, 2);
        assert_eq!(store.ids().len(), 3);
    }

    #[test]
    fn test_connect_failure_falls_back_to_disconnected() {
        let store = MemoryStore::new();
        store.set_reachable(false);
        let sync = controller(&store);
        let err = block_on(sync.connect()).unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(sync.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_unavailable_write_while_connected_is_queued() {
        let store = MemoryStore::new();
        let sync = controller(&store);
        block_on(sync.connect()).unwrap();

        store.set_reachable(false);
        let outcome = block_on(sync.save(sample("a", "Kettle", 1))).unwrap();
        assert_eq!(outcome, WriteOutcome::Queued);
        assert_eq!(sync.state(), ConnectionState::Disconnected);
        assert_eq!(sync.pending_count(), 1);
    }

    #[test]
    fn test_clear_all_requires_connection() {
        let store = MemoryStore::with_products(vec![sample("a", "Kettle", 1)]);
        let sync = controller(&store);
        assert!(block_on(sync.clear_all()).unwrap_err().is_unavailable());

        block_on(sync.connect()).unwrap();
        block_on(sync.clear_all()).unwrap();
        assert!(store.ids().is_empty());
    }

    #[test]
    fn test_echo_snapshot_is_a_no_op() {
        let store = MemoryStore::with_products(vec![sample("a", "Kettle", 1), sample("b", "Toaster", 2)]);
        let sync = controller(&store);
        assert!(block_on(sync.connect()).unwrap().changed);

        let updates = Rc::new(Cell::new(0));
        let counter = Rc::clone(&updates);
        let _sub = sync
            .subscribe(
                Rc::new(move |changed: bool| {
                    if changed {
                        counter.set(counter.get() + 1);
                    }
                }),
                Rc::new(|_: AppError| {}),
            )
            .unwrap();

        store.push_snapshot();
        assert_eq!(updates.get(), 0);

        block_on(store.write_one(&sample("c", "Blender", 3))).unwrap();
        store.push_snapshot();
        assert_eq!(updates.get(), 1);
        assert_eq!(sync.cache.borrow().len(), 3);
    }

    /// Cede el turno una vez antes de resolver
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                return Poll::Ready(());
            }
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    /// Store cuyas escrituras tardan un turno del executor
    struct YieldingStore(MemoryStore);

    #[async_trait(?Send)]
    impl RemoteStore for YieldingStore {
        async fn read_all(&self) -> AppResult<Vec<Product>> {
            self.0.read_all().await
        }

        async fn write_one(&self, product: &Product) -> AppResult<()> {
            YieldOnce(false).await;
            self.0.write_one(product).await
        }

        async fn delete_one(&self, id: &str) -> AppResult<()> {
            YieldOnce(false).await;
            self.0.delete_one(id).await
        }

        async fn remove_all(&self) -> AppResult<()> {
            self.0.remove_all().await
        }

        fn subscribe(&self, on_change: SnapshotCallback, on_error: ErrorCallback) -> AppResult<Subscription> {
            self.0.subscribe(on_change, on_error)
        }
    }

    fn yielding_controller(store: &MemoryStore) -> SyncController<YieldingStore, String> {
        let cache = Rc::new(RefCell::new(ProductCache::new(0)));
        SyncController::new(Rc::new(YieldingStore(store.clone())), cache)
    }

    #[test]
    fn test_save_during_drain_lands_after_queued_version() {
        let store = MemoryStore::new();
        let sync = yielding_controller(&store);
        block_on(sync.save(sample("x", "Toaster", 1))).unwrap();
        block_on(sync.save(sample("a", "Kettle v1", 2))).unwrap();

        let (outcome, saved) = block_on(async { join!(sync.connect(), sync.save(sample("a", "Kettle v2", 2))) });
        assert_eq!(saved.unwrap(), WriteOutcome::Queued);
        let drain = outcome.unwrap().drain;
        assert_eq!(drain.applied, 3);
        assert_eq!(store.calls(), vec!["save:x", "save:a", "save:a"]);
        assert_eq!(store.get("a").unwrap().name, "Kettle v2");
        assert_eq!(sync.pending_count(), 0);
        assert!(!sync.is_draining());
    }

    #[test]
    fn test_clear_all_is_refused_while_draining() {
        let store = MemoryStore::new();
        let sync = yielding_controller(&store);
        block_on(sync.save(sample("a", "Kettle", 1))).unwrap();

        let (outcome, cleared) = block_on(async { join!(sync.connect(), sync.clear_all()) });
        assert!(cleared.unwrap_err().is_unavailable());
        assert_eq!(outcome.unwrap().drain.applied, 1);
        assert_eq!(store.ids(), vec!["a".to_string()]);
        assert!(!store.calls().contains(&"clear".to_string()));
    }

    #[test]
    fn test_in_flight_op_is_overlaid_on_snapshots() {
        let store = MemoryStore::with_products(vec![sample("a", "Kettle", 1)]);
        let sync = yielding_controller(&store);
        block_on(sync.save(sample("b", "Toaster", 2))).unwrap();

        // Llega un snapshot viejo (sin "b") mientras "b" está en vuelo
        let stale = async {
            YieldOnce(false).await;
            sync.on_snapshot(vec![sample("a", "Kettle", 1)]);
            sync.cache.borrow().len()
        };
        let (seen, outcome) = block_on(async { join!(stale, sync.connect()) });
        assert_eq!(seen, 2);
        assert_eq!(outcome.unwrap().drain.applied, 1);
    }

    #[test]
    fn test_pending_ops_survive_reconciliation() {
        let store = MemoryStore::with_products(vec![sample("a", "Kettle", 1)]);
        let sync = controller(&store);
        block_on(sync.save(sample("b", "Toaster", 2))).unwrap();
        assert!(sync.on_snapshot(block_on(store.read_all()).unwrap()));
        let ids: Vec<String> = sync.cache.borrow().products().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
