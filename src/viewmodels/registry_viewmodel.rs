// ============================================================================
// REGISTRY VIEWMODEL - Casos de uso del registro de productos
// ============================================================================
// Instancia explícita (sin singleton): la crea `App` y los handlers capturan
// clones. Cambios optimistas en la caché local; si el store rechaza la
// escritura se deshacen.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{AppError, AppResult};
use crate::models::filter::FilterCriteria;
use crate::models::product::{Product, ProductForm};
use crate::models::sync::WriteOutcome;
use crate::services::remote_store::RemoteStore;
use crate::services::sync_service::{ConnectOutcome, SyncController};
use crate::services::transfer_service;
use crate::state::product_cache::ProductCache;
use crate::utils::id::generate_id;
use crate::utils::time::Now;

/// Resultado de una importación
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub queued: usize,
    pub failed: Vec<(String, AppError)>,
}

pub struct ProductRegistry<S, F> {
    cache: Rc<RefCell<ProductCache<F>>>,
    sync: SyncController<S, F>,
}

impl<S, F> Clone for ProductRegistry<S, F> {
    fn clone(&self) -> Self {
        Self {
            cache: Rc::clone(&self.cache),
            sync: self.sync.clone(),
        }
    }
}

impl<S, F> ProductRegistry<S, F>
where
    S: RemoteStore + 'static,
    F: Clone + 'static,
{
    pub fn new(store: S, now_ms: i64) -> Self {
        let cache = Rc::new(RefCell::new(ProductCache::new(now_ms)));
        let sync = SyncController::new(Rc::new(store), Rc::clone(&cache));
        Self { cache, sync }
    }

    pub fn sync(&self) -> &SyncController<S, F> {
        &self.sync
    }

    pub fn cache(&self) -> Rc<RefCell<ProductCache<F>>> {
        Rc::clone(&self.cache)
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn find(&self, id: &str) -> Option<Product> {
        self.cache.borrow().find(id).cloned()
    }

    pub fn categories(&self) -> Vec<String> {
        self.cache.borrow().categories()
    }

    pub fn filtered(&self, criteria: &FilterCriteria, now: NaiveDateTime) -> Rc<Vec<Product>> {
        self.cache.borrow_mut().apply_criteria(criteria, now)
    }

    pub async fn connect(&self) -> AppResult<ConnectOutcome> {
        self.sync.connect().await
    }

    // ==========================================
    // ALTA / EDICIÓN / BORRADO
    // ==========================================

    pub async fn add_product(&self, form: &ProductForm, now: &Now) -> AppResult<(Product, WriteOutcome)> {
        let draft = form.validate(now.today()).map_err(AppError::Validation)?;

        let duplicate = self.cache.borrow().is_duplicate(
            &draft.name,
            draft.brand.as_deref(),
            draft.model.as_deref(),
            None,
        );
        if duplicate {
            log::warn!("⚠️ Producto duplicado: {}", draft.name);
            return Err(AppError::Duplicate);
        }

        let product = Product::create(generate_id(now.utc), draft, now.utc);
        self.cache.borrow_mut().upsert(product.clone());

        match self.sync.save(product.clone()).await {
            Ok(outcome) => {
                log::info!("✅ Producto añadido: {} ({:?})", product.name, outcome);
                Ok((product, outcome))
            }
            Err(e) => {
                self.cache.borrow_mut().remove(&product.id);
                Err(e)
            }
        }
    }

    pub async fn update_product(
        &self,
        id: &str,
        form: &ProductForm,
        now: &Now,
    ) -> AppResult<(Product, WriteOutcome)> {
        let existing = self.find(id).ok_or_else(|| AppError::NotFound(id.to_string()))?;
        let draft = form.validate(now.today()).map_err(AppError::Validation)?;

        let updated = existing.apply(draft, now.utc);
        self.cache.borrow_mut().upsert(updated.clone());

        match self.sync.save(updated.clone()).await {
            Ok(outcome) => {
                log::info!("✅ Producto actualizado: {}", updated.id);
                Ok((updated, outcome))
            }
            Err(e) => {
                self.cache.borrow_mut().upsert(existing);
                Err(e)
            }
        }
    }

    pub async fn delete_product(&self, id: &str) -> AppResult<WriteOutcome> {
        let removed = self
            .cache
            .borrow_mut()
            .remove(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        match self.sync.delete(id).await {
            Ok(outcome) => {
                log::info!("🗑️ Producto eliminado: {}", id);
                Ok(outcome)
            }
            Err(e) => {
                self.cache.borrow_mut().upsert(removed);
                Err(e)
            }
        }
    }

    pub async fn clear_all(&self) -> AppResult<()> {
        self.sync.clear_all().await?;
        self.cache.borrow_mut().replace_all(Vec::new());
        log::info!("🗑️ Registro vaciado");
        Ok(())
    }

    // ==========================================
    // IMPORT / EXPORT
    // ==========================================

    pub fn export_json(&self) -> AppResult<String> {
        transfer_service::export_json(self.cache.borrow().products())
    }

    pub fn export_filename(&self, date: NaiveDate) -> String {
        transfer_service::export_filename(date)
    }

    /// Nada se escribe si algún elemento del archivo es inválido
    pub async fn import_json(&self, text: &str, now: &Now) -> AppResult<ImportReport> {
        let products = transfer_service::parse_import(text, now.utc, now.today())?;
        log::info!("📥 Importando {} productos", products.len());

        let mut report = ImportReport::default();
        for product in products {
            let previous = self.find(&product.id);
            self.cache.borrow_mut().upsert(product.clone());

            match self.sync.save(product.clone()).await {
                Ok(WriteOutcome::Applied) => report.imported += 1,
                Ok(WriteOutcome::Queued) => {
                    report.imported += 1;
                    report.queued += 1;
                }
                Err(e) => {
                    log::error!("❌ Importación de {} rechazada: {}", product.id, e);
                    let mut cache = self.cache.borrow_mut();
                    match previous {
                        Some(previous) => cache.upsert(previous),
                        None => {
                            cache.remove(&product.id);
                        }
                    }
                    report.failed.push((product.id, e));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::warranty::{self, WarrantyStatus};
    use crate::services::memory_store::{sample, MemoryStore};
    use chrono::{TimeZone, Utc};
    use futures::executor::block_on;

    fn now() -> Now {
        Now {
            utc: Utc.with_ymd_and_hms(2025, 5, 20, 2, 0, 0).unwrap(),
            local: NaiveDate::from_ymd_opt(2025, 5, 20)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    fn kettle_form() -> ProductForm {
        ProductForm {
            name: "Kettle".into(),
            brand: "Acme".into(),
            purchase_date: "2024-06-01".into(),
            warranty_period: "12".into(),
            price: "49.90".into(),
            ..Default::default()
        }
    }

    fn connected(store: &MemoryStore) -> ProductRegistry<MemoryStore, String> {
        let registry = ProductRegistry::new(store.clone(), 0);
        block_on(registry.connect()).unwrap();
        registry
    }

    #[test]
    fn test_add_kettle_is_saved_and_expiring() {
        let store = MemoryStore::new();
        let registry = connected(&store);

        let (product, outcome) = block_on(registry.add_product(&kettle_form(), &now())).unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);
        assert_eq!(store.get(&product.id), Some(product.clone()));
        assert_eq!(registry.len(), 1);

        let info = warranty::compute(product.purchase_date, product.warranty_period as i64, now().local);
        assert_eq!(info.status, WarrantyStatus::Expiring);
        assert_eq!(info.text, "12 days until expiry");
    }

    #[test]
    fn test_duplicate_and_invalid_forms_write_nothing() {
        let store = MemoryStore::new();
        let registry = connected(&store);
        block_on(registry.add_product(&kettle_form(), &now())).unwrap();

        let mut again = kettle_form();
        again.name = "  KETTLE ".into();
        assert_eq!(block_on(registry.add_product(&again, &now())).unwrap_err(), AppError::Duplicate);

        let invalid = ProductForm {
            name: "".into(),
            purchase_date: "2030-01-01".into(),
            ..Default::default()
        };
        match block_on(registry.add_product(&invalid, &now())).unwrap_err() {
            AppError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.calls().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_offline_add_is_queued_and_visible() {
        let store = MemoryStore::new();
        let registry: ProductRegistry<MemoryStore, String> = ProductRegistry::new(store.clone(), 0);

        let (product, outcome) = block_on(registry.add_product(&kettle_form(), &now())).unwrap();
        assert_eq!(outcome, WriteOutcome::Queued);
        assert!(registry.find(&product.id).is_some());
        assert!(store.ids().is_empty());

        block_on(registry.connect()).unwrap();
        assert_eq!(store.ids(), vec![product.id.clone()]);
        assert!(registry.find(&product.id).is_some());
    }

    #[test]
    fn test_rejected_write_is_rolled_back() {
        let store = MemoryStore::with_products(vec![sample("a", "Kettle", 1)]);
        store.reject("a");
        let registry = connected(&store);

        let mut form = ProductForm::from_product(&registry.find("a").unwrap());
        form.name = "Kettle Pro".into();
        let err = block_on(registry.update_product("a", &form, &now())).unwrap_err();
        assert!(matches!(err, AppError::WriteFailure { .. }));
        assert_eq!(registry.find("a").unwrap().name, "Kettle");

        assert!(matches!(
            block_on(registry.delete_product("a")).unwrap_err(),
            AppError::DeleteFailure { .. }
        ));
        assert!(registry.find("a").is_some());
    }

    #[test]
    fn test_update_keeps_identity() {
        let store = MemoryStore::with_products(vec![sample("a", "Kettle", 1)]);
        let registry = connected(&store);
        let before = registry.find("a").unwrap();

        let mut form = ProductForm::from_product(&before);
        form.notes = "descaled".into();
        let (after, _) = block_on(registry.update_product("a", &form, &now())).unwrap();
        assert_eq!(after.id, "a");
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.updated_at, now().utc);
        assert_eq!(store.get("a").unwrap().notes.as_deref(), Some("descaled"));

        assert_eq!(
            block_on(registry.update_product("zzz", &form, &now())).unwrap_err(),
            AppError::NotFound("zzz".into())
        );
    }

    #[test]
    fn test_delete_and_clear() {
        let store = MemoryStore::with_products(vec![sample("a", "Kettle", 1), sample("b", "Toaster", 2)]);
        let registry = connected(&store);

        assert_eq!(block_on(registry.delete_product("a")).unwrap(), WriteOutcome::Applied);
        assert_eq!(store.ids(), vec!["b".to_string()]);
        assert_eq!(
            block_on(registry.delete_product("a")).unwrap_err(),
            AppError::NotFound("a".into())
        );

        block_on(registry.clear_all()).unwrap();
        assert!(registry.is_empty());
        assert!(store.ids().is_empty());
    }

    #[test]
    fn test_invalid_import_writes_nothing() {
        let store = MemoryStore::new();
        let registry = connected(&store);
        let text = r#"[
            {"id": "a", "name": "Kettle", "purchaseDate": "2024-06-01"},
            {"id": "b", "name": "Toaster", "purchaseDate": "not a date"}
        ]"#;
        assert!(matches!(
            block_on(registry.import_json(text, &now())),
            Err(AppError::ImportFormat(_))
        ));
        assert!(store.calls().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let source = MemoryStore::with_products(vec![sample("a", "Kettle", 1), sample("b", "Toaster", 2)]);
        let exporter = connected(&source);
        let text = exporter.export_json().unwrap();

        let target = MemoryStore::new();
        let importer = connected(&target);
        let report = block_on(importer.import_json(&text, &now())).unwrap();
        assert_eq!(report.imported, 2);
        assert!(report.failed.is_empty());
        assert_eq!(target.ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(importer.find("a"), exporter.find("a"));
    }
}
