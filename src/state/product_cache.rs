// ============================================================================
// PRODUCT CACHE - Copia local ordenada del store remoto
// ============================================================================
// - Lista ordenada por createdAt descendente (se reordena en cada cambio)
// - Vista filtrada memoizada por la clave en texto de los criterios
// - Caché de render por (id, updatedAt)
// Toda mutación invalida las vistas derivadas en la misma llamada.
// ============================================================================

use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::NaiveDateTime;

use crate::models::filter::FilterCriteria;
use crate::models::product::Product;
use crate::state::render_cache::{RenderCache, RenderKey};

struct FilteredView {
    key: String,
    products: Rc<Vec<Product>>,
}

pub struct ProductCache<F> {
    products: Vec<Product>,
    filtered: Option<FilteredView>,
    render: RenderCache<F>,
}

/// Orden canónico: el más reciente primero. Estable para createdAt iguales.
pub fn sort_products(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl<F: Clone> ProductCache<F> {
    pub fn new(now_ms: i64) -> Self {
        Self {
            products: Vec::new(),
            filtered: None,
            render: RenderCache::new(now_ms),
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Reemplazo completo (carga inicial, snapshot remoto, borrado total)
    pub fn replace_all(&mut self, mut products: Vec<Product>) {
        sort_products(&mut products);
        self.products = products;
        self.filtered = None;
        self.render.clear();
    }

    /// Inserta o reemplaza por id
    pub fn upsert(&mut self, product: Product) {
        self.render.invalidate_id(&product.id);
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
        sort_products(&mut self.products);
        self.filtered = None;
    }

    /// Borra por id. Devuelve el producto eliminado si existía.
    pub fn remove(&mut self, id: &str) -> Option<Product> {
        self.render.invalidate_id(id);
        self.filtered = None;
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }

    /// Vista filtrada. Misma clave + lista sin cambios = mismo `Rc`.
    pub fn filter(&mut self, key: &str, predicate: impl Fn(&Product) -> bool) -> Rc<Vec<Product>> {
        if let Some(view) = &self.filtered {
            if view.key == key {
                return Rc::clone(&view.products);
            }
        }

        let products: Rc<Vec<Product>> = Rc::new(
            self.products
                .iter()
                .filter(|p| predicate(p))
                .cloned()
                .collect(),
        );
        self.filtered = Some(FilteredView {
            key: key.to_string(),
            products: Rc::clone(&products),
        });
        products
    }

    /// Atajo para los criterios de la UI
    pub fn apply_criteria(&mut self, criteria: &FilterCriteria, now: NaiveDateTime) -> Rc<Vec<Product>> {
        let key = criteria.key();
        self.filter(&key, |p| criteria.matches(p, now))
    }

    pub fn get_or_build<E>(
        &mut self,
        id: &str,
        version: &str,
        builder: impl FnOnce() -> Result<F, E>,
    ) -> Result<F, E> {
        self.render.get_or_build(RenderKey::new(id, version), builder)
    }

    pub fn render_cache_len(&self) -> usize {
        self.render.len()
    }

    /// Tick periódico de limpieza de la caché de render
    pub fn tick(&mut self, now_ms: i64) -> usize {
        self.render.tick(now_ms)
    }

    /// Categorías distintas no vacías, ordenadas (alimenta el filtro)
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .filter_map(|p| p.category.as_deref())
            .filter(|c| !c.trim().is_empty())
            .map(String::from)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Mismo nombre, marca y modelo (sin mayúsculas ni espacios extremos)
    pub fn is_duplicate(
        &self,
        name: &str,
        brand: Option<&str>,
        model: Option<&str>,
        except_id: Option<&str>,
    ) -> bool {
        let norm = |s: Option<&str>| s.unwrap_or("").trim().to_lowercase();
        let (name, brand, model) = (norm(Some(name)), norm(brand), norm(model));
        self.products.iter().any(|p| {
            Some(p.id.as_str()) != except_id
                && norm(Some(p.name.as_str())) == name
                && norm(p.brand.as_deref()) == brand
                && norm(p.model.as_deref()) == model
        })
    }
}
