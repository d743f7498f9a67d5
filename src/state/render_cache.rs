// ============================================================================
// RENDER CACHE - Memoización de fragmentos por (id, versión)
// ============================================================================
// Caché de rendimiento pura: cualquier entrada puede desaparecer en cualquier
// momento sin afectar al resultado. Se expulsa siempre la mitad más antigua
// (orden de inserción).
// ============================================================================

use std::collections::{HashMap, VecDeque};

/// Intervalo del tick de limpieza periódica
pub const CLEANUP_INTERVAL_MS: i64 = 60_000;
/// Por encima de este tamaño el tick periódico expulsa la mitad más antigua
pub const SOFT_LIMIT: usize = 100;
/// Por encima de este tamaño se expulsa inmediatamente, sin esperar al tick
pub const HARD_LIMIT: usize = 200;
/// Margen para el jitter del temporizador del navegador
const TICK_SLACK_MS: i64 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub id: String,
    pub version: String,
}

impl RenderKey {
    pub fn new(id: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
        }
    }
}

pub struct RenderCache<F> {
    entries: HashMap<RenderKey, F>,
    order: VecDeque<RenderKey>,
    last_cleanup_ms: i64,
}

impl<F: Clone> RenderCache<F> {
    pub fn new(now_ms: i64) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            last_cleanup_ms: now_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &RenderKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Devuelve el fragmento cacheado o lo construye con `builder`
    pub fn get_or_build<E>(
        &mut self,
        key: RenderKey,
        builder: impl FnOnce() -> Result<F, E>,
    ) -> Result<F, E> {
        if let Some(fragment) = self.entries.get(&key) {
            return Ok(fragment.clone());
        }

        let fragment = builder()?;
        self.order.push_back(key.clone());
        self.entries.insert(key, fragment.clone());

        if self.entries.len() > HARD_LIMIT {
            let evicted = self.evict_oldest_half();
            log::warn!("🧹 Render cache: limpieza de emergencia, {} entradas expulsadas", evicted);
        }

        Ok(fragment)
    }

    /// Invalida todas las versiones de un producto
    pub fn invalidate_id(&mut self, id: &str) {
        self.entries.retain(|key, _| key.id != id);
        self.order.retain(|key| key.id != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Tick periódico. Devuelve el número de entradas expulsadas.
    pub fn tick(&mut self, now_ms: i64) -> usize {
        if now_ms - self.last_cleanup_ms < CLEANUP_INTERVAL_MS - TICK_SLACK_MS {
            return 0;
        }
        self.last_cleanup_ms = now_ms;

        if self.entries.len() > SOFT_LIMIT {
            let evicted = self.evict_oldest_half();
            log::info!("🧹 Render cache: {} entradas expulsadas ({} restantes)", evicted, self.len());
            evicted
        } else {
            0
        }
    }

    fn evict_oldest_half(&mut self) -> usize {
        let count = self.entries.len() / 2;
        for _ in 0..count {
            if let Some(key) = self.order.pop_front() {
                self.entries.remove(&key);
            }
        }
        count
    }
}
