// ============================================================================
// APP STATE - Estado de UI (no de dominio)
// ============================================================================
// Criterios de filtro, tema, modales abiertos, tarjetas expandidas y ventana
// visible del scroll virtual. Los productos viven en `ProductCache`.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::models::filter::FilterCriteria;
use crate::models::theme::Theme;

#[derive(Clone)]
pub struct AppState {
    pub criteria: Rc<RefCell<FilterCriteria>>,
    pub theme: Rc<Cell<Theme>>,

    /// Producto abierto en el modal de edición
    pub editing_id: Rc<RefCell<Option<String>>>,
    /// Producto pendiente de confirmación de borrado
    pub deleting_id: Rc<RefCell<Option<String>>>,

    /// Tarjetas con los detalles desplegados
    pub expanded: Rc<RefCell<HashSet<String>>>,

    /// Ventana [start, end) renderizada con scroll virtual
    pub visible_range: Rc<Cell<(usize, usize)>>,

    // Reactivity: callbacks para notificar cambios
    pub change_subscribers: Rc<RefCell<Vec<Rc<dyn Fn()>>>>,
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        Self {
            criteria: Rc::new(RefCell::new(FilterCriteria::default())),
            theme: Rc::new(Cell::new(theme)),
            editing_id: Rc::new(RefCell::new(None)),
            deleting_id: Rc::new(RefCell::new(None)),
            expanded: Rc::new(RefCell::new(HashSet::new())),
            visible_range: Rc::new(Cell::new((0, 0))),
            change_subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Devuelve `true` si los criterios cambiaron
    pub fn set_criteria(&self, criteria: FilterCriteria) -> bool {
        if *self.criteria.borrow() == criteria {
            return false;
        }
        *self.criteria.borrow_mut() = criteria;
        true
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.criteria.borrow().clone()
    }

    /// Alterna los detalles de una tarjeta. Devuelve el nuevo estado.
    pub fn toggle_expanded(&self, id: &str) -> bool {
        let mut expanded = self.expanded.borrow_mut();
        if expanded.remove(id) {
            false
        } else {
            expanded.insert(id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.borrow().contains(id)
    }

    /// Olvida ids que ya no existen
    pub fn retain_expanded(&self, exists: impl Fn(&str) -> bool) {
        self.expanded.borrow_mut().retain(|id| exists(id));
    }

    pub fn subscribe_to_changes<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.change_subscribers.borrow_mut().push(Rc::new(callback));
    }

    pub fn notify_subscribers(&self) {
        // Clonar antes de llamar: un callback puede volver a suscribirse
        let callbacks: Vec<Rc<dyn Fn()>> = self.change_subscribers.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_criteria_reports_changes_only() {
        let state = AppState::new(Theme::default());
        assert!(!state.set_criteria(FilterCriteria::default()));
        assert!(state.set_criteria(FilterCriteria::new("Kettle", "", "")));
        assert!(!state.set_criteria(FilterCriteria::new("kettle ", "", "")));
        assert_eq!(state.criteria().key(), "kettle__");
    }

    #[test]
    fn test_toggle_expanded() {
        let state = AppState::new(Theme::default());
        assert!(state.toggle_expanded("a"));
        assert!(state.is_expanded("a"));
        assert!(!state.toggle_expanded("a"));
        assert!(!state.is_expanded("a"));

        state.toggle_expanded("a");
        state.toggle_expanded("b");
        state.retain_expanded(|id| id == "b");
        assert!(!state.is_expanded("a"));
        assert!(state.is_expanded("b"));
    }

    #[test]
    fn test_subscribers_are_notified() {
        let state = AppState::new(Theme::default());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        state.subscribe_to_changes(move || counter.set(counter.get() + 1));
        state.notify_subscribers();
        state.notify_subscribers();
        assert_eq!(hits.get(), 2);
    }
}
