// Modales de edición y de confirmación de borrado

use wasm_bindgen::prelude::*;

use crate::dom::{get_element_by_id, query_selector_all};

pub fn show_modal(id: &str) -> Result<(), JsValue> {
    match get_element_by_id(id) {
        Some(modal) => modal.class_list().add_1("show"),
        None => Err(JsValue::from_str(&format!("Modal not found: {}", id))),
    }
}

pub fn close_modals() -> Result<(), JsValue> {
    for modal in query_selector_all(".modal.show")? {
        modal.class_list().remove_1("show")?;
    }
    Ok(())
}
