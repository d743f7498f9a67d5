// ============================================================================
// FORM VIEW - Lectura / relleno de formularios y errores por campo
// ============================================================================
// Alta: ids simples (`productName`, `brand`...).
// Edición (modal): mismos ids con prefijo `edit` (`editProductName`...).
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlFormElement;

use crate::dom::{create_element, get_element_by_id, input_value, query_selector_all, set_input_value, set_visible};
use crate::models::product::{FieldError, ProductForm, NOTES_MAX_CHARS};
use crate::models::warranty::WarrantyInfo;
use crate::utils::format::format_date;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormScope {
    Add,
    Edit,
}

impl FormScope {
    pub fn input_id(&self, base: &str) -> String {
        match self {
            FormScope::Add => base.to_string(),
            FormScope::Edit => {
                let mut chars = base.chars();
                match chars.next() {
                    Some(first) => format!("edit{}{}", first.to_ascii_uppercase(), chars.as_str()),
                    None => "edit".to_string(),
                }
            }
        }
    }
}

const NAME: &str = "productName";
const BRAND: &str = "brand";
const MODEL: &str = "model";
const CATEGORY: &str = "category";
const SERIAL: &str = "serialNumber";
const PURCHASE_DATE: &str = "purchaseDate";
const WARRANTY: &str = "warrantyPeriod";
const PRICE: &str = "price";
const STORE: &str = "store";
const NOTES: &str = "notes";

pub fn read_form(scope: FormScope) -> ProductForm {
    let value = |base: &str| input_value(&scope.input_id(base));
    ProductForm {
        name: value(NAME),
        brand: value(BRAND),
        model: value(MODEL),
        category: value(CATEGORY),
        serial_number: value(SERIAL),
        purchase_date: value(PURCHASE_DATE),
        warranty_period: value(WARRANTY),
        price: value(PRICE),
        store: value(STORE),
        notes: value(NOTES),
    }
}

pub fn fill_form(scope: FormScope, form: &ProductForm) {
    let set = |base: &str, value: &str| set_input_value(&scope.input_id(base), value);
    set(NAME, &form.name);
    set(BRAND, &form.brand);
    set(MODEL, &form.model);
    set(CATEGORY, &form.category);
    set(SERIAL, &form.serial_number);
    set(PURCHASE_DATE, &form.purchase_date);
    set(WARRANTY, &form.warranty_period);
    set(PRICE, &form.price);
    set(STORE, &form.store);
    set(NOTES, &form.notes);
}

pub fn reset_form(form_id: &str) {
    if let Some(form) = get_element_by_id(form_id).and_then(|f| f.dyn_into::<HtmlFormElement>().ok()) {
        form.reset();
    }
}

/// Muestra cada error bajo su campo; el primer campo con error recibe el foco
pub fn show_field_errors(scope: FormScope, errors: &[FieldError]) -> Result<(), JsValue> {
    clear_field_errors()?;
    for (i, error) in errors.iter().enumerate() {
        let Some(field) = get_element_by_id(&scope.input_id(error.field.input_id())) else {
            continue;
        };
        let Some(parent) = field.parent_element() else {
            continue;
        };

        let message = match parent.query_selector(".field-error")? {
            Some(existing) => existing,
            None => {
                let div = create_element("div")?;
                div.set_class_name("field-error");
                parent.append_child(&div)?;
                div
            }
        };
        message.set_text_content(Some(&error.message));
        set_visible(&message, true)?;
        field.class_list().add_1("error")?;

        if i == 0 {
            if let Some(html) = field.dyn_ref::<web_sys::HtmlElement>() {
                let _ = html.focus();
            }
        }
    }
    Ok(())
}

pub fn clear_field_errors() -> Result<(), JsValue> {
    for message in query_selector_all(".field-error")? {
        set_visible(&message, false)?;
    }
    for field in query_selector_all("input.error, textarea.error, select.error")? {
        field.class_list().remove_1("error")?;
    }
    Ok(())
}

/// Color del contador de notas: >70% aviso, >90% peligro
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    Warning,
    Danger,
}

impl CounterLevel {
    pub fn for_length(len: usize, max: usize) -> Self {
        if len * 10 > max * 9 {
            CounterLevel::Danger
        } else if len * 10 > max * 7 {
            CounterLevel::Warning
        } else {
            CounterLevel::Normal
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            CounterLevel::Normal => "var(--text-secondary)",
            CounterLevel::Warning => "var(--warning-color)",
            CounterLevel::Danger => "var(--danger-color)",
        }
    }
}

/// Recorta a `max` caracteres (no bytes)
pub fn clamp_chars(text: &str, max: usize) -> Option<String> {
    text.char_indices().nth(max).map(|(cut, _)| text[..cut].to_string())
}

/// Contador `#notesCounter` / `#editNotesCounter`; recorta las notas al máximo
pub fn update_char_counter(scope: FormScope) {
    let field_id = scope.input_id(NOTES);
    let value = input_value(&field_id);
    let mut len = value.chars().count();
    if let Some(clamped) = clamp_chars(&value, NOTES_MAX_CHARS) {
        set_input_value(&field_id, &clamped);
        len = NOTES_MAX_CHARS;
    }

    let Some(counter) = get_element_by_id(&format!("{}Counter", field_id)) else {
        return;
    };
    counter.set_text_content(Some(&len.to_string()));
    if let Some(html) = counter.dyn_ref::<web_sys::HtmlElement>() {
        let _ = html
            .style()
            .set_property("color", CounterLevel::for_length(len, NOTES_MAX_CHARS).color());
    }
}

/// Vista previa de garantía en el modal de edición
pub fn warranty_preview_html(info: &WarrantyInfo) -> String {
    match info.end_date {
        Some(end) => format!(
            r#"<span class="warranty-status {}">{}</span> <span class="warranty-date">until {}</span>"#,
            info.status.css_class(),
            info.text,
            format_date(end)
        ),
        None => format!(r#"<span class="warranty-status {}">{}</span>"#, info.status.css_class(), info.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::Field;
    use crate::models::warranty;
    use chrono::NaiveDate;

    #[test]
    fn test_scoped_ids() {
        assert_eq!(FormScope::Add.input_id(NAME), "productName");
        assert_eq!(FormScope::Edit.input_id(NAME), "editProductName");
        assert_eq!(FormScope::Edit.input_id(SERIAL), "editSerialNumber");
        assert_eq!(
            FormScope::Edit.input_id(Field::PurchaseDate.input_id()),
            "editPurchaseDate"
        );
    }

    #[test]
    fn test_counter_levels() {
        assert_eq!(CounterLevel::for_length(350, 500), CounterLevel::Normal);
        assert_eq!(CounterLevel::for_length(351, 500), CounterLevel::Warning);
        assert_eq!(CounterLevel::for_length(450, 500), CounterLevel::Warning);
        assert_eq!(CounterLevel::for_length(451, 500), CounterLevel::Danger);
    }

    #[test]
    fn test_clamp_counts_chars() {
        assert_eq!(clamp_chars("héllo", 5), None);
        assert_eq!(clamp_chars("héllo wörld", 7).as_deref(), Some("héllo w"));
    }

    #[test]
    fn test_warranty_preview() {
        let now = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let purchase = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let html = warranty_preview_html(&warranty::compute(purchase, 12, now));
        assert!(html.contains("warranty-expiring"));
        assert!(html.contains("until 2025/06/01"));

        let html = warranty_preview_html(&warranty::compute(purchase, 0, now));
        assert!(html.contains("no warranty info"));
        assert!(!html.contains("until"));
    }
}
