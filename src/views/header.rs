// ============================================================================
// HEADER VIEW - Estadísticas, filtro de categorías, estado de conexión, tema
// ============================================================================

use wasm_bindgen::prelude::*;

use crate::dom::{body, escape_html, get_element_by_id, set_input_value};
use crate::models::sync::ConnectionState;
use crate::models::theme::Theme;
use crate::utils::constants::{CATEGORY_FILTER_ID, CONNECTION_STATUS_ID, STATS_ID, THEME_SELECT_ID};

pub fn stats_text(total: usize) -> String {
    format!("Total: {} products", total)
}

pub fn connection_label(state: ConnectionState, pending: usize) -> String {
    match (state, pending) {
        (ConnectionState::Connected, _) => "Online".to_string(),
        (ConnectionState::Connecting, _) => "Connecting…".to_string(),
        (ConnectionState::Disconnected, 0) => "Offline".to_string(),
        (ConnectionState::Disconnected, n) => format!("Offline · {} pending", n),
    }
}

/// Opciones del select de categorías; conserva la seleccionada aunque ya
/// no exista ningún producto con ella
pub fn category_options_html(categories: &[String], selected: &str) -> String {
    let mut html = String::from(r#"<option value="">All categories</option>"#);
    let mut seen_selected = selected.is_empty();
    for category in categories {
        let is_selected = category == selected;
        seen_selected |= is_selected;
        html.push_str(&format!(
            r#"<option value="{v}"{s}>{v}</option>"#,
            v = escape_html(category),
            s = if is_selected { " selected" } else { "" },
        ));
    }
    if !seen_selected {
        html.push_str(&format!(
            r#"<option value="{v}" selected>{v}</option>"#,
            v = escape_html(selected)
        ));
    }
    html
}

pub fn render_stats(total: usize) {
    if let Some(stats) = get_element_by_id(STATS_ID) {
        stats.set_text_content(Some(&stats_text(total)));
    }
}

pub fn render_categories(categories: &[String], selected: &str) {
    if let Some(select) = get_element_by_id(CATEGORY_FILTER_ID) {
        select.set_inner_html(&category_options_html(categories, selected));
    }
}

pub fn render_connection(state: ConnectionState, pending: usize) -> Result<(), JsValue> {
    let Some(indicator) = get_element_by_id(CONNECTION_STATUS_ID) else {
        return Ok(());
    };
    indicator.set_text_content(Some(&connection_label(state, pending)));
    indicator.set_attribute(
        "data-state",
        match state {
            ConnectionState::Connected => "online",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Disconnected => "offline",
        },
    )
}

/// `data-theme` en <body> + valor del select
pub fn apply_theme(theme: Theme) -> Result<(), JsValue> {
    let body = body().ok_or_else(|| JsValue::from_str("No body"))?;
    body.set_attribute("data-theme", theme.as_str())?;
    body.style()
        .set_property("transition", "background-color 0.3s ease, color 0.3s ease")?;
    set_input_value(THEME_SELECT_ID, theme.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_text() {
        assert_eq!(stats_text(3), "Total: 3 products");
        assert_eq!(stats_text(0), "Total: 0 products");
    }

    #[test]
    fn test_connection_label() {
        assert_eq!(connection_label(ConnectionState::Connected, 0), "Online");
        assert_eq!(connection_label(ConnectionState::Disconnected, 0), "Offline");
        assert_eq!(connection_label(ConnectionState::Disconnected, 2), "Offline · 2 pending");
    }

    #[test]
    fn test_category_options_keep_selection() {
        let categories = vec!["Garden".to_string(), "Kitchen".to_string()];
        let html = category_options_html(&categories, "Kitchen");
        assert!(html.contains(r#"<option value="Kitchen" selected>Kitchen</option>"#));
        assert!(html.contains(r#"<option value="Garden">Garden</option>"#));

        let html = category_options_html(&categories, "Office");
        assert!(html.ends_with(r#"<option value="Office" selected>Office</option>"#));
    }
}
