// ============================================================================
// PRODUCT LIST VIEW - Lista completa o ventana virtual
// ============================================================================
// Más de `virtual_scroll_threshold` productos: solo se pinta la ventana
// visible dentro de un contenedor con la altura total de la lista.
// ============================================================================

use std::convert::Infallible;

use chrono::NaiveDateTime;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::config::UIConfig;
use crate::dom::{query_selector_all, set_visible, window};
use crate::models::product::Product;
use crate::state::app_state::AppState;
use crate::state::product_cache::ProductCache;
use crate::views::product_card::render_card;

/// Ventana [start, end) a pintar para una posición de scroll dada
pub fn visible_range(scroll_top: f64, viewport_height: f64, len: usize, ui: &UIConfig) -> (usize, usize) {
    let h = ui.item_height_px;
    if len == 0 || h <= 0.0 {
        return (0, 0);
    }
    let start = (scroll_top.max(0.0) / h).floor() as usize;
    let visible = (viewport_height.max(0.0) / h).ceil() as usize + ui.overscan_items;
    let start = start.min(len);
    let end = start.saturating_add(visible).min(len);
    (start, end)
}

pub fn uses_virtual_scroll(len: usize, ui: &UIConfig) -> bool {
    len > ui.virtual_scroll_threshold
}

/// scrollTop y altura visibles: las del contenedor, o las de la ventana
/// si el contenedor no hace scroll propio
pub fn scroll_metrics(container: &Element) -> (f64, f64) {
    let win = window();
    let scroll_top = match container.scroll_top() {
        0 => win.as_ref().and_then(|w| w.page_y_offset().ok()).unwrap_or(0.0),
        top => f64::from(top),
    };
    let height = match container.client_height() {
        0 => win
            .as_ref()
            .and_then(|w| w.inner_height().ok())
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0),
        h => f64::from(h),
    };
    (scroll_top, height)
}

/// Versión del fragmento: el badge de garantía depende del día de render
fn card_version(product: &Product, now: NaiveDateTime) -> String {
    format!("{}|{}", product.version_token(), now.date())
}

fn card_html(cache: &mut ProductCache<String>, product: &Product, now: NaiveDateTime) -> String {
    let version = card_version(product, now);
    match cache.get_or_build(&product.id, &version, || Ok::<_, Infallible>(render_card(product, now))) {
        Ok(html) => html,
        Err(never) => match never {},
    }
}

/// Pinta `products` en `container`. Devuelve la ventana pintada.
pub fn render_product_list(
    container: &Element,
    empty_state: Option<&Element>,
    products: &[Product],
    cache: &mut ProductCache<String>,
    state: &AppState,
    now: NaiveDateTime,
    ui: &UIConfig,
) -> Result<(usize, usize), JsValue> {
    if let Some(empty) = empty_state {
        set_visible(empty, products.is_empty())?;
    }
    if products.is_empty() {
        container.set_inner_html("");
        state.visible_range.set((0, 0));
        return Ok((0, 0));
    }

    let range = if uses_virtual_scroll(products.len(), ui) {
        let (scroll_top, height) = scroll_metrics(container);
        visible_range(scroll_top, height, products.len(), ui)
    } else {
        (0, products.len())
    };
    let (start, end) = range;

    let cards: String = products[start..end]
        .iter()
        .map(|p| card_html(cache, p, now))
        .collect();

    if uses_virtual_scroll(products.len(), ui) {
        container.set_inner_html(&format!(
            r#"<div class="virtual-scroll-container" style="position: relative; height: {total}px;"><div class="virtual-viewport" style="transform: translateY({offset}px);">{cards}</div></div>"#,
            total = products.len() as f64 * ui.item_height_px,
            offset = start as f64 * ui.item_height_px,
            cards = cards,
        ));
    } else {
        container.set_inner_html(&cards);
    }

    restore_expanded(state)?;
    state.visible_range.set(range);
    Ok(range)
}

/// Los fragmentos cacheados salen plegados: reabrir los que el usuario abrió
fn restore_expanded(state: &AppState) -> Result<(), JsValue> {
    for id in state.expanded.borrow().iter() {
        let selector = format!(r#".product-card[data-id="{}"]"#, id.replace('"', "\\\""));
        for card in query_selector_all(&selector)? {
            set_details_open(&card, true)?;
        }
    }
    Ok(())
}

pub fn set_details_open(card: &Element, open: bool) -> Result<(), JsValue> {
    card.class_list().toggle_with_force("expanded", open)?;
    if let Some(details) = card.query_selector(".product-details")? {
        if let Some(details) = details.dyn_ref::<HtmlElement>() {
            details
                .style()
                .set_property("display", if open { "block" } else { "none" })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui() -> UIConfig {
        UIConfig::default()
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!uses_virtual_scroll(50, &ui()));
        assert!(uses_virtual_scroll(51, &ui()));
    }

    #[test]
    fn test_window_at_top() {
        // 800px de viewport: ceil(800/300) = 3, +5 de overscan
        assert_eq!(visible_range(0.0, 800.0, 120, &ui()), (0, 8));
    }

    #[test]
    fn test_window_after_scrolling() {
        assert_eq!(visible_range(3000.0, 900.0, 120, &ui()), (10, 18));
        assert_eq!(visible_range(3299.0, 900.0, 120, &ui()), (10, 18));
    }

    #[test]
    fn test_cached_card_follows_the_render_day() {
        use crate::services::memory_store::sample;
        use chrono::NaiveDate;

        let day = |m: u32, d: u32, h: u32| NaiveDate::from_ymd_opt(2025, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap();
        let kettle = sample("k1", "Kettle", 1);
        let mut cache: ProductCache<String> = ProductCache::new(0);

        let warm = card_html(&mut cache, &kettle, day(5, 20, 9));
        assert!(warm.contains("12 days until expiry"));
        assert_eq!(card_html(&mut cache, &kettle, day(5, 20, 18)), warm);
        assert_eq!(cache.render_cache_len(), 1);

        let later = card_html(&mut cache, &kettle, day(6, 2, 9));
        assert_eq!(later, render_card(&kettle, day(6, 2, 9)));
        assert!(later.contains("warranty-expired"));
    }

    #[test]
    fn test_window_is_clamped_to_length() {
        assert_eq!(visible_range(35_700.0, 900.0, 120, &ui()), (119, 120));
        assert_eq!(visible_range(1_000_000.0, 900.0, 120, &ui()), (120, 120));
        assert_eq!(visible_range(0.0, 900.0, 0, &ui()), (0, 0));
    }
}
