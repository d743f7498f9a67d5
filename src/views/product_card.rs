// ============================================================================
// PRODUCT CARD VIEW - Tarjeta de producto como fragmento HTML
// ============================================================================
// El fragmento depende solo del producto y del instante de render, así que
// es memoizable por (id, updatedAt). Los controles llevan `data-action` +
// `data-id` y los decodifica un único listener delegado en la lista.
// ============================================================================

use chrono::NaiveDateTime;

use crate::dom::escape_html;
use crate::models::action::ProductAction;
use crate::models::product::Product;
use crate::models::warranty;
use crate::utils::format::{format_date, format_price};

fn action_button(action: ProductAction, id: &str, class: &str, icon: &str, label: &str) -> String {
    format!(
        r#"<button type="button" class="btn {class}" data-action="{action}" data-id="{id}"><i class="fas {icon}"></i> {label}</button>"#,
        class = class,
        action = action.as_str(),
        id = id,
        icon = icon,
        label = label,
    )
}

fn info_item(label: &str, value: &str) -> String {
    format!(
        r#"<div class="info-item"><span class="info-label">{}</span><span class="info-value">{}</span></div>"#,
        label, value
    )
}

/// Renderiza la tarjeta completa (detalles plegados)
pub fn render_card(product: &Product, now: NaiveDateTime) -> String {
    let id = escape_html(&product.id);
    let info = warranty::compute(product.purchase_date, i64::from(product.warranty_period), now);

    let subtitle = [product.brand.as_deref(), product.model.as_deref()]
        .into_iter()
        .flatten()
        .map(escape_html)
        .collect::<Vec<_>>()
        .join(" · ");

    let mut html = String::with_capacity(2048);
    html.push_str(&format!(r#"<div class="product-card" data-id="{}">"#, id));

    // Cabecera
    html.push_str(r#"<div class="product-header"><div class="product-title">"#);
    html.push_str(&format!(r#"<h3 class="product-name">{}</h3>"#, escape_html(&product.name)));
    if !subtitle.is_empty() {
        html.push_str(&format!(r#"<p class="product-brand">{}</p>"#, subtitle));
    }
    if let Some(category) = &product.category {
        html.push_str(&format!(
            r#"<span class="product-category">{}</span>"#,
            escape_html(category)
        ));
    }
    html.push_str("</div>");
    html.push_str(&format!(
        r#"<div class="warranty-badge"><span class="warranty-status {}"><i class="fas fa-shield-alt"></i> {}</span></div>"#,
        info.status.css_class(),
        escape_html(&info.text)
    ));
    html.push_str("</div>");

    // Resumen siempre visible
    html.push_str(r#"<div class="product-summary">"#);
    html.push_str(&info_item("Purchased", &format_date(product.purchase_date)));
    html.push_str(&info_item("Price", &format_price(product.price)));
    html.push_str("</div>");

    // Detalles desplegables
    html.push_str(r#"<div class="product-details" style="display: none;"><div class="product-info-grid">"#);
    html.push_str(r#"<div class="info-section purchase-info">"#);
    if let Some(store) = &product.store {
        html.push_str(&info_item("Store", &escape_html(store)));
    }
    if let Some(serial) = &product.serial_number {
        let serial = escape_html(serial);
        html.push_str(&format!(
            r#"<div class="info-item"><span class="info-label">Serial number</span><span class="info-value serial-number">{serial}</span><button type="button" class="copy-btn" data-action="{action}" data-id="{id}" data-copy="{serial}" title="Copy"><i class="fas fa-copy"></i></button></div>"#,
            serial = serial,
            action = ProductAction::CopySerial.as_str(),
            id = id,
        ));
    }
    html.push_str("</div>");

    if let Some(end) = info.end_date {
        html.push_str(r#"<div class="info-section warranty-info">"#);
        html.push_str(&info_item("Warranty until", &format_date(end)));
        html.push_str(&info_item(
            "Warranty period",
            &format!("{} months", product.warranty_period),
        ));
        html.push_str("</div>");
    }
    html.push_str("</div>");

    if let Some(notes) = &product.notes {
        html.push_str(&format!(
            r#"<div class="product-notes"><div class="notes-title"><i class="fas fa-sticky-note"></i> Notes</div><div class="notes-content">{}</div></div>"#,
            escape_html(notes)
        ));
    }
    html.push_str("</div>");

    // Acciones
    html.push_str(r#"<div class="product-actions">"#);
    html.push_str(&action_button(
        ProductAction::ToggleDetails,
        &id,
        "btn-toggle",
        "fa-chevron-down",
        "Details",
    ));
    html.push_str(&action_button(ProductAction::Edit, &id, "btn-edit", "fa-edit", "Edit"));
    html.push_str(&action_button(ProductAction::Delete, &id, "btn-delete", "fa-trash", "Delete"));
    html.push_str("</div></div>");

    html
}
