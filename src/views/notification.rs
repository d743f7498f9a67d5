// ============================================================================
// NOTIFICATIONS VIEW - Avisos flotantes que se auto-ocultan
// ============================================================================

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;

use crate::dom::{body, get_element_by_id, ElementBuilder};
use crate::models::notification::Notification;
use crate::utils::constants::NOTIFICATIONS_ID;

/// Duración de la animación de salida
const EXIT_ANIMATION_MS: u32 = 300;

pub fn show_notification(notification: &Notification) -> Result<(), JsValue> {
    let kind = notification.kind;
    let icon = ElementBuilder::new("i")?
        .class(&format!("fas {}", kind.icon()))
        .build();
    let message = ElementBuilder::new("span")?.text(&notification.message).build();

    let element = ElementBuilder::new("div")?
        .class(&format!("notification notification-{}", kind.as_str()))
        .attr("role", "status")?
        .style("background", kind.color())?
        .child(icon)?
        .child(message)?
        .build();

    // Contenedor dedicado si existe; si no, directamente en <body>
    match get_element_by_id(NOTIFICATIONS_ID) {
        Some(container) => container.append_child(&element)?,
        None => body()
            .ok_or_else(|| JsValue::from_str("No body"))?
            .append_child(&element)?,
    };

    log::debug!("🔔 [{}] {}", kind.as_str(), notification.message);

    // Temporizadores de un solo disparo: se completan solos
    let leaving = element.clone();
    Timeout::new(notification.duration_ms, move || {
        let _ = leaving.class_list().add_1("leaving");
        Timeout::new(EXIT_ANIMATION_MS, move || leaving.remove()).forget();
    })
    .forget();

    Ok(())
}

/// Variante que nunca falla: un aviso que no se puede pintar se loguea
pub fn notify(notification: Notification) {
    if let Err(e) = show_notification(&notification) {
        log::error!("❌ No se pudo mostrar el aviso '{}': {:?}", notification.message, e);
    }
}
