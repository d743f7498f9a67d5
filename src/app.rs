// ============================================================================
// APP - Instancia explícita de la aplicación
// ============================================================================
// Une registry (cache + sync), estado de UI y vistas. Todos los listeners,
// la suscripción push y el intervalo de limpieza cuelgan de `AppLifetime`.
// El arranque es una lista ordenada de pasos, ejecutados uno tras otro.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, HtmlInputElement, KeyboardEvent};

use crate::config::{AppConfig, UIConfig};
use crate::dom::{
    document, get_element_by_id, input_value, query_selector_all, require_element, set_input_value, window,
    AppLifetime, Debouncer, Throttle,
};
use crate::error::AppError;
use crate::models::{
    ConnectionState, DrainReport, FilterCriteria, Notification, ProductAction, ProductForm, Theme, WriteOutcome,
};
use crate::models::warranty;
use crate::services::{FirebaseStore, NetworkMonitor, NetworkStatus};
use crate::state::render_cache::CLEANUP_INTERVAL_MS;
use crate::state::AppState;
use crate::utils::constants::*;
use crate::utils::perf::{now_ms, PerfMonitor};
use crate::utils::storage::{load_theme, save_theme};
use crate::utils::Now;
use crate::viewmodels::ProductRegistry;
use crate::views::form::{
    clear_field_errors, fill_form, read_form, reset_form, show_field_errors, update_char_counter,
    warranty_preview_html, FormScope,
};
use crate::views::header::{apply_theme, render_categories, render_connection, render_stats};
use crate::views::modal::{close_modals, show_modal};
use crate::views::product_list::{scroll_metrics, set_details_open, uses_virtual_scroll, visible_range};
use crate::views::transfer::{download_json, read_file_text, write_clipboard};
use crate::views::{notify, render_product_list};

/// Registry concreto de la app: store Firebase, fragmentos HTML en cache
pub type Registry = ProductRegistry<FirebaseStore, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartupStep {
    ApplyTheme,
    BindEvents,
    ConnectStore,
    Subscribe,
    RenderInitial,
    StartCacheCleanup,
}

pub const STARTUP_SEQUENCE: [StartupStep; 6] = [
    StartupStep::ApplyTheme,
    StartupStep::BindEvents,
    StartupStep::ConnectStore,
    StartupStep::Subscribe,
    StartupStep::RenderInitial,
    StartupStep::StartCacheCleanup,
];

const GENERIC_FAILURE: &str = "Something went wrong, please try again";
const UNEXPECTED_ERROR: &str = "The app hit an unexpected error, please refresh the page";

#[derive(Clone)]
pub struct App {
    registry: Registry,
    state: AppState,
    lifetime: Rc<AppLifetime>,
    network: Rc<NetworkMonitor>,
    perf: Rc<RefCell<PerfMonitor>>,
    search: Rc<Debouncer>,
    scroll: Rc<Throttle>,
    ui: UIConfig,
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self, JsValue> {
        // Sin contenedor de lista no hay nada que pintar
        require_element(PRODUCT_LIST_ID)?;

        let store = FirebaseStore::new(config.clone());
        let ui = config.ui_config.clone();
        Ok(Self {
            registry: ProductRegistry::new(store, Now::current().millis()),
            state: AppState::new(load_theme()),
            lifetime: AppLifetime::new(),
            network: Rc::new(NetworkMonitor::new()),
            perf: Rc::new(RefCell::new(PerfMonitor::new())),
            search: Rc::new(Debouncer::new(ui.search_debounce_ms)),
            scroll: Rc::new(Throttle::new(ui.scroll_throttle_ms)),
            ui,
        })
    }

    pub fn lifetime(&self) -> Rc<AppLifetime> {
        Rc::clone(&self.lifetime)
    }

    // ========================================================================
    // ARRANQUE
    // ========================================================================

    pub async fn start(self) {
        log::info!("🚀 [APP] Arrancando ({} pasos)", STARTUP_SEQUENCE.len());
        for step in STARTUP_SEQUENCE {
            if self.lifetime.is_aborted() {
                log::warn!("⚠️ [APP] Arranque interrumpido antes de {:?}", step);
                return;
            }
            if let Err(e) = self.run_step(step).await {
                log::error!("❌ [APP] Paso {:?} falló: {:?}", step, e);
                notify(Notification::error(GENERIC_FAILURE));
            }
        }
        log::info!("✅ [APP] Arranque completado");
    }

    async fn run_step(&self, step: StartupStep) -> Result<(), JsValue> {
        log::debug!("▶️ [APP] {:?}", step);
        match step {
            StartupStep::ApplyTheme => apply_theme(self.state.theme.get()),
            StartupStep::BindEvents => self.bind_events(),
            StartupStep::ConnectStore => {
                if self.network.is_offline() {
                    log::warn!("📴 [APP] Sin red al arrancar, las escrituras irán a la queue");
                    self.render_connection();
                    return Ok(());
                }
                self.render_connection();
                match self.registry.connect().await {
                    Ok(outcome) => self.report_drain(&outcome.drain),
                    Err(e) => {
                        log::error!("❌ [APP] Conexión inicial fallida: {}", e);
                        notify(e.to_notification());
                    }
                }
                self.render_connection();
                Ok(())
            }
            StartupStep::Subscribe => {
                self.subscribe();
                Ok(())
            }
            StartupStep::RenderInitial => self.render(),
            StartupStep::StartCacheCleanup => {
                let cache = self.registry.cache();
                let interval = Interval::new(CLEANUP_INTERVAL_MS as u32, move || {
                    let evicted = cache.borrow_mut().tick(Now::current().millis());
                    if evicted > 0 {
                        log::debug!("🧹 [CACHE] {} fragmentos expulsados", evicted);
                    }
                });
                self.lifetime.hold_interval(interval);
                Ok(())
            }
        }
    }

    fn subscribe(&self) {
        let on_update = {
            let app = self.clone();
            Rc::new(move |changed: bool| {
                if changed {
                    app.render_or_notify();
                }
                // Un snapshot tras perder la conexión indica que el store volvió
                if app.registry.sync().state() == ConnectionState::Disconnected {
                    app.reconnect();
                }
            })
        };
        let on_error = {
            let app = self.clone();
            Rc::new(move |e: AppError| {
                log::warn!("📴 [SYNC] {}", e);
                if e.is_unavailable() {
                    app.registry.sync().set_disconnected();
                }
                app.render_connection();
            })
        };

        match self.registry.sync().subscribe(on_update, on_error) {
            Ok(subscription) => self.lifetime.hold_subscription(subscription),
            Err(e) => {
                log::error!("❌ [SYNC] No se pudo abrir la suscripción: {}", e);
                notify(e.to_notification());
            }
        }
    }

    fn reconnect(&self) {
        let app = self.clone();
        spawn_local(async move {
            app.render_connection();
            match app.registry.connect().await {
                Ok(outcome) => {
                    if outcome.changed {
                        app.render_or_notify();
                    }
                    if outcome.drain.applied > 0 {
                        notify(Notification::success(format!(
                            "Back online, {} offline changes synced",
                            outcome.drain.applied
                        )));
                    }
                    app.report_drain(&outcome.drain);
                }
                Err(e) => log::warn!("📴 [SYNC] Reconexión fallida: {}", e),
            }
            app.render_connection();
        });
    }

    fn report_drain(&self, report: &DrainReport) {
        for (operation, error) in &report.rejected {
            log::error!(
                "❌ [SYNC] Operación {} de {} rechazada: {}",
                operation.kind(),
                operation.product_id(),
                error
            );
        }
        if !report.rejected.is_empty() {
            notify(Notification::error(format!(
                "{} offline changes were rejected by the server",
                report.rejected.len()
            )));
        }
        if report.requeued > 0 {
            notify(Notification::warning(format!(
                "Connection lost while syncing, {} changes still pending",
                report.requeued
            )));
        }
    }

    // ========================================================================
    // RENDER
    // ========================================================================

    pub fn render(&self) -> Result<(), JsValue> {
        let started = now_ms();
        let now = Now::current();
        let criteria = self.state.criteria();
        let products = self.registry.filtered(&criteria, now.local);

        let container = require_element(PRODUCT_LIST_ID)?;
        let empty_state = get_element_by_id(EMPTY_STATE_ID);
        {
            let cache = self.registry.cache();
            let mut cache = cache.borrow_mut();
            render_product_list(
                &container,
                empty_state.as_ref(),
                &products,
                &mut cache,
                &self.state,
                now.local,
                &self.ui,
            )?;
        }

        let registry = self.registry.clone();
        self.state.retain_expanded(|id| registry.find(id).is_some());
        render_stats(self.registry.len());
        render_categories(&self.registry.categories(), &criteria.category);
        self.render_connection();

        let mut perf = self.perf.borrow_mut();
        perf.record("render", now_ms() - started);
        if let Some(average) = perf.average_ms() {
            log::debug!("⏱️ [RENDER] {} productos, media {:.1}ms", products.len(), average);
        }
        Ok(())
    }

    fn render_or_notify(&self) {
        if let Err(e) = self.render() {
            log::error!("❌ [RENDER] {:?}", e);
            notify(Notification::error(GENERIC_FAILURE));
        }
    }

    fn render_connection(&self) {
        let sync = self.registry.sync();
        if let Err(e) = render_connection(sync.state(), sync.pending_count()) {
            log::warn!("⚠️ [RENDER] Indicador de conexión: {:?}", e);
        }
    }

    /// Scroll: solo repinta si la ventana virtual cambió
    fn on_scroll(&self) {
        let Some(container) = get_element_by_id(PRODUCT_LIST_ID) else {
            return;
        };
        let now = Now::current();
        let len = self.registry.filtered(&self.state.criteria(), now.local).len();
        if !uses_virtual_scroll(len, &self.ui) {
            return;
        }
        let (scroll_top, height) = scroll_metrics(&container);
        if visible_range(scroll_top, height, len, &self.ui) != self.state.visible_range.get() {
            self.render_or_notify();
        }
    }

    fn set_criteria(&self, criteria: FilterCriteria) {
        if self.state.set_criteria(criteria) {
            self.state.notify_subscribers();
        }
    }

    fn read_criteria(&self) -> FilterCriteria {
        FilterCriteria::new(
            &input_value(SEARCH_INPUT_ID),
            &input_value(CATEGORY_FILTER_ID),
            &input_value(WARRANTY_FILTER_ID),
        )
    }

    // ========================================================================
    // EVENTOS
    // ========================================================================

    fn bind_events(&self) -> Result<(), JsValue> {
        let win = window().ok_or_else(|| JsValue::from_str("No window"))?;
        let doc = document().ok_or_else(|| JsValue::from_str("No document"))?;
        let lifetime = &self.lifetime;

        {
            let app = self.clone();
            self.state.subscribe_to_changes(move || app.render_or_notify());
        }

        if let Some(form) = get_element_by_id(PRODUCT_FORM_ID) {
            let app = self.clone();
            lifetime.listen(&form, "submit", move |e: Event| {
                e.prevent_default();
                app.handle_add();
            })?;
        }

        if let Some(form) = get_element_by_id(EDIT_FORM_ID) {
            let app = self.clone();
            lifetime.listen(&form, "submit", move |e: Event| {
                e.prevent_default();
                app.handle_update();
            })?;
        }

        if let Some(button) = get_element_by_id(CONFIRM_DELETE_ID) {
            let app = self.clone();
            lifetime.listen(&button, "click", move |_| app.handle_delete())?;
        }

        // Filtros
        if let Some(search) = get_element_by_id(SEARCH_INPUT_ID) {
            let app = self.clone();
            lifetime.listen(&search, "input", move |_| {
                let inner = app.clone();
                app.search.call(move || inner.set_criteria(inner.read_criteria()));
            })?;
        }
        for id in [CATEGORY_FILTER_ID, WARRANTY_FILTER_ID] {
            if let Some(select) = get_element_by_id(id) {
                let app = self.clone();
                lifetime.listen(&select, "change", move |_| app.set_criteria(app.read_criteria()))?;
            }
        }

        if let Some(select) = get_element_by_id(THEME_SELECT_ID) {
            let app = self.clone();
            lifetime.listen(&select, "change", move |_| app.handle_theme_change())?;
        }

        // Un único listener delegado para las acciones de las tarjetas
        let list = require_element(PRODUCT_LIST_ID)?;
        {
            let app = self.clone();
            lifetime.listen(&list, "click", move |e: Event| app.on_list_click(&e))?;
        }

        for target in [list.unchecked_ref::<web_sys::EventTarget>(), win.unchecked_ref()] {
            let app = self.clone();
            lifetime.listen(target, "scroll", move |_| {
                let inner = app.clone();
                app.scroll.call(move || inner.on_scroll());
            })?;
        }

        // Datos
        if let Some(button) = get_element_by_id(EXPORT_BUTTON_ID) {
            let app = self.clone();
            lifetime.listen(&button, "click", move |_| app.handle_export())?;
        }
        if let Some(button) = get_element_by_id(IMPORT_BUTTON_ID) {
            lifetime.listen(&button, "click", move |_| {
                if let Some(input) = get_element_by_id(IMPORT_FILE_ID).and_then(|i| i.dyn_into::<HtmlInputElement>().ok())
                {
                    input.click();
                }
            })?;
        }
        if let Some(input) = get_element_by_id(IMPORT_FILE_ID) {
            let app = self.clone();
            lifetime.listen(&input, "change", move |e: Event| app.handle_import(&e))?;
        }
        if let Some(button) = get_element_by_id(CLEAR_BUTTON_ID) {
            let app = self.clone();
            lifetime.listen(&button, "click", move |_| app.handle_clear())?;
        }

        // Modales: Escape, clic en el fondo, botones de cierre
        lifetime.listen(&doc, "keydown", move |e: Event| {
            if e.dyn_ref::<KeyboardEvent>().map(|k| k.key() == "Escape").unwrap_or(false) {
                log_dom_error(close_modals());
            }
        })?;
        for modal in query_selector_all(".modal")? {
            lifetime.listen(&modal, "click", move |e: Event| {
                let on_backdrop = e
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .map(|t| t.class_list().contains("modal"))
                    .unwrap_or(false);
                if on_backdrop {
                    log_dom_error(close_modals());
                }
            })?;
        }
        for button in query_selector_all("[data-close-modal]")? {
            lifetime.listen(&button, "click", move |e: Event| {
                e.prevent_default();
                log_dom_error(close_modals());
            })?;
        }

        // Presets de garantía y vista previa en el modal de edición
        for preset in query_selector_all(WARRANTY_PRESET_SELECTOR)? {
            let app = self.clone();
            let button = preset.clone();
            lifetime.listen(&preset, "click", move |e: Event| {
                e.prevent_default();
                app.apply_warranty_preset(&button);
            })?;
        }
        for base in ["purchaseDate", "warrantyPeriod"] {
            if let Some(input) = get_element_by_id(&FormScope::Edit.input_id(base)) {
                lifetime.listen(&input, "input", move |_| update_warranty_preview())?;
            }
        }

        // Contadores de caracteres de las notas
        for scope in [FormScope::Add, FormScope::Edit] {
            if let Some(notes) = get_element_by_id(&scope.input_id("notes")) {
                lifetime.listen(&notes, "input", move |_| update_char_counter(scope))?;
            }
        }

        // Página oculta: buen momento para limpiar la caché de render
        {
            let cache = self.registry.cache();
            let hidden_doc = doc.clone();
            lifetime.listen(&doc, "visibilitychange", move |_| {
                if hidden_doc.hidden() {
                    let evicted = cache.borrow_mut().tick(Now::current().millis());
                    log::debug!("🙈 [CACHE] Página oculta, {} fragmentos expulsados", evicted);
                }
            })?;
        }

        // Último recurso: errores JS y promesas rechazadas sin handler
        lifetime.listen(&win, "error", move |e: Event| {
            log::error!("💥 [APP] Error global: {}", event_detail(&e, "message"));
            notify(Notification::error(UNEXPECTED_ERROR));
        })?;
        lifetime.listen(&win, "unhandledrejection", move |e: Event| {
            log::error!("💥 [APP] Promesa rechazada sin handler: {}", event_detail(&e, "reason"));
            notify(Notification::error(GENERIC_FAILURE));
            e.prevent_default();
        })?;

        // Conectividad
        {
            let app = self.clone();
            self.network.start(lifetime, move |status| match status {
                NetworkStatus::Offline => {
                    app.registry.sync().set_disconnected();
                    app.render_connection();
                    notify(Notification::warning("You are offline, changes will be queued"));
                }
                NetworkStatus::Online => app.reconnect(),
                NetworkStatus::Unknown => {}
            })?;
        }

        // pagehide libera todo. Closure de un solo uso fuera de AppLifetime:
        // no puede ser dueña de sí misma.
        let lifetime = Rc::clone(&self.lifetime);
        let on_pagehide = Closure::once_into_js(move || lifetime.abort());
        win.add_event_listener_with_callback("pagehide", on_pagehide.unchecked_ref())?;

        log::info!("🎯 [APP] {} listeners registrados", self.lifetime.listener_count());
        Ok(())
    }

    fn on_list_click(&self, event: &Event) {
        let control = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|t| t.closest("[data-action]").ok().flatten());
        let Some(control) = control else {
            return;
        };
        let Some(action) = control.get_attribute("data-action").as_deref().and_then(ProductAction::parse) else {
            return;
        };
        let id = control
            .get_attribute("data-id")
            .or_else(|| {
                control
                    .closest(".product-card")
                    .ok()
                    .flatten()
                    .and_then(|card| card.get_attribute("data-id"))
            })
            .unwrap_or_default();
        event.prevent_default();
        self.dispatch(action, &id, &control);
    }

    /// Tabla de despacho de las acciones de tarjeta
    fn dispatch(&self, action: ProductAction, id: &str, control: &Element) {
        log::debug!("👆 [APP] {} {}", action.as_str(), id);
        let result = match action {
            ProductAction::Edit => self.open_edit(id),
            ProductAction::Delete => self.open_delete(id),
            ProductAction::ToggleDetails => self.toggle_details(id, control),
            ProductAction::CopySerial => {
                self.copy_serial(control);
                Ok(())
            }
        };
        if let Err(e) = result {
            log::error!("❌ [APP] Acción {} falló: {:?}", action.as_str(), e);
            notify(Notification::error(GENERIC_FAILURE));
        }
    }

    // ========================================================================
    // ACCIONES DE TARJETA
    // ========================================================================

    fn open_edit(&self, id: &str) -> Result<(), JsValue> {
        let Some(product) = self.registry.find(id) else {
            notify(AppError::NotFound(id.to_string()).to_notification());
            return Ok(());
        };
        *self.state.editing_id.borrow_mut() = Some(product.id.clone());
        clear_field_errors()?;
        fill_form(FormScope::Edit, &ProductForm::from_product(&product));
        set_input_value(EDIT_PRODUCT_ID, &product.id);
        for preset in query_selector_all(WARRANTY_PRESET_SELECTOR)? {
            preset.class_list().remove_1("active")?;
        }
        update_warranty_preview();
        update_char_counter(FormScope::Edit);
        show_modal(EDIT_MODAL_ID)
    }

    fn open_delete(&self, id: &str) -> Result<(), JsValue> {
        let Some(product) = self.registry.find(id) else {
            notify(AppError::NotFound(id.to_string()).to_notification());
            return Ok(());
        };
        *self.state.deleting_id.borrow_mut() = Some(product.id.clone());
        if let Some(label) = get_element_by_id(DELETE_PRODUCT_NAME_ID) {
            label.set_text_content(Some(&product.name));
        }
        show_modal(DELETE_MODAL_ID)
    }

    fn toggle_details(&self, id: &str, control: &Element) -> Result<(), JsValue> {
        let open = self.state.toggle_expanded(id);
        if let Some(card) = control.closest(".product-card")? {
            set_details_open(&card, open)?;
        }
        Ok(())
    }

    fn copy_serial(&self, control: &Element) {
        let Some(serial) = control.get_attribute("data-copy").filter(|s| !s.is_empty()) else {
            return;
        };
        spawn_local(async move {
            match write_clipboard(&serial).await {
                Ok(()) => notify(Notification::success("Serial number copied")),
                Err(e) => {
                    log::warn!("⚠️ [APP] Portapapeles no disponible: {:?}", e);
                    notify(Notification::error("Could not copy to clipboard"));
                }
            }
        });
    }

    fn apply_warranty_preset(&self, button: &Element) {
        let Some(months) = button.get_attribute("data-months") else {
            return;
        };
        set_input_value(&FormScope::Edit.input_id("warrantyPeriod"), &months);
        update_warranty_preview();
        let result = query_selector_all(WARRANTY_PRESET_SELECTOR).and_then(|presets| {
            for preset in presets {
                preset.class_list().remove_1("active")?;
            }
            button.class_list().add_1("active")
        });
        log_dom_error(result);
    }

    // ========================================================================
    // FORMULARIOS Y DATOS
    // ========================================================================

    fn report_error(&self, scope: FormScope, error: &AppError) {
        log::error!("❌ [APP] {}", error);
        if let AppError::Validation(errors) = error {
            log_dom_error(show_field_errors(scope, errors));
        }
        notify(error.to_notification());
    }

    fn write_notice(outcome: WriteOutcome, applied: &str) -> Notification {
        match outcome {
            WriteOutcome::Applied => Notification::success(applied),
            WriteOutcome::Queued => Notification::info("Saved offline, it will sync when the connection returns"),
        }
    }

    fn handle_add(&self) {
        let form = read_form(FormScope::Add);
        log_dom_error(clear_field_errors());
        let app = self.clone();
        spawn_local(async move {
            match app.registry.add_product(&form, &Now::current()).await {
                Ok((product, outcome)) => {
                    log::info!("➕ [APP] Producto añadido: {}", product.id);
                    reset_form(PRODUCT_FORM_ID);
                    update_char_counter(FormScope::Add);
                    notify(Self::write_notice(outcome, "Product added!"));
                }
                Err(e) => app.report_error(FormScope::Add, &e),
            }
            app.render_or_notify();
        });
    }

    fn handle_update(&self) {
        let id = self
            .state
            .editing_id
            .borrow()
            .clone()
            .unwrap_or_else(|| input_value(EDIT_PRODUCT_ID));
        if id.is_empty() {
            return;
        }
        let form = read_form(FormScope::Edit);
        log_dom_error(clear_field_errors());
        let app = self.clone();
        spawn_local(async move {
            match app.registry.update_product(&id, &form, &Now::current()).await {
                Ok((_, outcome)) => {
                    *app.state.editing_id.borrow_mut() = None;
                    log_dom_error(close_modals());
                    notify(Self::write_notice(outcome, "Product updated!"));
                }
                Err(e) => app.report_error(FormScope::Edit, &e),
            }
            app.render_or_notify();
        });
    }

    fn handle_delete(&self) {
        let Some(id) = self.state.deleting_id.borrow_mut().take() else {
            return;
        };
        log_dom_error(close_modals());
        let app = self.clone();
        spawn_local(async move {
            match app.registry.delete_product(&id).await {
                Ok(outcome) => notify(Self::write_notice(outcome, "Product deleted!")),
                Err(e) => app.report_error(FormScope::Add, &e),
            }
            app.render_or_notify();
        });
    }

    fn handle_theme_change(&self) {
        let theme = Theme::parse(&input_value(THEME_SELECT_ID));
        self.state.theme.set(theme);
        log_dom_error(apply_theme(theme));
        match save_theme(theme) {
            Ok(()) => notify(Notification::success(format!("Switched to {} theme", theme.label()))),
            Err(e) => {
                log::error!("❌ [APP] {}", e);
                notify(e.to_notification());
            }
        }
    }

    fn handle_export(&self) {
        let filename = self.registry.export_filename(Now::current().today());
        let result = self
            .registry
            .export_json()
            .map_err(|e| e.to_notification())
            .and_then(|json| {
                download_json(&filename, &json).map_err(|e| {
                    log::error!("❌ [APP] Descarga fallida: {:?}", e);
                    Notification::error(GENERIC_FAILURE)
                })
            });
        match result {
            Ok(()) => notify(Notification::success("Data exported!")),
            Err(notice) => notify(notice),
        }
    }

    fn handle_import(&self, event: &Event) {
        let Some(input) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        // Permite volver a elegir el mismo archivo
        input.set_value("");

        let app = self.clone();
        spawn_local(async move {
            let text = match read_file_text(&file).await {
                Ok(text) => text,
                Err(e) => {
                    log::error!("❌ [APP] Lectura del archivo fallida: {:?}", e);
                    notify(Notification::error("Could not read the selected file"));
                    return;
                }
            };
            match app.registry.import_json(&text, &Now::current()).await {
                Ok(report) => {
                    log::info!(
                        "📥 [APP] Import: {} productos ({} en cola, {} fallidos)",
                        report.imported,
                        report.queued,
                        report.failed.len()
                    );
                    notify(Notification::success(format!("Imported {} products", report.imported)));
                    if !report.failed.is_empty() {
                        for (id, error) in &report.failed {
                            log::error!("❌ [APP] Import {}: {}", id, error);
                        }
                        notify(Notification::warning(format!(
                            "{} products could not be imported",
                            report.failed.len()
                        )));
                    }
                }
                Err(e) => app.report_error(FormScope::Add, &e),
            }
            app.render_or_notify();
        });
    }

    fn handle_clear(&self) {
        let confirmed = window()
            .and_then(|w| w.confirm_with_message("Delete all product data? This cannot be undone.").ok())
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        let app = self.clone();
        spawn_local(async move {
            match app.registry.clear_all().await {
                Ok(()) => {
                    app.state.expanded.borrow_mut().clear();
                    notify(Notification::success("All data cleared!"));
                }
                Err(e) => app.report_error(FormScope::Add, &e),
            }
            app.render_or_notify();
        });
    }
}

/// Recalcula la vista previa de garantía del modal de edición
fn update_warranty_preview() {
    let Some(target) = get_element_by_id(EDIT_WARRANTY_INFO_ID) else {
        return;
    };
    let date = NaiveDate::parse_from_str(input_value(&FormScope::Edit.input_id("purchaseDate")).trim(), "%Y-%m-%d");
    let months = input_value(&FormScope::Edit.input_id("warrantyPeriod")).trim().parse::<i64>();
    match (date, months) {
        (Ok(date), Ok(months)) => {
            let info = warranty::compute(date, months, Now::current().local);
            target.set_inner_html(&warranty_preview_html(&info));
        }
        _ => target.set_inner_html(""),
    }
}

/// `event.message` / `event.reason` leído con Reflect (sin features extra)
fn event_detail(event: &Event, field: &str) -> String {
    match js_sys::Reflect::get(event, &JsValue::from_str(field)) {
        Ok(value) => value.as_string().unwrap_or_else(|| format!("{:?}", value)),
        Err(_) => String::from("unknown"),
    }
}

fn log_dom_error(result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("⚠️ [DOM] {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_sequence_order() {
        assert_eq!(STARTUP_SEQUENCE[0], StartupStep::ApplyTheme);
        assert_eq!(STARTUP_SEQUENCE[2], StartupStep::ConnectStore);
        assert_eq!(STARTUP_SEQUENCE[5], StartupStep::StartCacheCleanup);
        let connect = STARTUP_SEQUENCE.iter().position(|s| *s == StartupStep::ConnectStore);
        let subscribe = STARTUP_SEQUENCE.iter().position(|s| *s == StartupStep::Subscribe);
        assert!(connect < subscribe);
    }
}
