// Persistencia local: solo el tema seleccionado

use gloo_storage::{LocalStorage, Storage};

use crate::error::{AppError, AppResult};
use crate::models::theme::Theme;

pub const THEME_STORAGE_KEY: &str = "selectedTheme";

/// Tema guardado, o el por defecto si no hay ninguno (o no hay storage)
pub fn load_theme() -> Theme {
    LocalStorage::raw()
        .get_item(THEME_STORAGE_KEY)
        .ok()
        .flatten()
        .map(|value| Theme::parse(&value))
        .unwrap_or_default()
}

pub fn save_theme(theme: Theme) -> AppResult<()> {
    LocalStorage::raw()
        .set_item(THEME_STORAGE_KEY, theme.as_str())
        .map_err(|e| AppError::Storage(format!("{:?}", e)))
}
