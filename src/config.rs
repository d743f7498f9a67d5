use serde::{Deserialize, Serialize};

/// Configuración de conexión con el store (opaca para el resto de la app)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub collection_path: String,
    pub connect_timeout_seconds: u32,
    pub enable_logging: bool,
    pub ui_config: UIConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "http://localhost:9000".to_string(),
            project_id: "product-registry".to_string(),
            api_key: None,
            collection_path: "products".to_string(),
            connect_timeout_seconds: 10,
            enable_logging: true,
            ui_config: UIConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    pub search_debounce_ms: u32,
    pub scroll_throttle_ms: u32,
    /// A partir de cuántos productos se activa el scroll virtual
    pub virtual_scroll_threshold: usize,
    pub item_height_px: f64,
    pub overscan_items: usize,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 300,
            scroll_throttle_ms: 16,
            virtual_scroll_threshold: 50,
            item_height_px: 300.0,
            overscan_items: 5,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    /// (build.rs las toma del .env)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: option_env!("REGISTRY_DATABASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.database_url),
            project_id: option_env!("REGISTRY_PROJECT_ID")
                .map(String::from)
                .unwrap_or(defaults.project_id),
            api_key: option_env!("REGISTRY_API_KEY")
                .filter(|s| !s.is_empty())
                .map(String::from),
            collection_path: option_env!("REGISTRY_COLLECTION_PATH")
                .map(|s| s.trim_matches('/').to_string())
                .unwrap_or(defaults.collection_path),
            connect_timeout_seconds: option_env!("REGISTRY_CONNECT_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.connect_timeout_seconds),
            enable_logging: option_env!("REGISTRY_ENABLE_LOGGING")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enable_logging),
            ui_config: defaults.ui_config,
        }
    }

    /// URL REST de la colección o de un hijo (`{db}/{path}[/{id}].json`)
    pub fn collection_url(&self, child: Option<&str>) -> String {
        let mut url = match child {
            Some(id) => format!("{}/{}/{}.json", self.database_url, self.collection_path, id),
            None => format!("{}/{}.json", self.database_url, self.collection_path),
        };
        if let Some(key) = &self.api_key {
            url.push_str("?auth=");
            url.push_str(key);
        }
        url
    }

    pub fn connect_timeout_ms(&self) -> u32 {
        self.connect_timeout_seconds.saturating_mul(1000)
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
