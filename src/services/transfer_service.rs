// ============================================================================
// IMPORT / EXPORT - Archivos JSON de productos
// ============================================================================
// Export: array JSON indentado de la lista completa.
// Import: todo el archivo se decodifica y valida ANTES de escribir nada;
// un solo elemento inválido rechaza el archivo entero.
// ============================================================================

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::product::Product;
use crate::utils::id::generate_id;

pub fn export_json(products: &[Product]) -> AppResult<String> {
    serde_json::to_string_pretty(products).map_err(|e| AppError::Storage(format!("export failed: {}", e)))
}

/// `products_YYYY-MM-DD.json`
pub fn export_filename(date: NaiveDate) -> String {
    format!("products_{}.json", date.format("%Y-%m-%d"))
}

/// Decodifica y valida un archivo de importación completo
pub fn parse_import(text: &str, now: DateTime<Utc>, today: NaiveDate) -> AppResult<Vec<Product>> {
    let items = match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items,
        _ => return Err(AppError::ImportFormat("top level must be an array".to_string())),
    };

    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(mut fields) = item else {
                return Err(AppError::ImportFormat(format!("item {} is not an object", index)));
            };

            let has_id = matches!(fields.get("id"), Some(Value::String(id)) if !id.trim().is_empty());
            if !has_id {
                fields.insert("id".to_string(), Value::String(generate_id(now)));
            }
            for key in ["createdAt", "updatedAt"] {
                if !matches!(fields.get(key), Some(Value::String(_))) {
                    fields.insert(key.to_string(), Value::String(timestamp.clone()));
                }
            }

            let product: Product = serde_json::from_value(Value::Object(fields))
                .map_err(|e| AppError::ImportFormat(format!("item {}: {}", index, e)))?;

            product.check(today).map_err(|errors| {
                let detail = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ");
                AppError::ImportFormat(format!("item {}: {}", index, detail))
            })?;

            Ok(product)
        })
        .collect()
}
