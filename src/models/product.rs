// ============================================================================
// PRODUCT - Registro de producto + validación en los bordes
// ============================================================================
// El mismo esquema se usa para formulario, importación y lectura remota.
// Nada entra a la caché sin pasar por aquí.
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Longitud máxima de las notas (en caracteres, no bytes)
pub const NOTES_MAX_CHARS: usize = 500;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub warranty_period: u32,
    #[serde(default)]
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Token de versión para la caché de render
    pub fn version_token(&self) -> String {
        self.updated_at.to_rfc3339()
    }

    /// Campos de texto sobre los que actúa la búsqueda
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(
            [
                &self.brand,
                &self.model,
                &self.category,
                &self.serial_number,
                &self.store,
                &self.notes,
            ]
            .into_iter()
            .filter_map(|f| f.as_deref()),
        )
    }

    /// Construye un producto nuevo a partir de un borrador ya validado
    pub fn create(id: String, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            brand: draft.brand,
            model: draft.model,
            category: draft.category,
            serial_number: draft.serial_number,
            store: draft.store,
            notes: draft.notes,
            purchase_date: draft.purchase_date,
            warranty_period: draft.warranty_period,
            price: draft.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Aplica un borrador sobre el producto existente (mismo id y createdAt)
    pub fn apply(&self, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        let mut updated = Self::create(self.id.clone(), draft, now);
        updated.created_at = self.created_at;
        // updatedAt >= createdAt aunque el reloj local vaya hacia atrás
        if updated.updated_at < updated.created_at {
            updated.updated_at = updated.created_at;
        }
        updated
    }

    /// Comprueba los invariantes de un registro que viene de fuera
    /// (importación o lectura remota)
    pub fn check(&self, today: NaiveDate) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.id.trim().is_empty() {
            errors.push(FieldError::new(Field::Id, "id is required"));
        } else if !is_store_key(&self.id) {
            errors.push(FieldError::new(Field::Id, "id contains characters not allowed in a store key"));
        }
        if self.name.trim().is_empty() {
            errors.push(FieldError::new(Field::Name, "product name is required"));
        }
        if self.purchase_date > today {
            errors.push(FieldError::new(
                Field::PurchaseDate,
                "purchase date cannot be in the future",
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.push(FieldError::new(Field::Price, "price must be a non-negative number"));
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > NOTES_MAX_CHARS {
                errors.push(FieldError::new(Field::Notes, "notes cannot exceed 500 characters"));
            }
        }
        if self.updated_at < self.created_at {
            errors.push(FieldError::new(Field::UpdatedAt, "updatedAt precedes createdAt"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Caracteres que la base realtime no admite en una clave, más los que
/// romperían la URL REST (`?`)
const FORBIDDEN_KEY_CHARS: [char; 7] = ['.', '$', '#', '[', ']', '/', '?'];
/// Límite de Firebase para una clave, en bytes UTF-8
const MAX_KEY_BYTES: usize = 768;

/// El id se usa tal cual como clave hija en la ruta del store
pub fn is_store_key(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_KEY_BYTES
        && !id.chars().any(|c| c.is_control() || FORBIDDEN_KEY_CHARS.contains(&c))
}

/// Campo del formulario (o del registro) al que se asocia un error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    PurchaseDate,
    WarrantyPeriod,
    Price,
    Notes,
    UpdatedAt,
}

impl Field {
    /// Sufijo del id del input en el DOM ("productName" / "editProductName")
    pub fn input_id(&self) -> &'static str {
        match self {
            Field::Id => "productId",
            Field::Name => "productName",
            Field::PurchaseDate => "purchaseDate",
            Field::WarrantyPeriod => "warrantyPeriod",
            Field::Price => "price",
            Field::Notes => "notes",
            Field::UpdatedAt => "updatedAt",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field.input_id(), self.message)
    }
}

/// Valores crudos tal como vienen del formulario
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub serial_number: String,
    pub purchase_date: String,
    pub warranty_period: String,
    pub price: String,
    pub store: String,
    pub notes: String,
}

/// Producto validado, sin id ni timestamps
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub store: Option<String>,
    pub notes: Option<String>,
    pub purchase_date: NaiveDate,
    pub warranty_period: u32,
    pub price: f64,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ProductForm {
    /// Valida el formulario y devuelve todos los errores de una vez
    pub fn validate(&self, today: NaiveDate) -> Result<ProductDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new(Field::Name, "product name is required"));
        }

        let purchase_date = match self.purchase_date.trim() {
            "" => {
                errors.push(FieldError::new(Field::PurchaseDate, "purchase date is required"));
                None
            }
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) if date > today => {
                    errors.push(FieldError::new(
                        Field::PurchaseDate,
                        "purchase date cannot be in the future",
                    ));
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new(Field::PurchaseDate, "invalid purchase date"));
                    None
                }
            },
        };

        // Vacío = 0 meses
        let warranty_period = match self.warranty_period.trim() {
            "" => 0,
            raw => match raw.parse::<i64>() {
                Ok(months) if months >= 0 => u32::try_from(months).unwrap_or(u32::MAX),
                _ => {
                    errors.push(FieldError::new(
                        Field::WarrantyPeriod,
                        "warranty period must be a non-negative number",
                    ));
                    0
                }
            },
        };

        let price = match self.price.trim() {
            "" => 0.0,
            raw => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => value,
                _ => {
                    errors.push(FieldError::new(Field::Price, "price must be a non-negative number"));
                    0.0
                }
            },
        };

        if self.notes.chars().count() > NOTES_MAX_CHARS {
            errors.push(FieldError::new(Field::Notes, "notes cannot exceed 500 characters"));
        }

        match purchase_date {
            Some(purchase_date) if errors.is_empty() => Ok(ProductDraft {
                name: name.to_string(),
                brand: optional(&self.brand),
                model: optional(&self.model),
                category: optional(&self.category),
                serial_number: optional(&self.serial_number),
                store: optional(&self.store),
                notes: optional(&self.notes),
                purchase_date,
                warranty_period,
                price,
            }),
            _ => Err(errors),
        }
    }

    /// Rellena el formulario con un producto existente (modal de edición)
    pub fn from_product(product: &Product) -> Self {
        let text = |f: &Option<String>| f.clone().unwrap_or_default();
        Self {
            name: product.name.clone(),
            brand: text(&product.brand),
            model: text(&product.model),
            category: text(&product.category),
            serial_number: text(&product.serial_number),
            purchase_date: product.purchase_date.format("%Y-%m-%d").to_string(),
            warranty_period: if product.warranty_period == 0 {
                String::new()
            } else {
                product.warranty_period.to_string()
            },
            price: if product.price == 0.0 {
                String::new()
            } else {
                product.price.to_string()
            },
            store: text(&product.store),
            notes: text(&product.notes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn kettle_form() -> ProductForm {
        ProductForm {
            name: "Kettle".into(),
            brand: "Acme".into(),
            purchase_date: "2024-06-01".into(),
            warranty_period: "12".into(),
            price: "49.90".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_form_trims_and_drops_empty_optionals() {
        let mut form = kettle_form();
        form.name = "  Kettle ".into();
        form.model = "   ".into();
        let draft = form.validate(today()).unwrap();
        assert_eq!(draft.name, "Kettle");
        assert_eq!(draft.brand.as_deref(), Some("Acme"));
        assert_eq!(draft.model, None);
        assert_eq!(draft.warranty_period, 12);
        assert_eq!(draft.price, 49.9);
    }

    #[test]
    fn test_collects_every_field_error() {
        let form = ProductForm {
            name: "".into(),
            purchase_date: "2030-01-01".into(),
            warranty_period: "-3".into(),
            price: "abc".into(),
            notes: "x".repeat(501),
            ..Default::default()
        };
        let errors = form.validate(today()).unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::Name,
                Field::PurchaseDate,
                Field::WarrantyPeriod,
                Field::Price,
                Field::Notes
            ]
        );
    }

    #[test]
    fn test_missing_purchase_date_is_an_error() {
        let mut form = kettle_form();
        form.purchase_date = String::new();
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(errors, vec![FieldError::new(Field::PurchaseDate, "purchase date is required")]);
    }

    #[test]
    fn test_notes_limit_counts_chars() {
        let mut form = kettle_form();
        form.notes = "é".repeat(500);
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn test_apply_keeps_id_and_created_at() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
        let original = Product::create("abc".into(), kettle_form().validate(today()).unwrap(), t0);

        let mut form = ProductForm::from_product(&original);
        form.name = "Kettle Pro".into();
        let updated = original.apply(form.validate(today()).unwrap(), t1);

        assert_eq!(updated.id, "abc");
        assert_eq!(updated.created_at, t0);
        assert_eq!(updated.updated_at, t1);
        assert_eq!(updated.name, "Kettle Pro");
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let product = Product::create("abc".into(), kettle_form().validate(today()).unwrap(), t0);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["purchaseDate"], "2024-06-01");
        assert_eq!(json["warrantyPeriod"], 12);
        assert!(json.get("serialNumber").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_check_rejects_inverted_timestamps() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let mut product = Product::create("abc".into(), kettle_form().validate(today()).unwrap(), t0);
        product.updated_at = t0 - chrono::Duration::days(1);
        let errors = product.check(today()).unwrap_err();
        assert_eq!(errors[0].field, Field::UpdatedAt);
    }
}
