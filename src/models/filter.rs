use chrono::NaiveDateTime;

use crate::models::product::Product;
use crate::models::warranty::{self, WarrantyStatus};

/// Criterios activos de búsqueda / filtro
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub category: String,
    pub warranty: Option<WarrantyStatus>,
}

impl FilterCriteria {
    pub fn new(search: &str, category: &str, warranty: &str) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            category: category.to_string(),
            warranty: WarrantyStatus::parse(warranty),
        }
    }

    /// Codificación en texto de los criterios: clave de memoización del filtro
    pub fn key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.search,
            self.category,
            self.warranty.map(|w| w.as_str()).unwrap_or("")
        )
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category.is_empty() && self.warranty.is_none()
    }

    pub fn matches(&self, product: &Product, now: NaiveDateTime) -> bool {
        let matches_search = self.search.is_empty()
            || product
                .searchable_fields()
                .any(|field| field.to_lowercase().contains(&self.search));

        let matches_category = self.category.is_empty()
            || product.category.as_deref() == Some(self.category.as_str());

        let matches_warranty = match self.warranty {
            None => true,
            Some(wanted) => {
                let info = warranty::compute(
                    product.purchase_date,
                    i64::from(product.warranty_period),
                    now,
                );
                info.status == wanted
            }
        };

        matches_search && matches_category && matches_warranty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn product(name: &str, category: Option<&str>, serial: Option<&str>) -> Product {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Product {
            id: name.to_lowercase(),
            name: name.into(),
            brand: Some("Acme".into()),
            model: None,
            category: category.map(String::from),
            serial_number: serial.map(String::from),
            store: None,
            notes: None,
            purchase_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            warranty_period: 12,
            price: 10.0,
            created_at: t,
            updated_at: t,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_key_encodes_all_criteria() {
        let criteria = FilterCriteria::new("  KeTTle ", "kitchen", "expiring");
        assert_eq!(criteria.key(), "kettle_kitchen_expiring");
        assert_eq!(FilterCriteria::default().key(), "__");
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let p = product("Kettle", Some("Kitchen"), Some("SN-9981"));
        assert!(FilterCriteria::new("sn-99", "", "").matches(&p, now()));
        assert!(FilterCriteria::new("ACME", "", "").matches(&p, now()));
        assert!(!FilterCriteria::new("toaster", "", "").matches(&p, now()));
    }

    #[test]
    fn test_search_treats_regex_chars_literally() {
        let p = product("Cable (USB-C)", None, None);
        assert!(FilterCriteria::new("(usb-c)", "", "").matches(&p, now()));
        assert!(!FilterCriteria::new(".*", "", "").matches(&p, now()));
    }

    #[test]
    fn test_category_and_warranty_filters() {
        let p = product("Kettle", Some("Kitchen"), None);
        assert!(FilterCriteria::new("", "Kitchen", "expiring").matches(&p, now()));
        assert!(!FilterCriteria::new("", "Garden", "").matches(&p, now()));
        assert!(!FilterCriteria::new("", "", "valid").matches(&p, now()));
    }
}
