// ============================================================================
// WARRANTY - Cálculo de estado de garantía (función pura)
// ============================================================================

use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Días restantes a partir de los cuales una garantía pasa a "expiring"
pub const EXPIRING_THRESHOLD_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarrantyStatus {
    Unknown,
    Valid,
    Expiring,
    Expired,
}

impl WarrantyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarrantyStatus::Unknown => "unknown",
            WarrantyStatus::Valid => "valid",
            WarrantyStatus::Expiring => "expiring",
            WarrantyStatus::Expired => "expired",
        }
    }

    /// Valor del `<select>` de filtro ("" = sin filtro)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unknown" => Some(WarrantyStatus::Unknown),
            "valid" => Some(WarrantyStatus::Valid),
            "expiring" => Some(WarrantyStatus::Expiring),
            "expired" => Some(WarrantyStatus::Expired),
            _ => None,
        }
    }

    /// Clase CSS del badge
    pub fn css_class(&self) -> &'static str {
        match self {
            WarrantyStatus::Valid => "warranty-valid",
            WarrantyStatus::Expiring => "warranty-expiring",
            WarrantyStatus::Expired | WarrantyStatus::Unknown => "warranty-expired",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WarrantyInfo {
    pub status: WarrantyStatus,
    pub text: String,
    pub end_date: Option<NaiveDate>,
    pub days_left: Option<i64>,
}

/// Fecha de fin de garantía. Suma meses de calendario con la semántica de
/// chrono: el día se recorta al último día del mes destino (31 ene + 1 = 29 feb).
pub fn end_date(purchase_date: NaiveDate, warranty_months: i64) -> Option<NaiveDate> {
    let months = u32::try_from(warranty_months).ok().filter(|m| *m > 0)?;
    purchase_date.checked_add_months(Months::new(months))
}

/// Estado de garantía en el instante `now` (hora local del navegador)
pub fn compute(purchase_date: NaiveDate, warranty_months: i64, now: NaiveDateTime) -> WarrantyInfo {
    let Some(end) = end_date(purchase_date, warranty_months) else {
        return WarrantyInfo {
            status: WarrantyStatus::Unknown,
            text: "no warranty info".to_string(),
            end_date: None,
            days_left: None,
        };
    };

    // ceil((fin - ahora) / 1 día)
    let remaining = end.and_hms_opt(0, 0, 0).unwrap_or_default() - now;
    let seconds = remaining.num_seconds();
    let days_left = seconds.div_euclid(SECONDS_PER_DAY)
        + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0);

    let (status, text) = if days_left < 0 {
        (WarrantyStatus::Expired, "expired".to_string())
    } else if days_left <= EXPIRING_THRESHOLD_DAYS {
        (WarrantyStatus::Expiring, format!("{} days until expiry", days_left))
    } else {
        (WarrantyStatus::Valid, format!("{} days until expiry", days_left))
    };

    WarrantyInfo {
        status,
        text,
        end_date: Some(end),
        days_left: Some(days_left),
    }
}
