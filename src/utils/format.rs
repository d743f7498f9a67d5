// Formato de precios y fechas para las tarjetas

use chrono::NaiveDate;

/// `RM 12.50`; `-` cuando no hay precio
pub fn format_price(price: f64) -> String {
    if !price.is_finite() || price <= 0.0 {
        return "-".to_string();
    }
    format!("RM {:.2}", price)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}
