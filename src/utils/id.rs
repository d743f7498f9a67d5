// ============================================================================
// IDS DE PRODUCTO
// ============================================================================
// `<millis en base36><11 caracteres aleatorios>`: ordenables por creación y
// sin colisiones prácticas entre pestañas.
// ============================================================================

use chrono::{DateTime, Utc};
use uuid::Uuid;

const RANDOM_SUFFIX_LEN: usize = 11;

pub fn generate_id(now: DateTime<Utc>) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(RANDOM_SUFFIX_LEN)
        .collect();
    format!("{}{}", to_base36(millis), suffix)
}

pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
