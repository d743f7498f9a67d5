use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Instante actual en las dos vistas que usa la app: UTC para timestamps
/// persistidos, hora local para garantías y validación de fechas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Now {
    pub utc: DateTime<Utc>,
    pub local: NaiveDateTime,
}

impl Now {
    pub fn current() -> Self {
        Self {
            utc: Utc::now(),
            local: Local::now().naive_local(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.local.date()
    }

    pub fn millis(&self) -> i64 {
        self.utc.timestamp_millis()
    }
}
