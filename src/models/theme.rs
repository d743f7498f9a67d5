use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Nature,
    Purple,
    Orange,
    Pink,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Nature => "nature",
            Theme::Purple => "purple",
            Theme::Orange => "orange",
            Theme::Pink => "pink",
        }
    }

    /// Nombres desconocidos caen al tema por defecto
    pub fn parse(value: &str) -> Self {
        match value {
            "purple" => Theme::Purple,
            "orange" => Theme::Orange,
            "pink" => Theme::Pink,
            _ => Theme::Nature,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Nature => "Nature green",
            Theme::Purple => "Elegant purple",
            Theme::Orange => "Vibrant orange",
            Theme::Pink => "Warm pink",
        }
    }
}
