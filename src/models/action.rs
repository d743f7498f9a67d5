// ============================================================================
// ACCIONES DE UI - Identificadores explícitos en `data-action`
// ============================================================================
// Las tarjetas nunca se interpretan por su texto o clases: cada control lleva
// `data-action` + `data-id` y un único listener delegado decodifica aquí.
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductAction {
    Edit,
    Delete,
    ToggleDetails,
    CopySerial,
}

impl ProductAction {
    pub const ALL: [ProductAction; 4] = [
        ProductAction::Edit,
        ProductAction::Delete,
        ProductAction::ToggleDetails,
        ProductAction::CopySerial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductAction::Edit => "edit",
            ProductAction::Delete => "delete",
            ProductAction::ToggleDetails => "toggle-details",
            ProductAction::CopySerial => "copy-serial",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_decodes_from_its_attribute() {
        for action in ProductAction::ALL {
            assert_eq!(ProductAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_labels_are_not_actions() {
        assert_eq!(ProductAction::parse("Edit"), None);
        assert_eq!(ProductAction::parse("删除"), None);
        assert_eq!(ProductAction::parse(""), None);
    }
}
