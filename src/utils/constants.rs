// Ids del documento que la app espera encontrar

pub const PRODUCT_LIST_ID: &str = "productsList";
pub const EMPTY_STATE_ID: &str = "emptyState";
pub const STATS_ID: &str = "totalProducts";
pub const SEARCH_INPUT_ID: &str = "searchInput";
pub const CATEGORY_FILTER_ID: &str = "categoryFilter";
pub const WARRANTY_FILTER_ID: &str = "warrantyFilter";
pub const THEME_SELECT_ID: &str = "themeSelect";

pub const PRODUCT_FORM_ID: &str = "productForm";
pub const EDIT_FORM_ID: &str = "editProductForm";
pub const EDIT_PRODUCT_ID: &str = "editProductId";
pub const EDIT_WARRANTY_INFO_ID: &str = "editWarrantyInfo";
pub const EDIT_MODAL_ID: &str = "editModal";
pub const DELETE_MODAL_ID: &str = "deleteModal";
pub const CONFIRM_DELETE_ID: &str = "confirmDelete";
pub const DELETE_PRODUCT_NAME_ID: &str = "deleteProductName";

pub const EXPORT_BUTTON_ID: &str = "exportBtn";
pub const IMPORT_BUTTON_ID: &str = "importBtn";
pub const IMPORT_FILE_ID: &str = "importFile";
pub const CLEAR_BUTTON_ID: &str = "clearDataBtn";
pub const NOTIFICATIONS_ID: &str = "notifications";
pub const CONNECTION_STATUS_ID: &str = "connectionStatus";

/// Botones de meses predefinidos en el modal de edición
pub const WARRANTY_PRESET_SELECTOR: &str = ".warranty-preset";
