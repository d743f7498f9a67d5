pub mod product;
pub mod warranty;
pub mod filter;
pub mod sync;
pub mod action;
pub mod notification;
pub mod theme;

pub use product::{Field, FieldError, Product, ProductDraft, ProductForm};
pub use warranty::{WarrantyInfo, WarrantyStatus};
pub use filter::FilterCriteria;
pub use sync::{ConnectionState, DrainReport, PendingOperation, WriteOutcome};
pub use action::ProductAction;
pub use notification::{Notification, NotificationKind};
pub use theme::Theme;
