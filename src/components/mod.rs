pub mod childlist_field;
pub mod dialogs;
pub mod hooks;
pub mod ui;

pub use childlist_field::ChildlistField;
pub use dialogs::{AlertBanner, ModalOutlet};
