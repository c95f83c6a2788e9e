//! Ordered child-list field for a hierarchical content editor.
//!
//! The core (`sort_order`, `child_set`, `workflow`, `controller`) is plain Rust over the
//! [`ContentRepository`] and [`Host`] traits. The Leptos app in `app`, `pages` and
//! `components` hosts one field per item page on top of an in-memory repository that is
//! persisted to localStorage.

mod app;
pub mod child_set;
mod components;
pub mod config;
pub mod controller;
pub mod host;
pub mod logging;
pub mod models;
mod pages;
pub mod repository;
pub mod sort_order;
mod state;
mod storage;
mod util;
pub mod workflow;

pub use child_set::{ChildSetView, FieldRender, SelectionState};
pub use config::{EditorUrls, EnvConfig};
pub use controller::{ChildlistError, ChildlistFieldController, Command, FieldContext, Message};
pub use host::{apply_effects, Effect, Host, ModalRequest, Notification, RecordingHost};
pub use models::{ContentNode, TemplateInfo};
pub use repository::{ContentRepository, MemoryRepository, RepositoryError};
pub use sort_order::{Direction, MoveOutcome, SortOrderManager};
pub use workflow::{DialogWorkflowController, WorkflowState};

use app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::repository::memory::fixtures::{demo, ROOT_ID};
    use crate::repository::{write_sort_order, ContentRepository};
    use crate::storage::{
        load_json_from_storage, load_repository, remove_from_storage, save_json_to_storage,
        save_repository, REPOSITORY_KEY,
    };
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_repository_snapshot_roundtrip() {
        remove_from_storage(REPOSITORY_KEY);
        assert!(load_repository().is_none());

        let mut repo = demo();
        let before = repo.get_children(ROOT_ID, "en").expect("children");
        write_sort_order(&mut repo, &before[1].id, "50").expect("write");
        save_repository(&repo);

        let loaded = load_repository().expect("should load repository from localStorage");
        assert_eq!(loaded.database_name(), "master");
        assert_eq!(
            loaded.get_children(ROOT_ID, "en").expect("children"),
            repo.get_children(ROOT_ID, "en").expect("children")
        );

        remove_from_storage(REPOSITORY_KEY);
        assert!(load_repository().is_none());
    }

    #[wasm_bindgen_test]
    fn test_unreadable_snapshot_is_discarded() {
        save_json_to_storage(REPOSITORY_KEY, &"not a repository");
        assert!(load_repository().is_none());
        assert_eq!(
            load_json_from_storage::<String>(REPOSITORY_KEY).as_deref(),
            Some("not a repository")
        );
        remove_from_storage(REPOSITORY_KEY);
    }
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init(&EnvConfig::new().log_level);
    mount_to_body(App);
}
