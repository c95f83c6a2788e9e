use crate::child_set::FieldRender;
use crate::config::{EditorUrls, EnvConfig};
use crate::controller::{ChildlistFieldController, FieldContext};
use crate::host::{Host, ModalRequest, Notification};
use crate::repository::memory::fixtures;
use crate::repository::MemoryRepository;
use crate::storage::{load_repository, remove_from_storage, save_repository, REPOSITORY_KEY};
use leptos::prelude::*;

/// The browser side of [`Host`]: every call lands in a signal the UI watches.
#[derive(Clone, Copy)]
pub(crate) struct SignalHost {
    /// The one open modal. Modals do not stack.
    pub modal: RwSignal<Option<ModalRequest>>,
    pub alert: RwSignal<Option<String>>,
    pub render: RwSignal<Option<FieldRender>>,

    /// Mirrors the hidden `<widget>_selectedId` input.
    pub selected_id: RwSignal<String>,

    /// Pending notifications, drained by the item page.
    pub notifications: RwSignal<Vec<Notification>>,

    /// Bumped to make the field re-read its children.
    pub refresh: RwSignal<u64>,
}

impl SignalHost {
    fn new() -> Self {
        Self {
            modal: RwSignal::new(None),
            alert: RwSignal::new(None),
            render: RwSignal::new(None),
            selected_id: RwSignal::new(String::new()),
            notifications: RwSignal::new(vec![]),
            refresh: RwSignal::new(0),
        }
    }
}

impl Host for SignalHost {
    fn open_modal(&mut self, request: ModalRequest) {
        if let Some(open) = self.modal.get_untracked() {
            log::warn!("replacing open modal {} with {}", open.kind, request.kind);
        }
        self.modal.set(Some(request));
    }

    fn send_notification(&mut self, notification: Notification) {
        self.notifications.update(|q| q.push(notification));
    }

    fn alert(&mut self, message: &str) {
        self.alert.set(Some(message.to_string()));
    }

    fn render(&mut self, render: FieldRender) {
        self.render.set(Some(render));
    }

    fn clear_selection(&mut self, _selected_id_field: &str) {
        self.selected_id.set(String::new());
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,
    pub urls: StoredValue<EditorUrls>,

    /// Shared content tree. Snapshotted to localStorage after every command so the editor
    /// iframe and the page see the same data.
    pub repository: StoredValue<MemoryRepository>,

    pub host: SignalHost,

    /// Context of the field that last sent a command; modal results resume against it.
    pub active_field: StoredValue<Option<FieldContext>>,
}

impl AppState {
    pub fn new() -> Self {
        let config = EnvConfig::new();
        let repository = load_repository().unwrap_or_else(|| {
            log::info!("no stored content tree, seeding demo data");
            fixtures::demo()
        });

        Self {
            urls: StoredValue::new(config.urls()),
            config: StoredValue::new(config),
            repository: StoredValue::new(repository),
            host: SignalHost::new(),
            active_field: StoredValue::new(None),
        }
    }

    /// Run one controller cycle against the shared repository, then persist it.
    pub fn with_controller<F>(&self, field: FieldContext, f: F)
    where
        F: FnOnce(&mut ChildlistFieldController<'_, MemoryRepository, SignalHost>),
    {
        let mut host = self.host;
        let urls = self.urls.get_value();
        self.active_field.set_value(Some(field.clone()));
        self.repository.update_value(|repo| {
            let mut controller = ChildlistFieldController::new(repo, &mut host, &urls, field);
            f(&mut controller);
        });
        self.repository.with_value(save_repository);
    }

    /// Close the open modal and hand its result to the suspended workflow, if any.
    pub fn close_modal(&self, result: Option<String>) {
        let Some(request) = self.host.modal.get_untracked() else {
            return;
        };
        self.host.modal.set(None);

        // The editor runs in its own frame and writes straight to storage.
        if let Some(stored) = load_repository() {
            self.repository.set_value(stored);
        }

        let Some(token) = request.resume else {
            self.host.refresh.update(|n| *n += 1);
            return;
        };
        let Some(field) = self.active_field.get_value() else {
            log::warn!("modal {} closed with no field to resume", request.kind);
            return;
        };
        self.with_controller(field, |c| c.resume_workflow(&token, result.as_deref()));
    }

    pub fn reset_repository(&self) {
        remove_from_storage(REPOSITORY_KEY);
        let demo = fixtures::demo();
        save_repository(&demo);
        self.repository.set_value(demo);
        self.host.selected_id.set(String::new());
        self.host.refresh.update(|n| *n += 1);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
