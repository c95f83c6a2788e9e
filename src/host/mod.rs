//! What the field needs from the editor host: modal dialogs that resume with a result,
//! fire-and-forget notifications, alerts and list re-rendering.

use crate::child_set::FieldRender;
use serde::{Deserialize, Serialize};

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ModalKind {
    AddChild,
    ContentEditor,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModalRequest {
    pub kind: ModalKind,
    pub url: String,
    pub width: String,
    pub height: String,

    /// Serialized resume token. `None` for modals nobody waits on.
    #[serde(default)]
    pub resume: Option<String>,
}

impl ModalRequest {
    pub fn is_resumable(&self) -> bool {
        self.resume.is_some()
    }
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr,
)]
pub enum NotificationKind {
    #[strum(serialize = "item:load")]
    Reload,
    #[strum(serialize = "item:refreshchildren")]
    RefreshChildren,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub item_id: String,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(id={})", self.kind, self.item_id)
    }
}

/// Side effects produced by the field and its workflow, applied in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    OpenModal(ModalRequest),
    Notify(Notification),
    Alert(String),
    Render(FieldRender),
    /// Reset the hidden selection input of a field.
    ClearSelection(String),
}

pub trait Host {
    fn open_modal(&mut self, request: ModalRequest);
    fn send_notification(&mut self, notification: Notification);
    fn alert(&mut self, message: &str);
    fn render(&mut self, render: FieldRender);
    fn clear_selection(&mut self, selected_id_field: &str);
}

pub fn apply_effects<H: Host + ?Sized>(host: &mut H, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::OpenModal(req) => {
                log::debug!("open modal {} {}", req.kind, req.url);
                host.open_modal(req);
            }
            Effect::Notify(n) => {
                log::debug!("notify {n}");
                host.send_notification(n);
            }
            Effect::Alert(msg) => {
                log::info!("alert: {msg}");
                host.alert(&msg);
            }
            Effect::Render(render) => host.render(render),
            Effect::ClearSelection(field) => host.clear_selection(&field),
        }
    }
}

/// Host that records every call. Used by tests and for headless embedding.
#[derive(Clone, Debug, Default)]
pub struct RecordingHost {
    pub modals: Vec<ModalRequest>,
    pub notifications: Vec<Notification>,
    pub alerts: Vec<String>,
    pub renders: Vec<FieldRender>,
    pub cleared: Vec<String>,
}

impl RecordingHost {
    pub fn last_render(&self) -> Option<&FieldRender> {
        self.renders.last()
    }
}

impl Host for RecordingHost {
    fn open_modal(&mut self, request: ModalRequest) {
        self.modals.push(request);
    }

    fn send_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn render(&mut self, render: FieldRender) {
        self.renders.push(render);
    }

    fn clear_selection(&mut self, selected_id_field: &str) {
        self.cleared.push(selected_id_field.to_string());
    }
}
