//! Command dispatch for one childlist field.
//!
//! A controller lives for a single command cycle: it is built from the submitted form
//! (selection) and the explicit editing context, handles one message or one modal result,
//! pushes its effects to the host and is dropped.

use crate::child_set::{ChildSetView, FieldRender, SelectionState};
use crate::config::EditorUrls;
use crate::host::{apply_effects, Effect, Host, ModalKind, ModalRequest};
use crate::models::ContentNode;
use crate::repository::{ContentRepository, RepositoryError};
use crate::sort_order::{Direction, SortOrderManager};
use crate::workflow::{DialogWorkflowController, WorkflowError, EDITOR_DIALOG_SIZE};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const NO_SELECTION_MESSAGE: &str = "No element has been selected";
pub const ACCESS_DENIED_PREFIX: &str = "You did not have the necessary rights to edit this item: ";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
pub enum Command {
    #[strum(serialize = "childlist:moveup")]
    MoveUp,
    #[strum(serialize = "childlist:movedown")]
    MoveDown,
    #[strum(serialize = "childlist:edit")]
    Edit,
    #[strum(serialize = "childlist:add")]
    Add,
    #[strum(serialize = "childlist:remove")]
    Remove,
}

impl Command {
    pub fn needs_selection(self) -> bool {
        !matches!(self, Command::Add)
    }
}

/// Inbound host message: `name(key=value,...)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub params: BTreeMap<String, String>,
}

impl Message {
    pub fn command(command: Command, widget_id: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), widget_id.to_string());
        Self {
            name: command.to_string(),
            params,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (name, rest) = match raw.split_once('(') {
            Some((name, rest)) => (name, Some(rest.strip_suffix(')')?)),
            None => (raw, None),
        };
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut params = BTreeMap::new();
        for part in rest.into_iter().flat_map(|r| r.split(',')) {
            let Some((k, v)) = part.split_once('=') else {
                continue;
            };
            params.insert(k.trim().to_string(), v.trim().to_string());
        }
        Some(Self {
            name: name.to_string(),
            params,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}({params})", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChildlistError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl ChildlistError {
    /// The one alert shown for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ChildlistError::Repository(RepositoryError::AccessDenied(m))
            | ChildlistError::Workflow(WorkflowError::Repository(RepositoryError::AccessDenied(m))) => {
                format!("{ACCESS_DENIED_PREFIX}{m}")
            }
            other => other.to_string(),
        }
    }
}

/// Explicit editing context of one field instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldContext {
    pub widget_id: String,
    /// The item whose children the field lists.
    pub item_id: String,
    pub language: String,
    pub read_only: bool,
    pub selection: SelectionState,
}

pub struct ChildlistFieldController<'a, R: ?Sized, H: ?Sized> {
    repo: &'a mut R,
    host: &'a mut H,
    urls: &'a EditorUrls,
    field: FieldContext,
    workflow: DialogWorkflowController<'a>,
}

impl<'a, R, H> ChildlistFieldController<'a, R, H>
where
    R: ContentRepository + ?Sized,
    H: Host + ?Sized,
{
    pub fn new(repo: &'a mut R, host: &'a mut H, urls: &'a EditorUrls, field: FieldContext) -> Self {
        Self {
            repo,
            host,
            urls,
            field,
            workflow: DialogWorkflowController::new(urls),
        }
    }

    pub fn field(&self) -> &FieldContext {
        &self.field
    }

    /// Draw the field from a fresh read of the child list.
    pub fn render(&mut self) {
        match self.build_render() {
            Ok(render) => self.host.render(render),
            Err(e) => self.report(e),
        }
    }

    pub fn handle_message(&mut self, message: &Message) {
        if message.get("id") != Some(self.field.widget_id.as_str()) {
            return;
        }
        let Ok(command) = Command::from_str(&message.name) else {
            log::debug!("{}: ignoring message {message}", self.field.widget_id);
            return;
        };

        if let Some(selected) = message.get("selectedId").filter(|s| !s.is_empty()) {
            self.field.selection = SelectionState::new(selected);
        }
        if self.field.selection.is_empty() && command.needs_selection() {
            self.alert(NO_SELECTION_MESSAGE);
            return;
        }

        log::debug!(
            "{}: {command} (selected={})",
            self.field.widget_id,
            self.field.selection.selected_id
        );
        if let Err(e) = self.dispatch(command) {
            self.report(e);
        }
    }

    /// Continue the add-child workflow with the result of a resumable modal.
    pub fn resume_workflow(&mut self, token: &str, result: Option<&str>) {
        match self.workflow.resume(&*self.repo, token, result) {
            Ok(effects) => apply_effects(self.host, effects),
            Err(e) => self.report(e.into()),
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<(), ChildlistError> {
        match command {
            Command::MoveUp => self.move_child(Direction::Up),
            Command::MoveDown => self.move_child(Direction::Down),
            Command::Edit => self.edit_child(),
            Command::Add => self.add_child(),
            Command::Remove => self.remove_child(),
        }
    }

    fn parent(&self) -> Result<ContentNode, RepositoryError> {
        self.repo
            .get_item(&self.field.item_id, &self.field.language)?
            .ok_or_else(|| RepositoryError::NotFound(self.field.item_id.clone()))
    }

    fn selected(&self) -> Result<ContentNode, RepositoryError> {
        let id = &self.field.selection.selected_id;
        self.repo
            .get_item(id, &self.field.language)?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    fn move_child(&mut self, direction: Direction) -> Result<(), ChildlistError> {
        let parent = self.parent()?;
        let siblings = ChildSetView::new(&*self.repo).list(&parent, &self.field.language)?;
        SortOrderManager::new(&mut *self.repo).move_child(
            &siblings,
            &self.field.selection.selected_id,
            direction,
        )?;
        let render = self.build_render()?;
        self.host.render(render);
        Ok(())
    }

    fn edit_child(&mut self) -> Result<(), ChildlistError> {
        let item = self.selected()?;
        let (width, height) = EDITOR_DIALOG_SIZE;
        let request = ModalRequest {
            kind: ModalKind::ContentEditor,
            url: self.urls.editor_url(&item.id, &self.field.language),
            width: width.to_string(),
            height: height.to_string(),
            resume: None,
        };
        apply_effects(self.host, vec![Effect::OpenModal(request)]);
        Ok(())
    }

    fn add_child(&mut self) -> Result<(), ChildlistError> {
        let parent = self.parent()?;
        let database = self.repo.database_name().to_string();
        let effects = self.workflow.start(&parent, &database, &self.field.language);
        apply_effects(self.host, effects);
        Ok(())
    }

    fn remove_child(&mut self) -> Result<(), ChildlistError> {
        let item = self.selected()?;
        self.repo.delete_item(&item.id)?;
        log::info!("{}: removed {} '{}'", self.field.widget_id, item.id, item.name);

        self.field.selection = SelectionState::default();
        let render = self.build_render()?;
        let selected_field = render.selected_id_field.clone();
        apply_effects(
            self.host,
            vec![Effect::Render(render), Effect::ClearSelection(selected_field)],
        );
        Ok(())
    }

    fn build_render(&self) -> Result<FieldRender, ChildlistError> {
        let children = ChildSetView::new(&*self.repo)
            .list_by_id(&self.field.item_id, &self.field.language)?;
        Ok(FieldRender::new(
            &self.field.widget_id,
            &children,
            &self.field.selection,
            self.field.read_only,
        ))
    }

    fn report(&mut self, error: ChildlistError) {
        log::warn!("{}: {error}", self.field.widget_id);
        let message = error.user_message();
        self.alert(&message);
    }

    fn alert(&mut self, message: &str) {
        apply_effects(self.host, vec![Effect::Alert(message.to_string())]);
    }
}
