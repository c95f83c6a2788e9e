//! Add-child workflow.
//!
//! Adding a child spans three round trips to the host: pick template and name, edit the new
//! item, refresh the parent. Nothing is kept in memory between trips. Each resumable modal
//! carries a [`ResumeToken`] (state tag plus flat continuation) and the host hands it back
//! with the modal result.
//!
//! ```text
//! Idle --start--> AwaitingTemplatePick --id--> AwaitingEditorClose --closed--> Done -> Idle
//!                          |
//!                          +--no result--> Idle
//! ```

pub mod add_child;
pub mod continuation;

use crate::config::EditorUrls;
use crate::host::{Effect, ModalKind, ModalRequest, Notification, NotificationKind};
use crate::models::{is_item_id, ContentNode};
use crate::repository::{ContentRepository, RepositoryError};
use continuation::{Continuation, ContinuationError, ResumeToken, KEY_NEW_CHILD};

pub const ADD_CHILD_DIALOG_SIZE: (&str, &str) = ("420px", "480px");
pub const EDITOR_DIALOG_SIZE: (&str, &str) = ("960px", "800px");

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum WorkflowState {
    Idle,
    AwaitingTemplatePick,
    AwaitingEditorClose,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Continuation(#[from] ContinuationError),

    #[error("cannot resume the add-child workflow from step '{0}'")]
    UnexpectedStep(WorkflowState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WorkflowState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn idle() -> Self {
        Self {
            state: WorkflowState::Idle,
            effects: vec![],
        }
    }
}

/// A modal result that means "closed without picking anything".
pub fn is_empty_result(result: Option<&str>) -> bool {
    match result.map(str::trim) {
        None => true,
        Some(r) => r.is_empty() || r == "undefined",
    }
}

/// Idle -> AwaitingTemplatePick.
pub fn start(urls: &EditorUrls, parent: &ContentNode, database: &str, language: &str) -> Transition {
    let continuation = Continuation::new(&parent.id, database, language);
    let token = ResumeToken::new(WorkflowState::AwaitingTemplatePick, continuation.clone());
    let (width, height) = ADD_CHILD_DIALOG_SIZE;

    log::info!("add child under {}: awaiting template pick", parent.id);
    Transition {
        state: WorkflowState::AwaitingTemplatePick,
        effects: vec![Effect::OpenModal(ModalRequest {
            kind: ModalKind::AddChild,
            url: urls.add_child_url(&continuation),
            width: width.to_string(),
            height: height.to_string(),
            resume: Some(token.encode()),
        })],
    }
}

/// Advance a suspended workflow with the result its modal closed with.
pub fn resume<R>(
    repo: &R,
    urls: &EditorUrls,
    state: WorkflowState,
    continuation: Continuation,
    result: Option<&str>,
) -> Result<Transition, WorkflowError>
where
    R: ContentRepository + ?Sized,
{
    match state {
        WorkflowState::AwaitingTemplatePick => {
            if is_empty_result(result) {
                log::info!("add child under {}: cancelled", continuation.parent_id);
                return Ok(Transition::idle());
            }
            let new_id = result.map(str::trim).unwrap_or_default();
            if !is_item_id(new_id) {
                log::warn!("add child: ignoring malformed dialog result '{new_id}'");
                return Ok(Transition::idle());
            }

            let continuation = continuation.with_new_child(new_id);
            let token = ResumeToken::new(WorkflowState::AwaitingEditorClose, continuation.clone());
            let (width, height) = EDITOR_DIALOG_SIZE;

            log::info!("add child: created {new_id}, awaiting editor close");
            Ok(Transition {
                state: WorkflowState::AwaitingEditorClose,
                effects: vec![Effect::OpenModal(ModalRequest {
                    kind: ModalKind::ContentEditor,
                    url: urls.editor_url(new_id, &continuation.language),
                    width: width.to_string(),
                    height: height.to_string(),
                    resume: Some(token.encode()),
                })],
            })
        }
        WorkflowState::AwaitingEditorClose => {
            let new_id = continuation
                .new_child_id
                .as_deref()
                .ok_or(ContinuationError::Missing(KEY_NEW_CHILD))?;

            // The item may have been moved while it was open in the editor, so the parent is
            // read fresh instead of taken from the continuation.
            let node = repo
                .get_item(new_id, &continuation.language)?
                .ok_or_else(|| RepositoryError::NotFound(new_id.to_string()))?;
            let parent_id = node.parent_id.unwrap_or(continuation.parent_id);

            log::info!("add child: editor closed for {new_id}, refreshing {parent_id}");
            Ok(Transition {
                state: WorkflowState::Done,
                effects: vec![
                    Effect::Notify(Notification {
                        kind: NotificationKind::Reload,
                        item_id: parent_id.clone(),
                    }),
                    Effect::Notify(Notification {
                        kind: NotificationKind::RefreshChildren,
                        item_id: parent_id,
                    }),
                ],
            })
        }
        WorkflowState::Idle | WorkflowState::Done => Err(WorkflowError::UnexpectedStep(state)),
    }
}

/// Tracks the workflow position for one field instance.
pub struct DialogWorkflowController<'u> {
    urls: &'u EditorUrls,
    state: WorkflowState,
}

impl<'u> DialogWorkflowController<'u> {
    pub fn new(urls: &'u EditorUrls) -> Self {
        Self {
            urls,
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn start(&mut self, parent: &ContentNode, database: &str, language: &str) -> Vec<Effect> {
        let t = start(self.urls, parent, database, language);
        self.state = t.state;
        t.effects
    }

    /// Resume from an encoded token. On error the workflow is back at `Idle`.
    pub fn resume<R>(
        &mut self,
        repo: &R,
        token: &str,
        result: Option<&str>,
    ) -> Result<Vec<Effect>, WorkflowError>
    where
        R: ContentRepository + ?Sized,
    {
        self.state = WorkflowState::Idle;
        let token = ResumeToken::decode(token)?;
        let t = resume(repo, self.urls, token.state, token.continuation, result)?;
        self.state = match t.state {
            WorkflowState::Done => WorkflowState::Idle,
            s => s,
        };
        Ok(t.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::add_child::{submit, AddChildParams};
    use super::*;
    use crate::repository::memory::fixtures::*;
    use crate::repository::MemoryRepository;
    use crate::util::query_param;

    fn root(r: &MemoryRepository) -> ContentNode {
        r.get_item(ROOT_ID, "en").expect("get").expect("root")
    }

    fn only_modal(effects: &[Effect]) -> &ModalRequest {
        match effects {
            [Effect::OpenModal(m)] => m,
            other => panic!("expected one modal, got {other:?}"),
        }
    }

    #[test]
    fn test_start_opens_template_pick_with_continuation() {
        let r = demo();
        let urls = EditorUrls::default();
        let t = start(&urls, &root(&r), "master", "da");
        assert_eq!(t.state, WorkflowState::AwaitingTemplatePick);

        let m = only_modal(&t.effects);
        assert_eq!(m.kind, ModalKind::AddChild);
        assert_eq!(query_param(&m.url, "id").as_deref(), Some(ROOT_ID));
        assert_eq!(query_param(&m.url, "lang").as_deref(), Some("da"));

        let token = ResumeToken::decode(m.resume.as_deref().expect("resumable")).expect("token");
        assert_eq!(token.state, WorkflowState::AwaitingTemplatePick);
        assert_eq!(token.continuation, Continuation::new(ROOT_ID, "master", "da"));
    }

    #[test]
    fn test_empty_results_return_to_idle() {
        let r = demo();
        let urls = EditorUrls::default();
        let c = Continuation::new(ROOT_ID, "master", "en");
        for result in [None, Some(""), Some("undefined"), Some("not-an-id")] {
            let t = resume(&r, &urls, WorkflowState::AwaitingTemplatePick, c.clone(), result)
                .expect("resume");
            assert_eq!(t, Transition::idle());
        }
    }

    #[test]
    fn test_cancelled_pick_leaves_children_unchanged() {
        let r = demo();
        let urls = EditorUrls::default();
        let before = r.get_children(ROOT_ID, "en").expect("children");

        let mut wf = DialogWorkflowController::new(&urls);
        let effects = wf.start(&root(&r), "master", "en");
        let token = only_modal(&effects).resume.clone().expect("token");
        let effects = wf.resume(&r, &token, None).expect("resume");

        assert!(effects.is_empty());
        assert_eq!(wf.state(), WorkflowState::Idle);
        assert_eq!(r.get_children(ROOT_ID, "en").expect("children"), before);
    }

    #[test]
    fn test_full_flow_notifies_current_parent() {
        let mut r = demo();
        let urls = EditorUrls::default();
        let mut wf = DialogWorkflowController::new(&urls);

        let effects = wf.start(&root(&r), "master", "en");
        let pick = only_modal(&effects).clone();
        let params = AddChildParams::from_url(&pick.url).expect("params");
        let created = submit(&mut r, &params, Some(TEASER_TEMPLATE), "Foo").expect("created");

        let effects = wf
            .resume(&r, pick.resume.as_deref().expect("token"), Some(created.id.as_str()))
            .expect("to editor");
        assert_eq!(wf.state(), WorkflowState::AwaitingEditorClose);
        let editor = only_modal(&effects).clone();
        assert_eq!(editor.kind, ModalKind::ContentEditor);
        assert_eq!(query_param(&editor.url, "fo").as_deref(), Some(created.id.as_str()));

        // Relocated while the editor was open.
        let other_parent = "{22222222-2222-4222-8222-000000000001}";
        r.delete_item(&created.id).expect("delete");
        r.insert_item(&created.id, "Foo", Some(other_parent), TEASER_TEMPLATE, "0");

        let effects = wf
            .resume(&r, editor.resume.as_deref().expect("token"), None)
            .expect("done");
        assert_eq!(wf.state(), WorkflowState::Idle);
        assert_eq!(
            effects,
            vec![
                Effect::Notify(Notification {
                    kind: NotificationKind::Reload,
                    item_id: other_parent.to_string(),
                }),
                Effect::Notify(Notification {
                    kind: NotificationKind::RefreshChildren,
                    item_id: other_parent.to_string(),
                }),
            ]
        );
    }

    #[test]
    fn test_editor_close_for_deleted_item_is_not_found() {
        let r = demo();
        let urls = EditorUrls::default();
        let gone = "{99999999-9999-4999-8999-999999999999}";
        let c = Continuation::new(ROOT_ID, "master", "en").with_new_child(gone);
        let err = resume(&r, &urls, WorkflowState::AwaitingEditorClose, c, Some("x"))
            .expect_err("missing");
        assert_eq!(
            err,
            WorkflowError::Repository(RepositoryError::NotFound(gone.to_string()))
        );
    }

    #[test]
    fn test_resume_from_idle_is_rejected() {
        let r = demo();
        let urls = EditorUrls::default();
        let c = Continuation::new(ROOT_ID, "master", "en");
        assert_eq!(
            resume(&r, &urls, WorkflowState::Idle, c, Some("x")),
            Err(WorkflowError::UnexpectedStep(WorkflowState::Idle))
        );
    }
}
