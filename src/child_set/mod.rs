use crate::models::{normalize_id, ContentNode};
use crate::repository::{ContentRepository, RepoResult, RepositoryError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Split an insert-options value into comparable template ids.
///
/// Well-formed ids are normalized; anything else is kept trimmed so it can still match
/// byte-for-byte.
pub fn parse_whitelist(insert_options: &str) -> BTreeSet<String> {
    insert_options
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| normalize_id(s).unwrap_or_else(|| s.to_string()))
        .collect()
}

fn template_key(id: &str) -> String {
    normalize_id(id).unwrap_or_else(|| id.trim().to_string())
}

/// Read side of the field: the whitelisted children of a parent.
pub struct ChildSetView<'r, R: ?Sized> {
    repo: &'r R,
}

impl<'r, R> ChildSetView<'r, R>
where
    R: ContentRepository + ?Sized,
{
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Allowed child template ids, or `None` when the parent's template declares no
    /// insert-options field.
    pub fn whitelist(&self, parent: &ContentNode) -> RepoResult<Option<BTreeSet<String>>> {
        let template = self.repo.get_template(&parent.template_id)?;
        Ok(template
            .and_then(|t| t.insert_options)
            .map(|raw| parse_whitelist(&raw)))
    }

    /// Children of `parent` whose template is whitelisted, in repository order.
    ///
    /// Recomputed on every call.
    pub fn list(&self, parent: &ContentNode, language: &str) -> RepoResult<Vec<ContentNode>> {
        let Some(allowed) = self.whitelist(parent)? else {
            return Ok(vec![]);
        };
        if allowed.is_empty() {
            return Ok(vec![]);
        }

        let children = self.repo.get_children(&parent.id, language)?;
        Ok(children
            .into_iter()
            .filter(|c| allowed.contains(&template_key(&c.template_id)))
            .collect())
    }

    pub fn list_by_id(&self, parent_id: &str, language: &str) -> RepoResult<Vec<ContentNode>> {
        let parent = self
            .repo
            .get_item(parent_id, language)?
            .ok_or_else(|| RepositoryError::NotFound(parent_id.to_string()))?;
        self.list(&parent, language)
    }
}

/// One `<option>` of the rendered list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChildOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub fn render_options(children: &[ContentNode], selected_id: &str) -> Vec<ChildOption> {
    children
        .iter()
        .map(|c| ChildOption {
            value: c.id.clone(),
            label: c.name.clone(),
            selected: !selected_id.is_empty() && c.id == selected_id,
        })
        .collect()
}

/// Id of a sub-element of the field, e.g. `W_selectedId`.
pub fn field_id(widget_id: &str, suffix: &str) -> String {
    format!("{widget_id}_{suffix}")
}

pub const LIST_SUFFIX: &str = "selected";
pub const SELECTED_ID_SUFFIX: &str = "selectedId";
pub const HELP_SUFFIX: &str = "selected_help";

/// Currently selected child, read back from the submitted form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_id: String,
}

impl SelectionState {
    pub fn new(selected_id: impl Into<String>) -> Self {
        Self {
            selected_id: selected_id.into(),
        }
    }

    /// Reads `{widget_id}_selectedId`; missing means nothing is selected.
    pub fn from_form(form: &BTreeMap<String, String>, widget_id: &str) -> Self {
        let selected_id = form
            .get(&field_id(widget_id, SELECTED_ID_SUFFIX))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        Self { selected_id }
    }

    pub fn is_empty(&self) -> bool {
        self.selected_id.is_empty()
    }
}

/// Everything the host needs to (re)draw the field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldRender {
    pub widget_id: String,
    pub list_id: String,
    pub selected_id_field: String,
    pub help_id: String,
    pub options: Vec<ChildOption>,
    pub read_only: bool,
    /// Label of the selected option, shown under the list.
    pub help_text: String,
}

impl FieldRender {
    pub fn new(
        widget_id: &str,
        children: &[ContentNode],
        selection: &SelectionState,
        read_only: bool,
    ) -> Self {
        let options = render_options(children, &selection.selected_id);
        let help_text = options
            .iter()
            .find(|o| o.selected)
            .map(|o| o.label.clone())
            .unwrap_or_default();
        Self {
            widget_id: widget_id.to_string(),
            list_id: field_id(widget_id, LIST_SUFFIX),
            selected_id_field: field_id(widget_id, SELECTED_ID_SUFFIX),
            help_id: field_id(widget_id, HELP_SUFFIX),
            options,
            read_only,
            help_text,
        }
    }
}
