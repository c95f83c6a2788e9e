//! The template-and-name dialog opened by the first add-child step.

use crate::models::{is_item_id, ContentNode};
use crate::repository::{ContentRepository, RepoResult, RepositoryError};
use crate::util::query_param;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddChildError {
    #[error("Please select a template")]
    NoTemplate,

    #[error("Please enter a name for the element")]
    EmptyName,

    /// Name rejected by the repository's legality check.
    #[error("{0}")]
    IllegalName(String),

    #[error("Item with id: {0} could not be found")]
    ParentNotFound(String),

    #[error("Database '{0}' is not available")]
    UnknownDatabase(String),

    /// Raw repository message.
    #[error("{0}")]
    Creation(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TemplateCandidate {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

/// Dialog parameters, as read back from the modal URL.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddChildParams {
    pub parent_id: String,
    pub database: String,
    pub language: String,
}

impl AddChildParams {
    pub fn from_url(url: &str) -> Option<Self> {
        Some(Self {
            parent_id: query_param(url, "id").filter(|s| !s.is_empty())?,
            database: query_param(url, "database").unwrap_or_default(),
            language: query_param(url, "lang").filter(|s| !s.is_empty())?,
        })
    }
}

/// Templates that may be created under `parent`, in declared order.
///
/// Malformed ids and ids that do not resolve to a template are skipped.
pub fn template_candidates<R>(repo: &R, parent: &ContentNode) -> RepoResult<Vec<TemplateCandidate>>
where
    R: ContentRepository + ?Sized,
{
    let Some(raw) = repo
        .get_template(&parent.template_id)?
        .and_then(|t| t.insert_options)
    else {
        return Ok(vec![]);
    };

    let mut out = Vec::new();
    for token in raw.split('|').map(str::trim) {
        if !is_item_id(token) {
            continue;
        }
        match repo.get_template(token)? {
            Some(t) => out.push(TemplateCandidate {
                id: t.id,
                name: t.name,
                icon: t.icon,
                description: t.description,
            }),
            None => log::debug!("insert option {token} does not resolve to a template"),
        }
    }
    Ok(out)
}

/// Validate the dialog input and create the child. First failing check wins.
pub fn submit<R>(
    repo: &mut R,
    params: &AddChildParams,
    template_id: Option<&str>,
    name: &str,
) -> Result<ContentNode, AddChildError>
where
    R: ContentRepository + ?Sized,
{
    let Some(template_id) = template_id.filter(|t| !t.trim().is_empty()) else {
        return Err(AddChildError::NoTemplate);
    };
    if name.is_empty() {
        return Err(AddChildError::EmptyName);
    }
    if let Some(err) = repo.validate_name(name) {
        return Err(AddChildError::IllegalName(err));
    }

    if !params.database.is_empty() && params.database != repo.database_name() {
        return Err(AddChildError::UnknownDatabase(params.database.clone()));
    }

    let parent_exists = repo
        .get_item(&params.parent_id, &params.language)
        .map_err(|e| AddChildError::Creation(e.to_string()))?
        .is_some();
    if !parent_exists {
        return Err(AddChildError::ParentNotFound(params.parent_id.clone()));
    }

    match repo.add_child(&params.parent_id, name, template_id, &params.language) {
        Ok(node) => Ok(node),
        Err(RepositoryError::NotFound(id)) => Err(AddChildError::ParentNotFound(id)),
        Err(e) => {
            log::warn!("creating '{name}' under {} failed: {e}", params.parent_id);
            Err(AddChildError::Creation(e.to_string()))
        }
    }
}
