//! Content repository contract.
//!
//! The field only talks to the content tree through [`ContentRepository`]. Mutations of
//! persisted fields go through begin/commit edit scopes; see [`with_edit`].

pub mod memory;

pub use memory::MemoryRepository;

use crate::models::{item_name_error, ContentNode, TemplateInfo};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    AccessDenied(String),

    /// Carries the id that failed to resolve.
    #[error("Item with id: {0} could not be found")]
    NotFound(String),

    /// Creation rejected (name collision, type constraint, ...). Message is shown verbatim.
    #[error("{0}")]
    Creation(String),

    #[error("item {0} is not in an edit scope")]
    NotEditing(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

pub trait ContentRepository {
    /// Name of the database this repository serves; carried in workflow continuations.
    fn database_name(&self) -> &str;

    fn get_item(&self, id: &str, language: &str) -> RepoResult<Option<ContentNode>>;

    /// Direct children of `parent_id` in repository-native order.
    fn get_children(&self, parent_id: &str, language: &str) -> RepoResult<Vec<ContentNode>>;

    fn get_template(&self, template_id: &str) -> RepoResult<Option<TemplateInfo>>;

    fn add_child(
        &mut self,
        parent_id: &str,
        name: &str,
        template_id: &str,
        language: &str,
    ) -> RepoResult<ContentNode>;

    fn delete_item(&mut self, id: &str) -> RepoResult<()>;

    fn begin_edit(&mut self, id: &str) -> RepoResult<()>;

    /// Write the sort-order field. Only valid inside an edit scope.
    fn set_sort_order(&mut self, id: &str, value: &str) -> RepoResult<()>;

    fn commit_edit(&mut self, id: &str) -> RepoResult<()>;

    fn cancel_edit(&mut self, id: &str) -> RepoResult<()>;

    /// Empty (`None`) when the name is legal.
    fn validate_name(&self, name: &str) -> Option<String> {
        item_name_error(name)
    }
}

/// Run `f` inside a begin/commit edit scope on `id`.
///
/// The scope is cancelled when `f` fails, so no half-written field is committed.
pub fn with_edit<R, T>(
    repo: &mut R,
    id: &str,
    f: impl FnOnce(&mut R) -> RepoResult<T>,
) -> RepoResult<T>
where
    R: ContentRepository + ?Sized,
{
    repo.begin_edit(id)?;
    match f(repo) {
        Ok(v) => {
            repo.commit_edit(id)?;
            Ok(v)
        }
        Err(e) => {
            if let Err(cancel_err) = repo.cancel_edit(id) {
                log::warn!("cancel_edit({id}) failed after {e}: {cancel_err}");
            }
            Err(e)
        }
    }
}

/// Scoped single-field write of a sort order.
pub fn write_sort_order<R>(repo: &mut R, id: &str, value: &str) -> RepoResult<()>
where
    R: ContentRepository + ?Sized,
{
    with_edit(repo, id, |repo| repo.set_sort_order(id, value))
}
