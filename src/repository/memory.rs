use super::{ContentRepository, RepoResult, RepositoryError};
use crate::models::{new_item_id, normalize_id, parse_sort_order, ContentNode, TemplateInfo};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct StoredItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(rename = "template-id")]
    pub template_id: String,
    #[serde(rename = "sort-order", default)]
    pub sort_order: String,
}

/// In-memory content tree.
///
/// Children keep insertion order in `children`; the native read order sorts them by
/// numeric sort order with unset values last (ties keep insertion order).
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MemoryRepository {
    database: String,
    templates: BTreeMap<String, TemplateInfo>,
    items: BTreeMap<String, StoredItem>,
    /// parent id -> child ids, insertion order
    children: BTreeMap<String, Vec<String>>,

    /// Items that reject writes (edit, delete, add-under) with access denied.
    #[serde(default)]
    write_denied: BTreeSet<String>,

    /// Items inside an open edit scope.
    #[serde(skip)]
    editing: BTreeSet<String>,
}

fn key(id: &str) -> String {
    normalize_id(id).unwrap_or_else(|| id.trim().to_string())
}

impl MemoryRepository {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn add_template(&mut self, mut template: TemplateInfo) {
        template.id = key(&template.id);
        self.templates.insert(template.id.clone(), template);
    }

    /// Insert an item directly, bypassing name checks. Used for seeding.
    pub fn insert_item(
        &mut self,
        id: &str,
        name: &str,
        parent_id: Option<&str>,
        template_id: &str,
        sort_order: &str,
    ) {
        let id = key(id);
        let parent_id = parent_id.map(key);
        if let Some(p) = &parent_id {
            self.children.entry(p.clone()).or_default().push(id.clone());
        }
        self.items.insert(
            id.clone(),
            StoredItem {
                id,
                name: name.to_string(),
                parent_id,
                template_id: key(template_id),
                sort_order: sort_order.to_string(),
            },
        );
    }

    pub fn deny_writes(&mut self, id: &str) {
        self.write_denied.insert(key(id));
    }

    pub fn allow_writes(&mut self, id: &str) {
        self.write_denied.remove(&key(id));
    }

    /// Raw sort-order value; `None` when the item does not exist.
    pub fn sort_order_of(&self, id: &str) -> Option<&str> {
        self.items.get(&key(id)).map(|i| i.sort_order.as_str())
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.contains(&key(id))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    fn node(&self, item: &StoredItem, language: &str) -> ContentNode {
        ContentNode {
            id: item.id.clone(),
            name: item.name.clone(),
            parent_id: item.parent_id.clone(),
            template_id: item.template_id.clone(),
            language: language.to_string(),
            sort_order: item.sort_order.clone(),
        }
    }

    fn check_writable(&self, id: &str) -> RepoResult<()> {
        if self.write_denied.contains(id) {
            let name = self.items.get(id).map(|i| i.name.as_str()).unwrap_or(id);
            return Err(RepositoryError::AccessDenied(format!(
                "write access to '{name}' is denied"
            )));
        }
        Ok(())
    }

    fn existing(&self, id: &str) -> RepoResult<&StoredItem> {
        self.items
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn collect_subtree(&self, id: &str, out: &mut Vec<String>) {
        out.push(id.to_string());
        if let Some(kids) = self.children.get(id) {
            for k in kids {
                self.collect_subtree(k, out);
            }
        }
    }
}

impl ContentRepository for MemoryRepository {
    fn database_name(&self) -> &str {
        &self.database
    }

    fn get_item(&self, id: &str, language: &str) -> RepoResult<Option<ContentNode>> {
        Ok(self.items.get(&key(id)).map(|i| self.node(i, language)))
    }

    fn get_children(&self, parent_id: &str, language: &str) -> RepoResult<Vec<ContentNode>> {
        let parent_id = key(parent_id);
        self.existing(&parent_id)?;

        let mut kids: Vec<&StoredItem> = self
            .children
            .get(&parent_id)
            .map(|ids| ids.iter().filter_map(|id| self.items.get(id)).collect())
            .unwrap_or_default();

        // Stable: equal keys keep insertion order.
        kids.sort_by_key(|i| match parse_sort_order(&i.sort_order) {
            Some(n) => (0u8, n),
            None => (1u8, 0),
        });

        Ok(kids.into_iter().map(|i| self.node(i, language)).collect())
    }

    fn get_template(&self, template_id: &str) -> RepoResult<Option<TemplateInfo>> {
        Ok(self.templates.get(&key(template_id)).cloned())
    }

    fn add_child(
        &mut self,
        parent_id: &str,
        name: &str,
        template_id: &str,
        language: &str,
    ) -> RepoResult<ContentNode> {
        let parent_id = key(parent_id);
        let template_id = key(template_id);
        self.existing(&parent_id)?;
        self.check_writable(&parent_id)?;

        if let Some(err) = self.validate_name(name) {
            return Err(RepositoryError::Creation(err));
        }
        if !self.templates.contains_key(&template_id) {
            return Err(RepositoryError::Creation(format!(
                "Template {template_id} does not exist"
            )));
        }

        let duplicate = self
            .children
            .get(&parent_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.items.get(id))
            .any(|i| i.name.eq_ignore_ascii_case(name));
        if duplicate {
            return Err(RepositoryError::Creation(format!(
                "An item named '{name}' already exists at this level"
            )));
        }

        let id = new_item_id().map_err(|e| RepositoryError::Storage(e.to_string()))?;
        self.insert_item(&id, name, Some(&parent_id), &template_id, "0");
        log::info!("created {id} '{name}' under {parent_id}");

        let item = self.existing(&id)?;
        Ok(self.node(item, language))
    }

    fn delete_item(&mut self, id: &str) -> RepoResult<()> {
        let id = key(id);
        let parent_id = self.existing(&id)?.parent_id.clone();
        self.check_writable(&id)?;

        let mut doomed = Vec::new();
        self.collect_subtree(&id, &mut doomed);
        for d in &doomed {
            self.items.remove(d);
            self.children.remove(d);
            self.editing.remove(d);
        }
        if let Some(p) = parent_id {
            if let Some(kids) = self.children.get_mut(&p) {
                kids.retain(|k| k != &id);
            }
        }
        log::info!("deleted {id} ({} items)", doomed.len());
        Ok(())
    }

    fn begin_edit(&mut self, id: &str) -> RepoResult<()> {
        let id = key(id);
        self.existing(&id)?;
        self.check_writable(&id)?;
        self.editing.insert(id);
        Ok(())
    }

    fn set_sort_order(&mut self, id: &str, value: &str) -> RepoResult<()> {
        let id = key(id);
        if !self.editing.contains(&id) {
            return Err(RepositoryError::NotEditing(id));
        }
        let item = self
            .items
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        item.sort_order = value.to_string();
        Ok(())
    }

    fn commit_edit(&mut self, id: &str) -> RepoResult<()> {
        let id = key(id);
        if !self.editing.remove(&id) {
            return Err(RepositoryError::NotEditing(id));
        }
        Ok(())
    }

    fn cancel_edit(&mut self, id: &str) -> RepoResult<()> {
        // Values are written in place, so cancelling only closes the scope.
        let id = key(id);
        if !self.editing.remove(&id) {
            return Err(RepositoryError::NotEditing(id));
        }
        Ok(())
    }
}

pub(crate) mod fixtures {
    use super::MemoryRepository;
    use crate::models::TemplateInfo;

    pub const ROOT_ID: &str = "{11111111-1111-4111-8111-111111111111}";
    pub const FOLDER_TEMPLATE: &str = "{A87A00B1-E6DB-45AB-8B54-636FEC3B5523}";
    pub const ARTICLE_TEMPLATE: &str = "{76036F5E-CBCE-46D1-AF0A-4143F9B557AA}";
    pub const TEASER_TEMPLATE: &str = "{B5A4D4F2-6C39-4E5B-9F0A-2C1D3E4F5A6B}";
    pub const HIDDEN_TEMPLATE: &str = "{C0FFEE00-0000-4000-8000-000000000001}";

    fn template(id: &str, name: &str, icon: &str, insert_options: Option<String>) -> TemplateInfo {
        TemplateInfo {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            description: format!("{name} item"),
            insert_options,
        }
    }

    /// Templates only: folder allows articles and teasers, article allows teasers.
    pub fn templates(repo: &mut MemoryRepository) {
        repo.add_template(template(
            FOLDER_TEMPLATE,
            "Folder",
            "folder",
            Some(format!("{ARTICLE_TEMPLATE}|{TEASER_TEMPLATE}")),
        ));
        repo.add_template(template(
            ARTICLE_TEMPLATE,
            "Article",
            "document",
            Some(TEASER_TEMPLATE.to_string()),
        ));
        repo.add_template(template(TEASER_TEMPLATE, "Teaser", "image", Some(String::new())));
        repo.add_template(template(HIDDEN_TEMPLATE, "Settings", "gear", None));
    }

    /// Seed tree shown in the browser on first start.
    pub fn demo() -> MemoryRepository {
        let mut repo = MemoryRepository::new("master");
        templates(&mut repo);

        repo.insert_item(ROOT_ID, "Home", None, FOLDER_TEMPLATE, "");
        let kids = [
            ("{22222222-2222-4222-8222-000000000001}", "Welcome", ARTICLE_TEMPLATE, "100"),
            ("{22222222-2222-4222-8222-000000000002}", "Getting started", ARTICLE_TEMPLATE, "0"),
            ("{22222222-2222-4222-8222-000000000003}", "Spring campaign", TEASER_TEMPLATE, "0"),
            ("{22222222-2222-4222-8222-000000000004}", "Site settings", HIDDEN_TEMPLATE, "0"),
        ];
        for (id, name, tpl, sort) in kids {
            repo.insert_item(id, name, Some(ROOT_ID), tpl, sort);
        }
        repo
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::repository::write_sort_order;

    const A: &str = "{AAAAAAAA-0000-4000-8000-000000000001}";
    const B: &str = "{AAAAAAAA-0000-4000-8000-000000000002}";
    const C: &str = "{AAAAAAAA-0000-4000-8000-000000000003}";

    fn repo() -> MemoryRepository {
        let mut r = MemoryRepository::new("master");
        templates(&mut r);
        r.insert_item(ROOT_ID, "Home", None, FOLDER_TEMPLATE, "");
        r
    }

    fn names(r: &MemoryRepository) -> Vec<String> {
        r.get_children(ROOT_ID, "en")
            .expect("children")
            .into_iter()
            .map(|n| n.name)
            .collect()
    }

    #[test]
    fn test_native_order_puts_unset_last() {
        let mut r = repo();
        r.insert_item(B, "B", Some(ROOT_ID), ARTICLE_TEMPLATE, "0");
        r.insert_item(A, "A", Some(ROOT_ID), ARTICLE_TEMPLATE, "100");
        r.insert_item(C, "C", Some(ROOT_ID), ARTICLE_TEMPLATE, "");
        assert_eq!(names(&r), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_sort_order_write_requires_edit_scope() {
        let mut r = repo();
        r.insert_item(A, "A", Some(ROOT_ID), ARTICLE_TEMPLATE, "0");
        assert_eq!(
            r.set_sort_order(A, "5"),
            Err(RepositoryError::NotEditing(A.to_string()))
        );

        write_sort_order(&mut r, A, "500").expect("scoped write");
        assert_eq!(r.sort_order_of(A), Some("500"));
        assert!(!r.is_editing(A));
    }

    #[test]
    fn test_add_child_rejects_duplicate_name() {
        let mut r = repo();
        let first = r
            .add_child(ROOT_ID, "News", ARTICLE_TEMPLATE, "en")
            .expect("create");
        assert_eq!(first.sort_order, "0");
        assert_eq!(first.parent_id.as_deref(), Some(ROOT_ID));

        let err = r
            .add_child(ROOT_ID, "news", ARTICLE_TEMPLATE, "en")
            .expect_err("duplicate");
        assert!(matches!(err, RepositoryError::Creation(_)));
    }

    #[test]
    fn test_add_child_unknown_template_is_creation_error() {
        let mut r = repo();
        let err = r
            .add_child(ROOT_ID, "News", "{00000000-0000-4000-8000-000000000000}", "en")
            .expect_err("unknown template");
        assert!(matches!(err, RepositoryError::Creation(_)));
    }

    #[test]
    fn test_delete_removes_subtree() {
        let mut r = repo();
        r.insert_item(A, "A", Some(ROOT_ID), ARTICLE_TEMPLATE, "0");
        r.insert_item(B, "B", Some(A), TEASER_TEMPLATE, "0");
        r.delete_item(A).expect("delete");
        assert!(r.get_item(B, "en").expect("get").is_none());
        assert!(names(&r).is_empty());
        assert_eq!(r.delete_item(A), Err(RepositoryError::NotFound(A.to_string())));
    }

    #[test]
    fn test_denied_item_rejects_edit_and_delete() {
        let mut r = repo();
        r.insert_item(A, "A", Some(ROOT_ID), ARTICLE_TEMPLATE, "0");
        r.deny_writes(A);
        assert!(matches!(r.begin_edit(A), Err(RepositoryError::AccessDenied(_))));
        assert!(matches!(r.delete_item(A), Err(RepositoryError::AccessDenied(_))));

        r.allow_writes(A);
        assert!(r.delete_item(A).is_ok());
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_tree() {
        let r = demo();
        let json = serde_json::to_string(&r).expect("serialize");
        let back: MemoryRepository = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.item_count(), r.item_count());
        assert_eq!(back.database_name(), "master");
        assert_eq!(
            back.get_children(ROOT_ID, "en").expect("children"),
            r.get_children(ROOT_ID, "en").expect("children")
        );
    }
}
