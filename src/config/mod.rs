use crate::util::with_query;
use crate::workflow::continuation::Continuation;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_DATABASE: &str = "master";
pub const DEFAULT_ROOT_ITEM_ID: &str = "{11111111-1111-4111-8111-111111111111}";
pub const DEFAULT_EDITOR_URL: &str = "/item";
pub const DEFAULT_ADD_CHILD_URL: &str = "/dialogs/add-child";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub default_language: String,
    pub database: String,
    pub root_item_id: String,
    pub editor_url: String,
    pub add_child_url: String,
    pub log_level: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            root_item_id: DEFAULT_ROOT_ITEM_ID.to_string(),
            editor_url: DEFAULT_EDITOR_URL.to_string(),
            add_child_url: DEFAULT_ADD_CHILD_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl EnvConfig {
    /// Read `window.ENV`, falling back to defaults key by key.
    pub fn new() -> Self {
        let mut cfg = Self::default();

        let Some(env) = web_sys::window().and_then(|w| w.get("ENV")) else {
            return cfg;
        };
        if env.is_undefined() || !env.is_object() {
            return cfg;
        }

        // We support BOTH `DEFAULT_LANGUAGE` and `default_language` style keys.
        let read = |upper: &str| -> Option<String> {
            [upper.to_string(), upper.to_ascii_lowercase()]
                .iter()
                .find_map(|k| js_sys::Reflect::get(&env, &k.as_str().into()).ok()?.as_string())
                .filter(|s| !s.trim().is_empty())
        };

        let fields: [(&str, &mut String); 6] = [
            ("DEFAULT_LANGUAGE", &mut cfg.default_language),
            ("DATABASE", &mut cfg.database),
            ("ROOT_ITEM_ID", &mut cfg.root_item_id),
            ("EDITOR_URL", &mut cfg.editor_url),
            ("ADD_CHILD_URL", &mut cfg.add_child_url),
            ("LOG_LEVEL", &mut cfg.log_level),
        ];
        for (key, slot) in fields {
            if let Some(v) = read(key) {
                *slot = v;
            }
        }

        cfg
    }

    pub fn urls(&self) -> EditorUrls {
        EditorUrls {
            editor: self.editor_url.clone(),
            add_child: self.add_child_url.clone(),
        }
    }

    /// Language for an operation: the explicit one when given, else the configured default.
    pub fn resolve_language(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_language.as_str())
            .to_string()
    }
}

/// Modal URLs the field opens.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EditorUrls {
    pub editor: String,
    pub add_child: String,
}

impl Default for EditorUrls {
    fn default() -> Self {
        EnvConfig::default().urls()
    }
}

impl EditorUrls {
    /// Content editor on one item, in preview mode.
    pub fn editor_url(&self, item_id: &str, language: &str) -> String {
        let base = format!("{}/{}", self.editor.trim_end_matches('/'), urlencoding::encode(item_id));
        with_query(
            &base,
            &[("fo", item_id), ("vs", "1"), ("mo", "preview"), ("la", language)],
        )
    }

    /// Template-and-name picker for a new child of `c.parent_id`.
    pub fn add_child_url(&self, c: &Continuation) -> String {
        with_query(
            &self.add_child,
            &[
                ("id", c.parent_id.as_str()),
                ("database", c.database.as_str()),
                ("lang", c.language.as_str()),
            ],
        )
    }
}
