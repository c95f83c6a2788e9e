use super::WorkflowState;
use crate::util::{decode_query, encode_query};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const KEY_PARENT: &str = "id";
pub const KEY_DATABASE: &str = "database";
pub const KEY_LANGUAGE: &str = "la";
pub const KEY_NEW_CHILD: &str = "new";
pub const KEY_STEP: &str = "step";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContinuationError {
    #[error("continuation is missing '{0}'")]
    Missing(&'static str),

    #[error("unknown workflow step '{0}'")]
    UnknownStep(String),
}

/// State carried through the add-child round trips. Flat string pairs only.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Continuation {
    pub parent_id: String,
    pub database: String,
    pub language: String,
    #[serde(default)]
    pub new_child_id: Option<String>,
}

impl Continuation {
    pub fn new(
        parent_id: impl Into<String>,
        database: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            database: database.into(),
            language: language.into(),
            new_child_id: None,
        }
    }

    pub fn with_new_child(mut self, id: impl Into<String>) -> Self {
        self.new_child_id = Some(id.into());
        self
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (KEY_PARENT, self.parent_id.clone()),
            (KEY_DATABASE, self.database.clone()),
            (KEY_LANGUAGE, self.language.clone()),
        ];
        if let Some(id) = &self.new_child_id {
            pairs.push((KEY_NEW_CHILD, id.clone()));
        }
        pairs
    }

    /// Rebuild from pairs. Unknown keys are ignored; the last value of a repeated key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ContinuationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut parent_id = None;
        let mut database = None;
        let mut language = None;
        let mut new_child_id = None;
        for (k, v) in pairs {
            let v: String = v.into();
            match k.as_ref() {
                KEY_PARENT => parent_id = Some(v),
                KEY_DATABASE => database = Some(v),
                KEY_LANGUAGE => language = Some(v),
                KEY_NEW_CHILD if !v.is_empty() => new_child_id = Some(v),
                _ => {}
            }
        }

        let parent_id = parent_id
            .filter(|s| !s.is_empty())
            .ok_or(ContinuationError::Missing(KEY_PARENT))?;
        Ok(Self {
            parent_id,
            database: database.ok_or(ContinuationError::Missing(KEY_DATABASE))?,
            language: language.ok_or(ContinuationError::Missing(KEY_LANGUAGE))?,
            new_child_id,
        })
    }
}

/// What a resumable modal carries out to the client and back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeToken {
    pub state: WorkflowState,
    pub continuation: Continuation,
}

impl ResumeToken {
    pub fn new(state: WorkflowState, continuation: Continuation) -> Self {
        Self {
            state,
            continuation,
        }
    }

    pub fn encode(&self) -> String {
        let mut pairs: Vec<(&str, String)> = vec![(KEY_STEP, self.state.to_string())];
        pairs.extend(self.continuation.to_pairs());
        encode_query(&pairs)
    }

    pub fn decode(token: &str) -> Result<Self, ContinuationError> {
        let pairs = decode_query(token);
        let step = pairs
            .iter()
            .find(|(k, _)| k == KEY_STEP)
            .map(|(_, v)| v.clone())
            .ok_or(ContinuationError::Missing(KEY_STEP))?;
        let state =
            WorkflowState::from_str(&step).map_err(|_| ContinuationError::UnknownStep(step))?;
        let continuation = Continuation::from_pairs(pairs)?;
        Ok(Self {
            state,
            continuation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_survives_string_roundtrip() {
        let c = Continuation::new("{P}", "master", "da").with_new_child("{N}");
        let token = ResumeToken::new(WorkflowState::AwaitingEditorClose, c.clone());
        let wire = token.encode();
        assert!(wire.starts_with("step=awaiting-editor-close&id=%7BP%7D"));
        assert_eq!(ResumeToken::decode(&wire), Ok(token));
    }

    #[test]
    fn test_from_pairs_requires_parent_database_language() {
        let missing_parent = Continuation::from_pairs(vec![("database", "master"), ("la", "en")]);
        assert_eq!(missing_parent, Err(ContinuationError::Missing(KEY_PARENT)));

        let missing_lang = Continuation::from_pairs(vec![("id", "{P}"), ("database", "master")]);
        assert_eq!(missing_lang, Err(ContinuationError::Missing(KEY_LANGUAGE)));

        let ok = Continuation::from_pairs(vec![
            ("id", "{P}"),
            ("database", "master"),
            ("la", "en"),
            ("extra", "ignored"),
        ])
        .expect("complete");
        assert_eq!(ok.new_child_id, None);
    }

    #[test]
    fn test_decode_rejects_unknown_step() {
        let err = ResumeToken::decode("step=sleeping&id=P&database=master&la=en");
        assert_eq!(err, Err(ContinuationError::UnknownStep("sleeping".to_string())));
        assert_eq!(
            ResumeToken::decode("id=P&database=master&la=en"),
            Err(ContinuationError::Missing(KEY_STEP))
        );
    }
}
