use serde::{Deserialize, Serialize};

/// Characters that can never appear in an item name.
pub const INVALID_NAME_CHARS: &str = "\\/:?\"<>|[]";

pub const MAX_NAME_LENGTH: usize = 100;

/// A content node as seen by the field, resolved in one language.
///
/// The field never owns nodes; it only holds ids and re-reads after each mutation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContentNode {
    pub id: String,
    pub name: String,

    /// `None` only for the tree root.
    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(rename = "template-id")]
    pub template_id: String,

    pub language: String,

    /// Raw persisted sort-order field. Blank and `"0"` both mean "unset".
    #[serde(rename = "sort-order", default)]
    pub sort_order: String,
}

/// Template (type) definition.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub description: String,

    /// The `|`-delimited insert-options field on the template's standard values.
    /// `None` when the template has no standard values or does not declare the field.
    #[serde(rename = "insert-options", default)]
    pub insert_options: Option<String>,
}

pub fn sort_order_is_unset(value: &str) -> bool {
    value.trim().is_empty() || value == "0"
}

/// Numeric sort position, or `None` when unset or not a number.
pub fn parse_sort_order(value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Whether `s` is a well-formed item id: a GUID, optionally wrapped in braces.
pub fn is_item_id(s: &str) -> bool {
    normalize_id(s).is_some()
}

/// Canonical `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}` form of an id, upper-case.
pub fn normalize_id(s: &str) -> Option<String> {
    let s = s.trim();
    let inner = match (s.strip_prefix('{'), s.ends_with('}')) {
        (Some(rest), true) => &rest[..rest.len() - 1],
        (None, false) => s,
        _ => return None,
    };

    let groups: Vec<&str> = inner.split('-').collect();
    let lens = [8usize, 4, 4, 4, 12];
    if groups.len() != lens.len() {
        return None;
    }
    for (g, len) in groups.iter().zip(lens) {
        if g.len() != len || !g.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
    }

    Some(format!("{{{}}}", inner.to_ascii_uppercase()))
}

/// Fresh random (v4) item id in canonical form.
pub fn new_item_id() -> Result<String, getrandom::Error> {
    let mut b = [0u8; 16];
    getrandom::getrandom(&mut b)?;
    b[6] = (b[6] & 0x0f) | 0x40;
    b[8] = (b[8] & 0x3f) | 0x80;

    let hex: String = b.iter().map(|x| format!("{x:02X}")).collect();
    Ok(format!(
        "{{{}-{}-{}-{}-{}}}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

/// Legality check for a new item name. Returns the user-facing error, if any.
pub fn item_name_error(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("An item name cannot be blank.".to_string());
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Some(format!(
            "An item name must be at most {MAX_NAME_LENGTH} characters long."
        ));
    }

    if name.chars().any(|c| INVALID_NAME_CHARS.contains(c)) {
        return Some(format!(
            "An item name cannot contain any of the following characters: {INVALID_NAME_CHARS}"
        ));
    }

    let first = name.chars().next();
    let last = name.chars().last();
    let bad_edge = |c: Option<char>| c.is_some_and(|c| c.is_whitespace() || c == '.');
    if bad_edge(first) || bad_edge(last) {
        return Some("An item name cannot start or end with a blank or a dot.".to_string());
    }

    None
}
