/// `k1=v1&k2=v2`, both sides percent-encoded.
pub(crate) fn encode_query<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Inverse of [`encode_query`]. Pairs without `=` get an empty value; undecodable parts are
/// kept raw.
pub(crate) fn decode_query(query: &str) -> Vec<(String, String)> {
    let query = query.trim_start_matches('?');
    query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (k, v) = p.split_once('=').unwrap_or((p, ""));
            (decode_part(k), decode_part(v))
        })
        .collect()
}

pub(crate) fn decode_part(s: &str) -> String {
    let s = s.replace('+', " ");
    let decoded = urlencoding::decode(&s).map(|c| c.into_owned());
    decoded.unwrap_or(s)
}

pub(crate) fn with_query<K, V>(base: &str, pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return base.to_string();
    }
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{}", encode_query(pairs))
}

/// Query part of a URL (after `?`, before `#`).
pub(crate) fn query_of(url: &str) -> &str {
    let Some((_, rest)) = url.split_once('?') else {
        return "";
    };
    rest.split('#').next().unwrap_or("")
}

pub(crate) fn query_param(url: &str, key: &str) -> Option<String> {
    decode_query(query_of(url))
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_roundtrip_with_braces_and_spaces() {
        let pairs = [("id", "{ABC-1}"), ("name", "Spring campaign & more")];
        let q = encode_query(&pairs);
        assert!(!q.contains('{'));
        assert!(!q.contains(' '));
        let back = decode_query(&q);
        assert_eq!(back[0], ("id".to_string(), "{ABC-1}".to_string()));
        assert_eq!(back[1].1, "Spring campaign & more");
    }

    #[test]
    fn test_with_query_and_param_lookup() {
        let url = with_query("/dialogs/add-child", &[("id", "{P}"), ("lang", "da")]);
        assert_eq!(url, "/dialogs/add-child?id=%7BP%7D&lang=da");
        assert_eq!(query_param(&url, "id").as_deref(), Some("{P}"));
        assert_eq!(query_param(&url, "lang").as_deref(), Some("da"));
        assert_eq!(query_param(&url, "database"), None);

        let more = with_query(&url, &[("x", "1")]);
        assert!(more.ends_with("&x=1"));
    }

    #[test]
    fn test_query_of_ignores_fragment() {
        assert_eq!(query_of("/a?b=1#frag"), "b=1");
        assert_eq!(query_of("/a"), "");
    }
}
