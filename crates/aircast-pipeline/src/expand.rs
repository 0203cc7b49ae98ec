//! `@KEY@` macro expansion.

use std::collections::HashMap;

/// Replace every well-formed `@KEY@` token with its mapped value.
///
/// `KEY` is a (possibly empty) run of ASCII alphanumerics and `_`. Absent
/// keys expand to the empty string — a partial map is not an error.
/// Substituted values are never re-scanned, and an `@` that does not open
/// a well-formed token is copied through literally.
///
/// ```
/// use std::collections::HashMap;
/// use aircast_pipeline::expand_macros;
///
/// let values = HashMap::from([("SRC".to_string(), "rtmpsrc".to_string())]);
/// assert_eq!(expand_macros("@SRC@ ! sink", &values), "rtmpsrc ! sink");
/// assert_eq!(expand_macros("@MISSING@x", &values), "x");
/// assert_eq!(expand_macros("user@host", &values), "user@host");
/// ```
pub fn expand_macros(input: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let key_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if after[key_len..].starts_with('@') {
            if let Some(value) = values.get(&after[..key_len]) {
                out.push_str(value);
            }
            rest = &after[key_len + 1..];
        } else {
            out.push('@');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_known_keys() {
        let v = values(&[("URL", "rtmp://live.example.com"), ("KEY", "s3cr3t")]);
        assert_eq!(
            expand_macros("sink location=@URL@/@KEY@", &v),
            "sink location=rtmp://live.example.com/s3cr3t"
        );
    }

    #[test]
    fn absent_keys_become_empty() {
        let v = values(&[]);
        assert_eq!(expand_macros("a @GONE@ b", &v), "a  b");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let v = values(&[("A", "@B@"), ("B", "boom")]);
        assert_eq!(expand_macros("@A@", &v), "@B@");
    }

    #[test]
    fn stray_at_signs_are_literal() {
        let v = values(&[("HOST", "example")]);
        assert_eq!(expand_macros("user@host", &v), "user@host");
        assert_eq!(expand_macros("a @ b @HOST@", &v), "a @ b example");
        assert_eq!(expand_macros("trailing@", &v), "trailing@");
    }

    #[test]
    fn adjacent_ats_form_an_empty_key() {
        // "@@" is a well-formed token with an empty key, which is absent
        // from any sensible map and so expands to nothing.
        let v = values(&[]);
        assert_eq!(expand_macros("a@@b", &v), "ab");
    }

    #[test]
    fn expansion_is_total() {
        let v = values(&[("X", "1")]);
        assert_eq!(expand_macros("", &v), "");
        assert_eq!(expand_macros("no macros here", &v), "no macros here");
    }
}
