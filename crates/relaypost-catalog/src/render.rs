//! `{{name}}` placeholder substitution.
//!
//! Substitution is literal, single-pass and non-recursive: a value that
//! itself contains `{{x}}` is inserted as-is and never re-expanded. A
//! placeholder with no matching value is left in the output verbatim so
//! missing test data is visible to the operator instead of silently
//! blanked. Both behaviors are policy, not accident; tests assert them.

use std::collections::HashMap;

/// Render `template`, replacing each `{{name}}` with `values[name]`.
///
/// Pure and deterministic: same template and values always produce the
/// same output. No whitespace trimming happens inside the braces; the
/// text between `{{` and `}}` must match a key exactly.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use relaypost_catalog::render::render;
///
/// let values = HashMap::from([("name".to_string(), "Asha".to_string())]);
/// assert_eq!(render("Hi {{name}}", &values), "Hi Asha");
/// assert_eq!(render("Hi {{nick}}", &values), "Hi {{nick}}");
/// ```
pub fn render(template: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        match after_open.find("}}") {
            Some(close) => {
                let name = &after_open[..close];
                // A brace inside the name means the opening `{{` was not a
                // real placeholder (e.g. "{{a {{b}}"): emit one `{` and
                // rescan from the next character.
                if name.contains('{') || name.contains('}') {
                    out.push('{');
                    rest = &rest[open + 1..];
                    continue;
                }
                match values.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[close + 2..];
            }
            None => {
                // Unterminated `{{`: everything left is literal.
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

/// List the distinct placeholder names in `template`, in first-appearance
/// order. Drives the placeholder chips shown in the template editor.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = &after_open[..close];
                if name.contains('{') || name.contains('}') {
                    rest = &rest[open + 1..];
                    continue;
                }
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after_open[close + 2..];
            }
            None => break,
        }
    }

    names
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
    fn substitutes_known_placeholders() {
        let v = values(&[("app_name", "TrendPin"), ("user_name", "Asha")]);
        assert_eq!(
            render("Welcome to {{app_name}}, {{user_name}}!", &v),
            "Welcome to TrendPin, Asha!"
        );
    }

    #[test]
    fn unmatched_placeholders_pass_through() {
        assert_eq!(render("Hi {{name}}", &HashMap::new()), "Hi {{name}}");
    }

    #[test]
    fn substitution_is_not_recursive() {
        let v = values(&[("a", "{{b}}"), ("b", "boom")]);
        assert_eq!(render("{{a}}", &v), "{{b}}");
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let v = values(&[("x", "1")]);
        let t = "{{x}} and {{y}}";
        assert_eq!(render(t, &v), render(t, &v));
    }

    #[test]
    fn no_whitespace_trimming_inside_braces() {
        let v = values(&[("name", "Asha")]);
        assert_eq!(render("{{ name }}", &v), "{{ name }}");
    }

    #[test]
    fn unterminated_open_braces_are_literal() {
        let v = values(&[("a", "x")]);
        assert_eq!(render("tail {{a", &v), "tail {{a");
    }

    #[test]
    fn stray_open_before_real_placeholder() {
        let v = values(&[("b", "x")]);
        assert_eq!(render("{{a {{b}}", &v), "{{a x");
    }

    #[test]
    fn same_placeholder_twice() {
        let v = values(&[("n", "7")]);
        assert_eq!(render("{{n}}-{{n}}", &v), "7-7");
    }

    #[test]
    fn empty_value_renders_empty() {
        let v = values(&[("n", "")]);
        assert_eq!(render("[{{n}}]", &v), "[]");
    }

    #[test]
    fn placeholder_names_in_first_appearance_order() {
        let names = placeholder_names("{{b}} {{a}} {{b}} {{c}}");
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn placeholder_names_ignores_malformed() {
        assert!(placeholder_names("no placeholders {{").is_empty());
        assert_eq!(placeholder_names("{{a {{b}}"), vec!["b"]);
    }
}
