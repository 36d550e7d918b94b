//! Class and inline style lookup.
//!
//! This is a flat, single-level lookup: no cascade, specificity, compound
//! selectors or pseudo-classes.

/// Collect the declaration bodies of every rule whose selector mentions one of
/// the classes in `class_attr`.
///
/// Style blocks are concatenated and split on `{`/`}` into alternating
/// selector/body tokens. A selector token matches a class when it contains
/// `.class` as a substring. Bodies are appended in class-list order.
pub fn resolve_class_styles<S: AsRef<str>>(class_attr: &str, style_blocks: &[S]) -> String {
    let css: String = style_blocks.iter().map(AsRef::as_ref).collect();
    let css = css.trim_matches(|c| c == '\t' || c == '\n' || c == '\r');
    let tokens: Vec<&str> = css
        .split(|c| c == '{' || c == '}')
        .filter(|t| !t.is_empty())
        .collect();

    let mut styles = String::new();
    for class in class_attr.split(' ').filter(|c| !c.is_empty()) {
        let selector = format!(".{}", class);
        for (i, token) in tokens.iter().enumerate() {
            if token.contains(&selector) {
                if let Some(body) = tokens.get(i + 1) {
                    styles.push_str(body);
                }
            }
        }
    }
    styles
}

/// Split a declaration body into `(property, value)` pairs.
///
/// Properties are lower-cased; both sides are trimmed. Declarations without a
/// colon are ignored.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            if property.is_empty() {
                return None;
            }
            Some((property, value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks() -> Vec<String> {
        vec![
            "\n.boldy{font-weight:bold}\n".to_string(),
            "\n.italic{font-style:italic;text-decoration:underline}\n.dotted{border-bottom: dotted}\n"
                .to_string(),
        ]
    }

    #[test]
    fn test_single_class() {
        assert_eq!(resolve_class_styles("boldy", &blocks()[..]), "font-weight:bold");
    }

    #[test]
    fn test_multiple_classes_accumulate_in_order() {
        assert_eq!(
            resolve_class_styles("dotted boldy", &blocks()[..]),
            "border-bottom: dottedfont-weight:bold"
        );
    }

    #[test]
    fn test_unknown_class_contributes_nothing() {
        assert_eq!(resolve_class_styles("missing", &blocks()[..]), "");
        assert_eq!(resolve_class_styles("", &blocks()[..]), "");
    }

    #[test]
    fn test_selector_as_last_token_is_ignored() {
        let blocks = [".a{color:red} .b"];
        assert_eq!(resolve_class_styles("b", &blocks[..]), "");
        assert_eq!(resolve_class_styles("a", &blocks[..]), "color:red");
    }

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations("Color: #00BFFF; text-decoration:underline;;bogus");
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "#00BFFF".to_string()),
                ("text-decoration".to_string(), "underline".to_string()),
            ]
        );
    }
}
