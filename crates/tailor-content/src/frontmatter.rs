//! Frontmatter extraction and parsing.

use serde_json::{Map, Value};

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a mapping")]
    NotAMapping,
}

/// Extract YAML frontmatter from a template.
///
/// Returns the frontmatter keys (empty when the template has none) and the
/// body following the closing fence.
pub fn extract_frontmatter(source: &str) -> Result<(Map<String, Value>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((Map::new(), source));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let after_close = &after_open[close_pos + 4..];
    let body = after_close
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or("");

    if yaml_content.is_empty() {
        return Ok((Map::new(), body));
    }

    let data: Value = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    match data {
        Value::Object(map) => Ok((map, body)),
        Value::Null => Ok((Map::new(), body)),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Install
order: 2
tags: [docs]
---
# Install
"#;

        let (data, body) = extract_frontmatter(source).unwrap();

        assert_eq!(data["title"], "Install");
        assert_eq!(data["order"], json!(2));
        assert_eq!(data["tags"], json!(["docs"]));
        assert_eq!(body, "# Install\n");
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "<p>Just a template</p>";

        let (data, body) = extract_frontmatter(source).unwrap();

        assert!(data.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn handles_empty_frontmatter() {
        let (data, body) = extract_frontmatter("---\n---\nbody").unwrap();

        assert!(data.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn keeps_permalink_false() {
        let (data, _) = extract_frontmatter("---\npermalink: false\n---\n").unwrap();

        assert_eq!(data["permalink"], json!(false));
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let result = extract_frontmatter("---\ntitle: Test\n# No closing");

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let result = extract_frontmatter("---\ntitle: [invalid yaml\n---\n");

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_non_mapping() {
        let result = extract_frontmatter("---\n- a\n- b\n---\n");

        assert!(matches!(result, Err(FrontmatterError::NotAMapping)));
    }
}
