//! Docblock parsing for handler documentation comments.
//!
//! Route handlers are documented with classic `/** ... */` comments: a short summary
//! paragraph, an optional longer description, and `@tag` lines. The parser here is
//! intentionally small and only understands what the generator needs.
//!
//! # Example
//!
//! ```
//! use apidoc_from_routes::docblock::DocBlock;
//!
//! let doc = DocBlock::parse(
//!     "/**\n * List users\n *\n * Returns every active user.\n * @resource Users\n */",
//! );
//! assert_eq!(doc.summary, "List users");
//! assert_eq!(doc.description, "Returns every active user.");
//! assert_eq!(doc.tag("resource"), Some("Users"));
//! ```

/// Tag that removes a handler from the generated documentation.
pub const HIDE_TAG: &str = "hideFromAPIDocumentation";

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    /// First paragraph of the comment, joined into one line
    pub summary: String,
    /// Remaining free text before the first tag
    pub description: String,
    /// All `@tag` entries in source order
    pub tags: Vec<Tag>,
}

/// A single `@name content` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// Tag content; continuation lines are joined with `\n`
    pub content: String,
}

impl DocBlock {
    /// Parses a raw docblock. Comment delimiters and leading `*` are optional.
    pub fn parse(raw: &str) -> Self {
        let lines: Vec<&str> = raw.lines().map(clean_line).collect();

        let mut text_lines: Vec<&str> = Vec::new();
        let mut tags: Vec<Tag> = Vec::new();

        for line in lines {
            if let Some(rest) = line.strip_prefix('@') {
                let (name, content) = match rest.find(char::is_whitespace) {
                    Some(idx) => (&rest[..idx], rest[idx..].trim()),
                    None => (rest, ""),
                };
                tags.push(Tag {
                    name: name.to_string(),
                    content: content.to_string(),
                });
            } else if let Some(last) = tags.last_mut() {
                // Continuation of the previous tag (multi-line @response bodies etc.)
                if !line.is_empty() {
                    if !last.content.is_empty() {
                        last.content.push('\n');
                    }
                    last.content.push_str(line);
                }
            } else {
                text_lines.push(line);
            }
        }

        let text = text_lines.join("\n");
        let text = text.trim();
        let (summary, description) = match text.find("\n\n") {
            Some(idx) => (&text[..idx], text[idx..].trim()),
            None => (text, ""),
        };

        Self {
            summary: summary.lines().map(str::trim).collect::<Vec<_>>().join(" "),
            description: description.to_string(),
            tags,
        }
    }

    /// Returns the content of the first tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.content.as_str())
    }

    /// Returns every tag with the given name.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Whether the handler asked to be left out of the documentation.
    pub fn is_hidden(&self) -> bool {
        self.has_tag(HIDE_TAG)
    }
}

/// Strips comment delimiters and the leading `*` gutter from a line.
fn clean_line(line: &str) -> &str {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix("/**") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest;
    }
    let line = line.trim();
    match line.strip_prefix('*') {
        Some(rest) => rest.trim(),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_summary_description_and_tags() {
        let doc = DocBlock::parse(
            r#"/**
             * Show a user
             * by id.
             *
             * Looks the user up and returns it.
             * Fails with 404 when missing.
             *
             * @resource Users
             * @bodyParam name string required The name
             */"#,
        );

        assert_eq!(doc.summary, "Show a user by id.");
        assert_eq!(
            doc.description,
            "Looks the user up and returns it.\nFails with 404 when missing."
        );
        assert_eq!(doc.tags.len(), 2);
        assert_eq!(doc.tag("resource"), Some("Users"));
        assert_eq!(doc.tag("bodyParam"), Some("name string required The name"));
    }

    #[test]
    fn test_parse_without_delimiters() {
        let doc = DocBlock::parse("Ping the service");
        assert_eq!(doc.summary, "Ping the service");
        assert!(doc.description.is_empty());
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_multiline_tag_content() {
        let doc = DocBlock::parse(
            "/**\n * @response {\n *   \"id\": 1\n * }\n */",
        );
        assert_eq!(doc.tag("response"), Some("{\n\"id\": 1\n}"));
    }

    #[test]
    fn test_hide_tag() {
        let hidden = DocBlock::parse("/** Internal\n * @hideFromAPIDocumentation\n */");
        assert!(hidden.is_hidden());
        assert_eq!(hidden.summary, "Internal");

        let visible = DocBlock::parse("/** Public endpoint */");
        assert!(!visible.is_hidden());
    }

    #[test]
    fn test_tags_named_returns_all() {
        let doc = DocBlock::parse(
            "@queryParam page The page\n@queryParam limit Page size\n@resource Users",
        );
        let names: Vec<_> = doc.tags_named("queryParam").map(|t| t.content.as_str()).collect();
        assert_eq!(names, vec!["page The page", "limit Page size"]);
    }

    #[test]
    fn test_empty_docblock() {
        let doc = DocBlock::parse("/** */");
        assert_eq!(doc, DocBlock::default());
    }
}
