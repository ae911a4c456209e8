//! Rendering of the Markdown documentation and its HTML page.
//!
//! Routes are grouped by resource, each route is rendered into a marker-wrapped fragment,
//! and the fragments are assembled below the frontmatter and info banner. Two documents
//! come out of one run: the published `index.md` (manual edits merged back in) and
//! `.compare.md` (fresh output only) which the next run diffs against.

use crate::merge::{MergeEngine, MergeReport, Preamble, PriorOutput, INFO_END, INFO_START};
use crate::router::RouteDescriptor;
use crate::serializer::write_to_file;
use anyhow::{Context, Result};
use log::{debug, info};
use minijinja::{context, Environment};
use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Title used when the frontmatter does not declare one.
pub const DEFAULT_TITLE: &str = "API Reference";

/// Routes sharing a resource.
#[derive(Debug, Clone)]
pub struct RouteGroup {
    pub name: String,
    /// Routes in processing order
    pub routes: Vec<RouteDescriptor>,
}

/// Groups routes by resource. Groups are sorted by name, routes keep their order.
pub fn group_routes(routes: Vec<RouteDescriptor>) -> Vec<RouteGroup> {
    let mut groups: BTreeMap<String, Vec<RouteDescriptor>> = BTreeMap::new();
    for route in routes {
        groups.entry(route.resource.clone()).or_default().push(route);
    }

    groups
        .into_iter()
        .map(|(name, routes)| RouteGroup { name, routes })
        .collect()
}

/// Output locations of one documentation directory.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Published Markdown, `<root>/source/index.md`
    pub fn markdown(&self) -> PathBuf {
        self.root.join("source").join("index.md")
    }

    /// Comparison snapshot, `<root>/source/.compare.md`
    pub fn compare(&self) -> PathBuf {
        self.root.join("source").join(".compare.md")
    }

    /// Generated HTML page, `<root>/index.html`
    pub fn html(&self) -> PathBuf {
        self.root.join("index.html")
    }

    /// Postman collection, `<root>/collection.json`
    pub fn collection(&self) -> PathBuf {
        self.root.join("collection.json")
    }
}

/// Settings affecting the rendered text.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// URL shown in the example requests
    pub base_url: String,
    /// Link the info banner to `collection.json`
    pub show_collection_link: bool,
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
}

pub struct Renderer {
    env: Environment<'static>,
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> crate::error::Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template("route.md", include_str!("../templates/route.md.jinja"))?;
        env.add_template("info.md", include_str!("../templates/info.md.jinja"))?;
        env.add_template("frontmatter.md", include_str!("../templates/frontmatter.md.jinja"))?;
        env.add_template("layout.html", include_str!("../templates/layout.html.jinja"))?;

        Ok(Self { env, options })
    }

    /// Renders the marker-wrapped fragment of a route.
    pub fn render_fragment(&self, route: &RouteDescriptor) -> crate::error::Result<String> {
        let base_url = self.options.base_url.trim_end_matches('/');
        let rendered = self
            .env
            .get_template("route.md")?
            .render(context! { route => route, base_url => base_url })?;
        Ok(rendered)
    }

    /// Renders the fragments of every route in place.
    pub fn render_fragments(&self, groups: &mut [RouteGroup]) -> crate::error::Result<()> {
        for route in groups.iter_mut().flat_map(|g| g.routes.iter_mut()) {
            route.rendered = self.render_fragment(route)?;
        }
        Ok(())
    }

    /// Frontmatter and info banner of a first generation.
    pub fn fresh_preamble(&self) -> crate::error::Result<Preamble> {
        let frontmatter = self
            .env
            .get_template("frontmatter.md")?
            .render(context! { title => DEFAULT_TITLE })?;
        let info = self.env.get_template("info.md")?.render(context! {
            show_collection_link => self.options.show_collection_link,
            collection_url => "collection.json",
        })?;

        Ok(Preamble {
            frontmatter: frontmatter.trim_matches('\n').to_string(),
            info: info.trim_matches('\n').to_string(),
        })
    }

    /// Assembles a document.
    ///
    /// With `compare` the fresh fragments are used, otherwise preserved manual edits
    /// take precedence.
    pub fn render_document(&self, preamble: &Preamble, groups: &[RouteGroup], compare: bool) -> String {
        let mut doc = format!(
            "---\n{}\n---\n{}\n{}\n{}\n",
            preamble.frontmatter, INFO_START, preamble.info, INFO_END
        );

        for group in groups {
            doc.push_str(&format!("\n# {}\n\n", group.name));
            for route in &group.routes {
                let fragment = if compare {
                    route.rendered.as_str()
                } else {
                    route.published_fragment()
                };
                doc.push_str(fragment);
                doc.push_str("\n\n");
            }
        }

        doc
    }

    /// Renders fragments, merges them with the previous output and writes both
    /// `index.md` and `.compare.md`.
    pub fn write_markdown(
        &self,
        paths: &OutputPaths,
        groups: &mut [RouteGroup],
        merge: MergeEngine,
    ) -> Result<MergeReport> {
        self.render_fragments(groups)?;

        let prior = PriorOutput::load(&paths.markdown(), &paths.compare());
        let preamble = merge.preamble(&prior, self.fresh_preamble()?);
        let report = merge.merge(&prior, groups.iter_mut().flat_map(|g| g.routes.iter_mut()));

        let published = self.render_document(&preamble, groups, false);
        let compare = self.render_document(&preamble, groups, true);

        write_to_file(&published, &paths.markdown())?;
        write_to_file(&compare, &paths.compare())?;
        info!("Wrote index.md to: {}", paths.root.display());

        Ok(report)
    }

    /// Converts a published document into a standalone HTML page.
    pub fn render_html(&self, markdown: &str) -> crate::error::Result<String> {
        let (frontmatter, body) = split_frontmatter(markdown);
        let title = frontmatter
            .and_then(|fm| serde_yaml::from_str::<FrontMatter>(fm).ok())
            .and_then(|fm| fm.title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let mut content = String::new();
        html::push_html(&mut content, Parser::new_ext(body, Options::ENABLE_TABLES));

        let page = self
            .env
            .get_template("layout.html")?
            .render(context! { title => title, content => content })?;
        Ok(page)
    }

    /// Writes `index.html` next to the `source` directory.
    pub fn write_html(&self, paths: &OutputPaths) -> Result<()> {
        let markdown_path = paths.markdown();
        let markdown = std::fs::read_to_string(&markdown_path)
            .with_context(|| format!("Failed to read {}", markdown_path.display()))?;

        let page = self.render_html(&markdown)?;
        write_to_file(&page, &paths.html())?;
        info!("Wrote HTML documentation to: {}", paths.html().display());
        Ok(())
    }
}

/// Splits a leading `---` delimited frontmatter block from the rest of a document.
fn split_frontmatter(doc: &str) -> (Option<&str>, &str) {
    let Some(rest) = doc.strip_prefix("---\n") else {
        return (None, doc);
    };
    match rest.find("\n---\n") {
        Some(end) => (Some(&rest[..end]), &rest[end + 5..]),
        None => {
            debug!("Unterminated frontmatter, rendering whole document");
            (None, doc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ExampleResponse;
    use crate::router::{DocParameter, HttpMethod, ParameterLocation};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn descriptor(id: &str, resource: &str, uri: &str) -> RouteDescriptor {
        RouteDescriptor {
            id: id.to_string(),
            action: "UserController@index".to_string(),
            methods: vec![HttpMethod::Get],
            uri: uri.to_string(),
            name: None,
            resource: resource.to_string(),
            middleware: vec![],
            title: String::new(),
            description: String::new(),
            parameters: vec![],
            example_request: None,
            example_response: None,
            rendered: String::new(),
            modified: None,
        }
    }

    fn renderer() -> Renderer {
        Renderer::new(RenderOptions {
            base_url: "http://localhost/".to_string(),
            show_collection_link: true,
        })
        .unwrap()
    }

    #[test]
    fn test_group_routes_sorted_by_name() {
        let groups = group_routes(vec![
            descriptor("1", "Users", "api/users"),
            descriptor("2", "Orders", "api/orders"),
            descriptor("3", "Users", "api/users/{user}"),
        ]);

        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Orders", "Users"]);
        let user_uris: Vec<_> = groups[1].routes.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(user_uris, vec!["api/users", "api/users/{user}"]);
    }

    #[test]
    fn test_render_fragment() {
        let mut route = descriptor("abc", "Users", "api/users");
        route.title = "List users".to_string();
        route.description = "Every active user.".to_string();
        route.example_response = Some(ExampleResponse::new(200, "[]"));
        route.parameters = vec![DocParameter {
            name: "page".to_string(),
            location: ParameterLocation::Query,
            param_type: "string".to_string(),
            required: false,
            description: "Page number".to_string(),
        }];

        let fragment = renderer().render_fragment(&route).unwrap();

        assert!(fragment.starts_with("<!-- START_abc -->\n## List users\n\nEvery active user.\n"));
        assert!(fragment.ends_with("<!-- END_abc -->"));
        assert!(fragment.contains("curl -X GET \"http://localhost/api/users\""));
        assert!(fragment.contains("> Example response (200):\n\n```json\n[]\n```"));
        assert!(fragment.contains("`GET api/users`"));
        assert!(fragment.contains("page | string | optional | Page number"));
    }

    #[test]
    fn test_render_fragment_without_title_uses_uri() {
        let route = descriptor("abc", "Users", "api/users");
        let fragment = renderer().render_fragment(&route).unwrap();
        assert!(fragment.starts_with("<!-- START_abc -->\n## api/users\n"));
        assert!(!fragment.contains("Example response"));
        assert!(!fragment.contains("#### Parameters"));
    }

    #[test]
    fn test_fresh_preamble() {
        let preamble = renderer().fresh_preamble().unwrap();
        assert!(preamble.frontmatter.starts_with("title: API Reference"));
        assert!(preamble.info.starts_with("# Info"));
        assert!(preamble.info.contains("[Get Postman Collection](collection.json)"));
        assert!(!preamble.info.ends_with('\n'));

        let without_link = Renderer::new(RenderOptions {
            base_url: "http://localhost".to_string(),
            show_collection_link: false,
        })
        .unwrap()
        .fresh_preamble()
        .unwrap();
        assert!(!without_link.info.contains("Postman"));
    }

    #[test]
    fn test_render_document_layout() {
        let renderer = renderer();
        let preamble = Preamble {
            frontmatter: "title: Docs".to_string(),
            info: "# Info".to_string(),
        };
        let mut route = descriptor("a1", "Users", "api/users");
        route.rendered = "<!-- START_a1 -->\nfresh\n<!-- END_a1 -->".to_string();
        route.modified = Some("<!-- START_a1 -->\nedited\n<!-- END_a1 -->".to_string());
        let groups = vec![RouteGroup {
            name: "Users".to_string(),
            routes: vec![route],
        }];

        assert_eq!(
            renderer.render_document(&preamble, &groups, false),
            "---\ntitle: Docs\n---\n<!-- START_INFO -->\n# Info\n<!-- END_INFO -->\n\n# Users\n\n<!-- START_a1 -->\nedited\n<!-- END_a1 -->\n\n"
        );
        assert!(renderer
            .render_document(&preamble, &groups, true)
            .contains("fresh"));
    }

    #[test]
    fn test_render_html() {
        let page = renderer()
            .render_html("---\ntitle: Shop API\n---\n<!-- START_INFO -->\n# Info\n<!-- END_INFO -->\n\n# Users\n")
            .unwrap();

        assert!(page.contains("<title>Shop API</title>"));
        assert!(page.contains("<h1>Users</h1>"));
        assert!(!page.contains("title: Shop API"));
    }

    #[test]
    fn test_write_markdown_creates_both_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OutputPaths::new(temp_dir.path().join("docs"));
        let mut groups = group_routes(vec![descriptor("a1", "Users", "api/users")]);

        let report = renderer()
            .write_markdown(&paths, &mut groups, MergeEngine::default())
            .unwrap();

        assert_eq!(report, MergeReport::default());
        let published = std::fs::read_to_string(paths.markdown()).unwrap();
        let compare = std::fs::read_to_string(paths.compare()).unwrap();
        assert_eq!(published, compare);
        assert!(published.contains("<!-- START_a1 -->"));

        renderer().write_html(&paths).unwrap();
        assert!(paths.html().exists());
    }
}
