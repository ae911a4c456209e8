//! Preservation of manual edits across regenerations.
//!
//! Every route fragment in the published document is wrapped in
//! `<!-- START_<id> -->` / `<!-- END_<id> -->` markers. Next to the published
//! `index.md` the generator keeps `.compare.md`, which always holds the unedited
//! output of the last generation. A fragment whose published text differs from its
//! compare text has been edited by hand and is kept, unless the run is forced.

use crate::router::RouteDescriptor;
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::Path;

pub const INFO_START: &str = "<!-- START_INFO -->";
pub const INFO_END: &str = "<!-- END_INFO -->";

pub fn start_marker(id: &str) -> String {
    format!("<!-- START_{} -->", id)
}

pub fn end_marker(id: &str) -> String {
    format!("<!-- END_{} -->", id)
}

/// A marker-delimited section of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// The section including its markers
    pub whole: &'a str,
    /// Text between the markers
    pub inner: &'a str,
}

/// Finds the section delimited by `start` and the first following `end`.
pub fn extract_between<'a>(doc: &'a str, start: &str, end: &str) -> Option<Section<'a>> {
    let begin = doc.find(start)?;
    let inner_begin = begin + start.len();
    let inner_len = doc[inner_begin..].find(end)?;
    let inner_end = inner_begin + inner_len;

    Some(Section {
        whole: &doc[begin..inner_end + end.len()],
        inner: &doc[inner_begin..inner_end],
    })
}

/// Section of the route with the given id.
pub fn extract_fragment<'a>(doc: &'a str, id: &str) -> Option<Section<'a>> {
    extract_between(doc, &start_marker(id), &end_marker(id))
}

/// Info banner of a document, without surrounding newlines.
pub fn extract_info(doc: &str) -> Option<String> {
    extract_between(doc, INFO_START, INFO_END).map(|s| s.inner.trim_matches('\n').to_string())
}

/// Frontmatter of a document: the block between the leading `---` and the `---`
/// preceding the info banner, without surrounding newlines.
pub fn extract_frontmatter(doc: &str) -> Option<String> {
    let pattern = format!(r"(?s)\A---(.*)---\s{}", regex::escape(INFO_START));
    let re = Regex::new(&pattern).ok()?;
    re.captures(doc)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_matches('\n').to_string())
}

/// Documents written by the previous run.
#[derive(Debug, Clone, Default)]
pub struct PriorOutput {
    /// Previous `index.md`, possibly edited by hand
    pub published: Option<String>,
    /// Previous `.compare.md`
    pub compare: Option<String>,
}

impl PriorOutput {
    /// Reads both files; missing or unreadable files count as absent.
    pub fn load(published: &Path, compare: &Path) -> Self {
        let read = |path: &Path| match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("No previous output at {}: {}", path.display(), e);
                None
            }
        };

        Self {
            published: read(published),
            compare: read(compare),
        }
    }
}

/// Frontmatter and info banner heading the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub frontmatter: String,
    pub info: String,
}

/// What a merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Ids of routes whose manual edits were kept
    pub preserved: Vec<String>,
    /// Ids of routes whose manual edits were overwritten
    pub discarded: Vec<String>,
    /// Warnings emitted, in order
    pub warnings: Vec<String>,
}

/// Decides, per route, between the fresh fragment and a manual edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine {
    force: bool,
}

impl MergeEngine {
    /// With `force`, manual edits are discarded in favour of fresh output.
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    /// Keeps the previous frontmatter and info banner when the published file has them.
    pub fn preamble(&self, prior: &PriorOutput, fresh: Preamble) -> Preamble {
        let Some(published) = prior.published.as_deref() else {
            return fresh;
        };

        Preamble {
            frontmatter: extract_frontmatter(published).unwrap_or(fresh.frontmatter),
            info: extract_info(published).unwrap_or(fresh.info),
        }
    }

    /// Sets [`RouteDescriptor::modified`] on every route whose published fragment was
    /// edited since the last generation, unless forced.
    ///
    /// Routes must already carry their freshly rendered fragment.
    pub fn merge<'r>(
        &self,
        prior: &PriorOutput,
        routes: impl IntoIterator<Item = &'r mut RouteDescriptor>,
    ) -> MergeReport {
        let mut report = MergeReport::default();
        let (Some(published), Some(compare)) = (prior.published.as_deref(), prior.compare.as_deref())
        else {
            debug!("No previous output to compare against, using fresh documentation");
            return report;
        };

        for route in routes {
            let Some(edited) = extract_fragment(published, &route.id) else {
                continue;
            };
            let changed = extract_fragment(compare, &route.id)
                .is_some_and(|generated| generated.inner != edited.inner);
            if !changed {
                continue;
            }

            if self.force {
                let warning = format!("Discarded manual changes for route {}", route.label());
                warn!("{}", warning);
                report.warnings.push(warning);
                report.discarded.push(route.id.clone());
            } else {
                let warning = format!("Skipping modified route {}", route.label());
                warn!("{}", warning);
                report.warnings.push(warning);
                report.preserved.push(route.id.clone());
                route.modified = Some(edited.whole.to_string());
            }
        }

        report
    }
}
