//! Handler metadata lookup.
//!
//! The generator never inspects handler code itself. Anything that can answer
//! "what does the documentation comment of this action say?" implements
//! [`MetadataProvider`]; the route manifest is the built-in implementation.

use crate::docblock::DocBlock;
use crate::manifest::RouteTable;

/// Group used for handlers whose controller declares no `@resource`.
pub const DEFAULT_RESOURCE: &str = "general";

/// Source of documentation metadata for route handlers.
pub trait MetadataProvider {
    /// Docblock of the handler method behind `action` (`Class@method`).
    fn handler_doc(&self, action: &str) -> Option<DocBlock>;

    /// Docblock of the controller class owning `action`.
    fn controller_doc(&self, action: &str) -> Option<DocBlock>;

    /// Resource group of an action: the controller's `@resource` tag, then the
    /// method's, then [`DEFAULT_RESOURCE`]. Only the first line of the tag counts.
    fn resource(&self, action: &str) -> String {
        let from = |doc: Option<DocBlock>| {
            doc.and_then(|d| {
                d.tag("resource")
                    .and_then(|r| r.lines().next())
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
            })
        };

        from(self.controller_doc(action))
            .or_else(|| from(self.handler_doc(action)))
            .unwrap_or_else(|| DEFAULT_RESOURCE.to_string())
    }

    /// Whether the handler opted out of documentation.
    fn is_hidden(&self, action: &str) -> bool {
        self.handler_doc(action).is_some_and(|d| d.is_hidden())
    }
}

impl MetadataProvider for RouteTable {
    fn handler_doc(&self, action: &str) -> Option<DocBlock> {
        self.handlers
            .get(action)
            .and_then(|h| h.doc.as_deref())
            .map(DocBlock::parse)
    }

    fn controller_doc(&self, action: &str) -> Option<DocBlock> {
        self.handlers
            .get(action)
            .and_then(|h| h.controller_doc.as_deref())
            .map(DocBlock::parse)
    }
}
