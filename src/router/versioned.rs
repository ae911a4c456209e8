use crate::error::Error;
use crate::filter::SelectionCriteria;
use crate::manifest::{RouteEntry, RouteTable};
use crate::router::RouterFlavor;
use log::debug;

/// Router registering routes per API version.
///
/// The route prefix names the version whose routes are considered and is mandatory.
/// Within that version an empty allowlist selects every route.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionedRouter;

impl RouterFlavor for VersionedRouter {
    fn name(&self) -> &'static str {
        "versioned"
    }

    fn check_criteria(&self, criteria: &SelectionCriteria) -> crate::error::Result<()> {
        if criteria.route_prefix.is_none() {
            debug!("No API version given for the versioned router");
            return Err(Error::NoSelectionCriteria);
        }
        Ok(())
    }

    fn route_table<'a>(
        &self,
        table: &'a RouteTable,
        criteria: &SelectionCriteria,
    ) -> Vec<&'a RouteEntry> {
        let version = criteria.route_prefix.as_deref();
        debug!("Using routes registered for version {:?}", version);
        table
            .routes
            .iter()
            .filter(|route| version.is_some() && route.version.as_deref() == version)
            .collect()
    }

    fn is_selected(&self, route: &RouteEntry, criteria: &SelectionCriteria) -> bool {
        criteria.routes.is_empty() || criteria.matches(route, &route.uri)
    }

    fn full_uri(&self, route: &RouteEntry) -> String {
        route.uri.clone()
    }
}
