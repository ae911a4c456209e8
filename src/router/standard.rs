use crate::error::Error;
use crate::filter::SelectionCriteria;
use crate::manifest::{RouteEntry, RouteTable};
use crate::router::RouterFlavor;

/// The application's default router.
///
/// Every registered route is considered, an optional global URI prefix is prepended to
/// documented URIs, and at least one selection criterion is mandatory.
#[derive(Debug, Clone, Default)]
pub struct StandardRouter {
    uri_prefix: Option<String>,
}

impl StandardRouter {
    pub fn new(uri_prefix: Option<String>) -> Self {
        Self {
            uri_prefix: uri_prefix.filter(|p| !p.trim_matches('/').is_empty()),
        }
    }
}

impl RouterFlavor for StandardRouter {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn check_criteria(&self, criteria: &SelectionCriteria) -> crate::error::Result<()> {
        if criteria.is_empty() {
            return Err(Error::NoSelectionCriteria);
        }
        Ok(())
    }

    fn route_table<'a>(
        &self,
        table: &'a RouteTable,
        _criteria: &SelectionCriteria,
    ) -> Vec<&'a RouteEntry> {
        table.routes.iter().collect()
    }

    fn is_selected(&self, route: &RouteEntry, criteria: &SelectionCriteria) -> bool {
        criteria.matches(route, &route.uri)
    }

    fn full_uri(&self, route: &RouteEntry) -> String {
        match &self.uri_prefix {
            Some(prefix) => {
                let prefix = prefix.trim_matches('/');
                let uri = route.uri.trim_start_matches('/');
                if uri.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{}/{}", prefix, uri)
                }
            }
            None => route.uri.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        let mut table = RouteTable::default();
        table.routes = vec![
            RouteEntry::new(&["GET"], "users").with_name("users.index"),
            RouteEntry::new(&["GET"], "orders").with_middleware("auth"),
            RouteEntry::new(&["GET"], "health"),
        ];
        table
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let router = StandardRouter::default();
        let err = router.check_criteria(&SelectionCriteria::default()).unwrap_err();
        assert!(matches!(err, Error::NoSelectionCriteria));
    }

    #[test]
    fn test_select_by_criteria() {
        let router = StandardRouter::default();
        let criteria = SelectionCriteria {
            routes: vec!["users.index".to_string()],
            middleware: Some("auth".to_string()),
            ..Default::default()
        };
        assert!(router.check_criteria(&criteria).is_ok());

        let table = table();
        let uris: Vec<_> = router
            .select(&table, &criteria)
            .iter()
            .map(|r| r.uri.as_str())
            .collect();
        assert_eq!(uris, vec!["users", "orders"]);
    }

    #[test]
    fn test_prefix_matches_unprefixed_uri() {
        let router = StandardRouter::new(Some("/api/".to_string()));
        let criteria = SelectionCriteria {
            route_prefix: Some("h*".to_string()),
            ..Default::default()
        };
        let table = table();
        let selected = router.select(&table, &criteria);
        assert_eq!(selected.len(), 1);
        assert_eq!(router.full_uri(selected[0]), "api/health");
    }

    #[test]
    fn test_full_uri_without_prefix() {
        let router = StandardRouter::new(Some("/".to_string()));
        assert_eq!(router.full_uri(&RouteEntry::new(&["GET"], "users")), "users");
    }
}
