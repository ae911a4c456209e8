use crate::client::{apply_bindings, ExampleClient, ExampleRequest, ExampleResponse};
use crate::filter::{self, SelectionCriteria};
use crate::impersonation::Impersonator;
use crate::manifest::{RouteEntry, RouteTable};
use crate::metadata::MetadataProvider;
use crate::router::{
    resolve_methods, route_id, route_label, DocParameter, HttpMethod, RouteDescriptor,
    RouterFlavor,
};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Options shared by every route of a run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Capture example responses
    pub with_response: bool,
    /// Route parameter bindings applied to example call URIs
    pub bindings: BTreeMap<String, String>,
    /// Extra headers sent with every example call
    pub headers: Vec<(String, String)>,
    /// Header carrying an impersonated user's token
    pub token_header: String,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            with_response: true,
            bindings: BTreeMap::new(),
            headers: Vec::new(),
            token_header: "X-Token".to_string(),
        }
    }
}

/// A selected route that was left out of the documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRoute {
    /// `[METHODS] uri`
    pub label: String,
    pub reason: String,
}

/// Result of processing a route table.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Documented routes in processing order
    pub routes: Vec<RouteDescriptor>,
    pub skipped: Vec<SkippedRoute>,
}

/// A validated route waiting to be processed.
struct PendingRoute<'r> {
    route: &'r RouteEntry,
    action: &'r str,
    methods: Vec<HttpMethod>,
    uri: String,
}

/// Turns selected routes into [`RouteDescriptor`]s.
///
/// The processor is flavor-agnostic: the [`RouterFlavor`] decides which routes are
/// selected and how URIs look, everything else is shared. Routes answering to `DELETE`
/// are processed after all other routes so their example calls cannot remove data the
/// other example calls rely on.
pub struct RouteProcessor<'a> {
    metadata: &'a dyn MetadataProvider,
    client: Option<&'a dyn ExampleClient>,
    impersonator: Option<Impersonator<'a>>,
    options: ProcessOptions,
}

impl<'a> RouteProcessor<'a> {
    pub fn new(metadata: &'a dyn MetadataProvider, options: ProcessOptions) -> Self {
        Self {
            metadata,
            client: None,
            impersonator: None,
            options,
        }
    }

    /// Client used for example calls; without one only `@response` examples are used.
    pub fn with_client(mut self, client: &'a dyn ExampleClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_impersonator(mut self, impersonator: Impersonator<'a>) -> Self {
        self.impersonator = Some(impersonator);
        self
    }

    /// Processes every selected route of the table.
    ///
    /// # Errors
    ///
    /// Fails only when the flavor rejects the selection criteria; route-level problems
    /// are logged and recorded in [`ProcessOutcome::skipped`].
    pub fn process(
        &mut self,
        flavor: &dyn RouterFlavor,
        table: &RouteTable,
        criteria: &SelectionCriteria,
    ) -> crate::error::Result<ProcessOutcome> {
        flavor.check_criteria(criteria)?;
        debug!("Processing routes with the {} router", flavor.name());

        let mut outcome = ProcessOutcome::default();
        let mut deferred = Vec::new();

        for route in flavor.select(table, criteria) {
            let methods = resolve_methods(route);
            let uri = flavor.full_uri(route);
            let label = route_label(&methods, &uri);

            let action = match filter::validate(route, self.metadata) {
                Ok(action) if !methods.is_empty() => action,
                Ok(_) => {
                    Self::skip(&mut outcome, label, "no documentable HTTP method".to_string());
                    continue;
                }
                Err(rejection) => {
                    Self::skip(&mut outcome, label, rejection.to_string());
                    continue;
                }
            };

            let pending = PendingRoute {
                route,
                action,
                methods,
                uri,
            };

            if pending.methods.contains(&HttpMethod::Delete) {
                debug!("Deferring {}", label);
                deferred.push(pending);
            } else {
                self.process_pending(pending, &mut outcome);
            }
        }

        for pending in deferred {
            self.process_pending(pending, &mut outcome);
        }

        Ok(outcome)
    }

    fn skip(outcome: &mut ProcessOutcome, label: String, reason: String) {
        warn!("Skipping route: {} ({})", label, reason);
        outcome.skipped.push(SkippedRoute { label, reason });
    }

    fn process_pending(&mut self, pending: PendingRoute<'_>, outcome: &mut ProcessOutcome) {
        let label = route_label(&pending.methods, &pending.uri);
        let id = route_id(pending.action, &pending.methods, &pending.uri);
        if outcome.routes.iter().any(|r| r.id == id) {
            Self::skip(outcome, label, "already documented by an identical route".to_string());
            return;
        }

        match self.process_route(&pending) {
            Ok(descriptor) => {
                info!("Processed route: {}", label);
                outcome.routes.push(descriptor);
            }
            Err(reason) => Self::skip(outcome, label, reason),
        }
    }

    /// Builds the descriptor of a validated route. Errors are skip reasons.
    fn process_route(&mut self, pending: &PendingRoute<'_>) -> Result<RouteDescriptor, String> {
        let action = pending.action;
        let doc = self.metadata.handler_doc(action).unwrap_or_default();

        let (example_request, example_response) = if !self.options.with_response {
            (None, None)
        } else if let Some(static_example) = doc.tag("response") {
            debug!("Using documented example response for {}", action);
            (None, Some(ExampleResponse::new(200, static_example)))
        } else if let Some(client) = self.client {
            let request = self.example_request(pending)?;
            let response = match client.call(&request) {
                Ok(response) => Some(response),
                Err(e) => {
                    warn!(
                        "Unable to capture example response for {}: {}",
                        route_label(&pending.methods, &pending.uri),
                        e
                    );
                    None
                }
            };
            (Some(request), response)
        } else {
            (None, None)
        };

        Ok(RouteDescriptor {
            id: route_id(action, &pending.methods, &pending.uri),
            action: action.to_string(),
            methods: pending.methods.clone(),
            uri: pending.uri.clone(),
            name: pending.route.name.clone(),
            resource: self.metadata.resource(action),
            middleware: pending.route.middleware.clone(),
            title: doc.summary.clone(),
            description: doc.description.clone(),
            parameters: DocParameter::from_docblock(&doc),
            example_request,
            example_response,
            rendered: String::new(),
            modified: None,
        })
    }

    /// Example request of a route, authenticated when the action maps to a user.
    fn example_request(&mut self, pending: &PendingRoute<'_>) -> Result<ExampleRequest, String> {
        let mut headers = Vec::new();
        if !self
            .options
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("accept"))
        {
            headers.push(("Accept".to_string(), "application/json".to_string()));
        }
        headers.extend(self.options.headers.iter().cloned());

        if let Some(impersonator) = self.impersonator.as_mut() {
            if let Some(identity) = impersonator
                .identity_for(pending.action)
                .map_err(|e| e.to_string())?
            {
                info!("Processing {} as {}", pending.action, identity.username);
                headers.push(identity.header(&self.options.token_header));
            }
        }

        Ok(ExampleRequest {
            method: pending.methods[0],
            uri: apply_bindings(&pending.uri, &self.options.bindings),
            headers,
        })
    }
}
