//! Binds a compiled template to a handler.

use crate::http::{Request, Response};
use crate::template::{MatchingMode, Template, TemplateMatch};
use crate::tern_error::TernResult;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Represents a function able to handle a dispatched request.
pub trait Handler: Send + Sync {
  /// Handle the request and produce a response.
  fn handle(&self, request: &mut Request) -> TernResult<Response>;
}

impl<F> Handler for F
where
  F: Fn(&mut Request) -> TernResult<Response> + Send + Sync,
{
  fn handle(&self, request: &mut Request) -> TernResult<Response> {
    self(request)
  }
}

/// Copies a query parameter into a request attribute once the route has
/// matched, so handlers can treat it like a path variable.
#[derive(Clone, Debug)]
pub struct Extraction {
  /// Name of the query parameter to read.
  pub source: String,
  /// Name of the attribute to write.
  pub target: String,
  /// Copy only the first value of a repeated parameter.
  pub first_only: bool,
}

/// A binding from a uri template to a handler, plus extraction rules.
///
/// Created at router configuration time and immutable afterwards.
pub struct Route {
  template: Template,
  mode: MatchingMode,
  handler: Arc<dyn Handler>,
  extractions: Vec<Extraction>,
}

impl Route {
  /// Creates a route matching the full path against the template.
  pub fn new(template: Template, handler: Arc<dyn Handler>) -> Route {
    Route { template, mode: MatchingMode::Equals, handler, extractions: Vec::new() }
  }

  /// Sets the matching mode. `StartsWith` turns the route into a prefix route.
  pub fn with_mode(mut self, mode: MatchingMode) -> Self {
    self.mode = mode;
    self
  }

  /// Adds an extraction rule: query parameter `source` lands in request
  /// attribute `target`. With `first_only` repeated parameters contribute
  /// only their first value, otherwise values are joined with commas.
  pub fn extract_query(
    mut self,
    source: impl AsRef<str>,
    target: impl AsRef<str>,
    first_only: bool,
  ) -> Self {
    self.extractions.push(Extraction {
      source: source.as_ref().to_string(),
      target: target.as_ref().to_string(),
      first_only,
    });
    self
  }

  /// The compiled template.
  pub fn template(&self) -> &Template {
    &self.template
  }

  /// The matching mode.
  pub fn mode(&self) -> MatchingMode {
    self.mode
  }

  /// The handler.
  pub fn handler(&self) -> &Arc<dyn Handler> {
    &self.handler
  }

  /// Matches the route template against the request path.
  pub fn matches(&self, request: &Request) -> Option<TemplateMatch> {
    self.template.matches(request.path(), self.mode)
  }

  /// Injects matched variables and extraction results into the request,
  /// then invokes the handler.
  pub fn dispatch(&self, request: &mut Request, matched: TemplateMatch) -> TernResult<Response> {
    for (name, value) in matched.variables {
      request.set_attribute(name, value);
    }

    for extraction in &self.extractions {
      let values = request.query_values(&extraction.source);
      let value = if extraction.first_only {
        values.first().map(|v| (*v).to_string())
      } else if values.is_empty() {
        None
      } else {
        Some(values.join(","))
      };

      if let Some(value) = value {
        request.set_attribute(&extraction.target, value);
      }
    }

    self.handler.handle(request)
  }
}

impl Debug for Route {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("Route({})", self.template.pattern()))
  }
}
