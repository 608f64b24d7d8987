//! Contains the impl of the router.

use crate::http::{Request, Response};
use crate::route::{Handler, Route};
use crate::template::{Template, TemplateMatch};
use crate::tern_error::TernResult;
use crate::util::unwrap_poison;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, RwLock};

/// How a router picks among several matching routes.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum RoutingMode {
  /// The first route in attachment order whose template matches wins.
  FirstMatch,
  /// Every matching route is scored, the most specific one wins.
  BestMatch,
}

/// Score of one matching route under best-match selection.
/// Consumed length first, then the literal prefix, then a penalty for
/// variable count. Attachment order breaks remaining ties, earlier wins.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug)]
struct RouteScore {
  consumed: usize,
  literal_prefix: usize,
  fewer_variables: isize,
}

impl RouteScore {
  fn new(route: &Route, matched: &TemplateMatch) -> RouteScore {
    RouteScore {
      consumed: matched.consumed,
      literal_prefix: route.template().literal_prefix_len(),
      fewer_variables: -(route.template().variable_count() as isize),
    }
  }
}

/// An ordered collection of routes.
///
/// The route list is a copy-on-write snapshot: attach and detach swap in a
/// new list while in-flight matches keep reading the old one, so
/// configuration changes never block or corrupt concurrent matching.
pub struct Router {
  routes: RwLock<Arc<Vec<Arc<Route>>>>,
  mode: RoutingMode,
  default_handler: Arc<dyn Handler>,
}

fn default_not_found(_: &mut Request) -> TernResult<Response> {
  Ok(Response::not_found())
}

impl Router {
  /// Creates an empty router with the given matching mode and a default
  /// handler answering 404.
  pub fn new(mode: RoutingMode) -> Router {
    Router {
      routes: RwLock::new(Arc::new(Vec::new())),
      mode,
      default_handler: Arc::new(default_not_found),
    }
  }

  /// Replaces the handler invoked when no route matches.
  pub fn with_default_handler(mut self, handler: impl Handler + 'static) -> Self {
    self.default_handler = Arc::new(handler);
    self
  }

  /// Compiles the pattern and appends a route for it.
  /// Template errors surface immediately, before the route is attached.
  pub fn attach(
    &self,
    pattern: impl AsRef<str>,
    handler: impl Handler + 'static,
  ) -> TernResult<Arc<Route>> {
    let template = Template::compile(pattern)?;
    self.attach_route(Route::new(template, Arc::new(handler)))
  }

  /// Appends an already built route.
  pub fn attach_route(&self, route: Route) -> TernResult<Arc<Route>> {
    let route = Arc::new(route);
    let mut guard = unwrap_poison(self.routes.write())?;
    let mut next = Vec::clone(&guard);
    next.push(Arc::clone(&route));
    *guard = Arc::new(next);
    Ok(route)
  }

  /// Removes a previously attached route. A no-op for unknown routes.
  pub fn detach(&self, route: &Arc<Route>) -> TernResult<()> {
    let mut guard = unwrap_poison(self.routes.write())?;
    let next: Vec<Arc<Route>> =
      guard.iter().filter(|r| !Arc::ptr_eq(r, route)).cloned().collect();
    *guard = Arc::new(next);
    Ok(())
  }

  /// The current route list snapshot.
  pub fn routes(&self) -> TernResult<Arc<Vec<Arc<Route>>>> {
    Ok(Arc::clone(&*unwrap_poison(self.routes.read())?))
  }

  /// Selects the route for the request, or None if nothing matches.
  /// No lock is held while templates are being matched.
  pub fn select(&self, request: &Request) -> TernResult<Option<(Arc<Route>, TemplateMatch)>> {
    let snapshot = self.routes()?;

    let mut best: Option<(RouteScore, Arc<Route>, TemplateMatch)> = None;
    for route in snapshot.iter() {
      let Some(matched) = route.matches(request) else {
        continue;
      };

      log::trace!("route '{}' matches path '{}'", route.template().pattern(), request.path());

      if self.mode == RoutingMode::FirstMatch {
        return Ok(Some((Arc::clone(route), matched)));
      }

      let score = RouteScore::new(route, &matched);
      match &best {
        Some((current, _, _)) if *current >= score => {}
        _ => best = Some((score, Arc::clone(route), matched)),
      }
    }

    Ok(best.map(|(_, route, matched)| (route, matched)))
  }

  /// Routes the request: the selected route's variables land in the
  /// request attributes and its handler runs. Falls through to the default
  /// handler when no route matches.
  pub fn handle(&self, request: &mut Request) -> TernResult<Response> {
    match self.select(request)? {
      Some((route, matched)) => route.dispatch(request, matched),
      None => {
        log::trace!("no route matches path '{}'", request.path());
        self.default_handler.handle(request)
      }
    }
  }
}

impl Debug for Router {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let count = self.routes().map(|r| r.len()).unwrap_or(0);
    f.write_fmt(format_args!("Router(mode={:?}, routes={})", self.mode, count))
  }
}
