//! The structured response produced by dispatch.

use crate::conneg::Representation;
use crate::http::method::Method;
use crate::http::status::StatusCode;
use std::collections::BTreeSet;

/// The outcome of dispatching one request: a status, an optional entity,
/// an optional allowed-methods set and an optional redirect location.
/// Serializing this onto a wire is the connector's job.
#[derive(Clone, Debug)]
pub struct Response {
  status: StatusCode,
  entity: Option<Representation>,
  allowed: BTreeSet<Method>,
  location: Option<String>,
}

impl Response {
  /// Creates a response with the given status and no entity.
  pub fn new(status: StatusCode) -> Response {
    Response { status, entity: None, allowed: BTreeSet::new(), location: None }
  }

  /// A 200 response carrying the given entity.
  pub fn ok(entity: Representation) -> Response {
    Response::new(StatusCode::OK).with_entity(entity)
  }

  /// A 204 response.
  pub fn no_content() -> Response {
    Response::new(StatusCode::NoContent)
  }

  /// A 404 response.
  pub fn not_found() -> Response {
    Response::new(StatusCode::NotFound)
  }

  /// A redirect response pointing at the given location.
  pub fn redirect(status: StatusCode, location: impl AsRef<str>) -> Response {
    Response::new(status).with_location(location)
  }

  /// Attaches an entity.
  pub fn with_entity(mut self, entity: Representation) -> Self {
    self.entity = Some(entity);
    self
  }

  /// Sets the redirect location.
  pub fn with_location(mut self, location: impl AsRef<str>) -> Self {
    self.location = Some(location.as_ref().to_string());
    self
  }

  /// The status code.
  pub fn status(&self) -> &StatusCode {
    &self.status
  }

  /// Replaces the status code.
  pub fn set_status(&mut self, status: StatusCode) {
    self.status = status;
  }

  /// The entity, if any.
  pub fn entity(&self) -> Option<&Representation> {
    self.entity.as_ref()
  }

  /// The methods allowed on the resource. Only populated on 405 responses.
  pub fn allowed_methods(&self) -> &BTreeSet<Method> {
    &self.allowed
  }

  /// Replaces the allowed-methods set.
  pub fn set_allowed_methods(&mut self, allowed: BTreeSet<Method>) {
    self.allowed = allowed;
  }

  /// The redirect location, if any.
  pub fn location(&self) -> Option<&str> {
    self.location.as_deref()
  }
}
