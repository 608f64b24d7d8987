//! The structured request form this core dispatches on.
//!
//! Parsing raw bytes into this form is the connector's job, nothing in
//! here reads from a wire.

use crate::conditions::Conditions;
use crate::conneg::{ClientInfo, Representation};
use crate::http::method::Method;
use std::collections::HashMap;

/// A parsed inbound request.
///
/// The attribute map is the per request scratch space, the router copies
/// matched template variables into it and extraction rules add query
/// values. Each request is owned by exactly one thread, nothing here is
/// shared.
#[derive(Clone, Debug)]
pub struct Request {
  method: Method,
  path: String,
  query: Vec<(String, String)>,
  client_info: ClientInfo,
  conditions: Conditions,
  entity: Option<Representation>,
  attributes: HashMap<String, String>,
}

impl Request {
  /// Creates a request with the given method and path and no other state.
  pub fn new(method: Method, path: impl AsRef<str>) -> Request {
    Request {
      method,
      path: path.as_ref().to_string(),
      query: Vec::new(),
      client_info: ClientInfo::default(),
      conditions: Conditions::default(),
      entity: None,
      attributes: HashMap::new(),
    }
  }

  /// Shorthand for a GET request.
  pub fn get(path: impl AsRef<str>) -> Request {
    Request::new(Method::Get, path)
  }

  /// Adds a query parameter. Parameters keep their order and may repeat.
  pub fn with_query(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
    self.query.push((name.as_ref().to_string(), value.as_ref().to_string()));
    self
  }

  /// Sets the client preference lists.
  pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
    self.client_info = client_info;
    self
  }

  /// Sets the precondition set.
  pub fn with_conditions(mut self, conditions: Conditions) -> Self {
    self.conditions = conditions;
    self
  }

  /// Sets the request entity (PUT/POST bodies).
  pub fn with_entity(mut self, entity: Representation) -> Self {
    self.entity = Some(entity);
    self
  }

  /// The request method.
  pub fn method(&self) -> &Method {
    &self.method
  }

  /// Replaces the method. Used by the client caller when a 303 redirect
  /// converts the retried call into a GET.
  pub fn set_method(&mut self, method: Method) {
    self.method = method;
  }

  /// The request path as received, still percent encoded.
  pub fn path(&self) -> &str {
    self.path.as_str()
  }

  /// Rewrites the path. Used by server side redirection.
  pub fn set_path(&mut self, path: impl AsRef<str>) {
    self.path = path.as_ref().to_string();
  }

  /// Appends a query parameter in place. Used by server side redirection
  /// when the rewritten target carries a query string.
  pub fn add_query(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) {
    self.query.push((name.as_ref().to_string(), value.as_ref().to_string()));
  }

  /// All values of the named query parameter in declaration order.
  pub fn query_values(&self, name: &str) -> Vec<&str> {
    self.query.iter().filter(|(n, _)| n == name).map(|(_, v)| v.as_str()).collect()
  }

  /// The first value of the named query parameter.
  pub fn query_value(&self, name: &str) -> Option<&str> {
    self.query.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
  }

  /// The client preference lists.
  pub fn client_info(&self) -> &ClientInfo {
    &self.client_info
  }

  /// The precondition set.
  pub fn conditions(&self) -> &Conditions {
    &self.conditions
  }

  /// The request entity, if any.
  pub fn entity(&self) -> Option<&Representation> {
    self.entity.as_ref()
  }

  /// Drops the request entity. A 303 redirect retry must not resend it.
  pub fn clear_entity(&mut self) {
    self.entity = None;
  }

  /// Looks up a request attribute (matched path variables land here).
  pub fn attribute(&self, name: &str) -> Option<&str> {
    self.attributes.get(name).map(String::as_str)
  }

  /// Sets a request attribute.
  pub fn set_attribute(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) {
    self.attributes.insert(name.as_ref().to_string(), value.as_ref().to_string());
  }

  /// The full attribute map.
  pub fn attributes(&self) -> &HashMap<String, String> {
    &self.attributes
  }
}
