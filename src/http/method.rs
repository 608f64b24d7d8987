//! Provides functionality for handling HTTP methods.

use std::fmt::Display;

/// Represents an HTTP method.
#[derive(Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub enum Method {
  /// The `GET` method.
  Get,
  /// The `HEAD` method.
  Head,
  /// The `POST` method.
  Post,
  /// The `PUT` method.
  Put,
  /// The `DELETE` method.
  Delete,
  /// The `OPTIONS` method.
  Options,
  /// Anything else your heart desires.
  Custom(String),
}

static WELL_KNOWN: &[Method] =
  &[Method::Get, Method::Head, Method::Post, Method::Put, Method::Delete, Method::Options];

impl Method {
  /// Attempts to convert from the HTTP verb into an enum variant.
  ///
  /// ## Example
  /// ```
  /// let method = tern::Method::from("GET");
  /// assert_eq!(method, tern::Method::Get);
  /// ```
  pub fn from(name: &str) -> Self {
    match name {
      "GET" => Self::Get,
      "HEAD" => Self::Head,
      "POST" => Self::Post,
      "PUT" => Self::Put,
      "DELETE" => Self::Delete,
      "OPTIONS" => Self::Options,
      _ => Self::Custom(name.to_ascii_uppercase()),
    }
  }

  /// Returns an array of all well known http Methods.
  #[must_use]
  pub fn well_known() -> &'static [Method] {
    WELL_KNOWN
  }

  /// returns true if this is a well known http method.
  pub fn is_well_known(&self) -> bool {
    !matches!(self, Self::Custom(_))
  }

  /// A safe method does not modify server state.
  /// Conditional handling treats safe methods specially, a satisfied
  /// If-None-Match yields 304 for safe methods and 412 for unsafe ones.
  pub fn is_safe(&self) -> bool {
    matches!(self, Self::Get | Self::Head | Self::Options)
  }

  /// An idempotent method can be retried without changing the outcome.
  /// The client side retry loop only retries idempotent methods.
  pub fn is_idempotent(&self) -> bool {
    matches!(self, Self::Get | Self::Head | Self::Put | Self::Delete | Self::Options)
  }

  /// returns a static &str for well known http methods, returns none for custom http methods.
  #[must_use]
  pub fn well_known_str(&self) -> Option<&'static str> {
    Some(match self {
      Self::Get => "GET",
      Self::Head => "HEAD",
      Self::Post => "POST",
      Self::Put => "PUT",
      Self::Delete => "DELETE",
      Self::Options => "OPTIONS",
      Self::Custom(_) => return None,
    })
  }

  /// returns the name of the method as a &str.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Custom(name) => name.as_str(),
      other => other.well_known_str().unwrap_or(""),
    }
  }
}

impl Display for Method {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}
