//! Provides functionality for handling HTTP status codes.

use std::fmt::Display;

/// Represents an HTTP status code.
/// Only the codes this dispatch core can itself produce are spelled out,
/// everything else travels through `Custom`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
  /// `200 OK`: Request succeeded.
  OK,
  /// `201 Created`: Resource created.
  Created,
  /// `204 No Content`: There is no content to send for this request.
  NoContent,
  /// `301 Moved Permanently`: The resource has moved permanently to a new location.
  MovedPermanently,
  /// `302 Found`: The resource has moved temporarily to a new location.
  Found,
  /// `303 See Other`: The resource can be found under a different URI.
  SeeOther,
  /// `304 Not Modified`: The resource has not been modified since the last request.
  NotModified,
  /// `307 Temporary Redirect`: The resource has moved temporarily to a new location.
  TemporaryRedirect,
  /// `308 Permanent Redirect`: The resource has moved permanently to a new location.
  PermanentRedirect,
  /// `400 Bad Request`: The request could not be understood by the server.
  BadRequest,
  /// `404 Not Found`: The server can not find the requested resource.
  NotFound,
  /// `405 Method Not Allowed`: The method specified in the request is not allowed for the resource.
  MethodNotAllowed,
  /// `406 Not Acceptable`: No content that meets the criteria is available.
  NotAcceptable,
  /// `412 Precondition Failed`: A precondition in the request headers is not met.
  PreconditionFailed,
  /// `500 Internal Server Error`: The server encountered an unexpected error.
  InternalServerError,
  /// `502 Bad Gateway`: An upstream server returned an invalid response.
  BadGateway,
  /// `503 Service Unavailable`: The server is temporarily unable to handle the request.
  ServiceUnavailable,
  /// `504 Gateway Timeout`: An upstream server timed out.
  GatewayTimeout,
  /// Any other status code.
  Custom(u16),
}

impl StatusCode {
  /// Builds a status code from its numeric value, mapping onto a well
  /// known variant where one exists.
  pub fn from_code(code: u16) -> Self {
    match code {
      200 => Self::OK,
      201 => Self::Created,
      204 => Self::NoContent,
      301 => Self::MovedPermanently,
      302 => Self::Found,
      303 => Self::SeeOther,
      304 => Self::NotModified,
      307 => Self::TemporaryRedirect,
      308 => Self::PermanentRedirect,
      400 => Self::BadRequest,
      404 => Self::NotFound,
      405 => Self::MethodNotAllowed,
      406 => Self::NotAcceptable,
      412 => Self::PreconditionFailed,
      500 => Self::InternalServerError,
      502 => Self::BadGateway,
      503 => Self::ServiceUnavailable,
      504 => Self::GatewayTimeout,
      other => Self::Custom(other),
    }
  }

  /// Returns the numeric code.
  pub fn code(&self) -> u16 {
    match self {
      Self::OK => 200,
      Self::Created => 201,
      Self::NoContent => 204,
      Self::MovedPermanently => 301,
      Self::Found => 302,
      Self::SeeOther => 303,
      Self::NotModified => 304,
      Self::TemporaryRedirect => 307,
      Self::PermanentRedirect => 308,
      Self::BadRequest => 400,
      Self::NotFound => 404,
      Self::MethodNotAllowed => 405,
      Self::NotAcceptable => 406,
      Self::PreconditionFailed => 412,
      Self::InternalServerError => 500,
      Self::BadGateway => 502,
      Self::ServiceUnavailable => 503,
      Self::GatewayTimeout => 504,
      Self::Custom(code) => *code,
    }
  }

  /// Returns the canonical reason phrase, or "Unknown" for custom codes.
  pub fn reason_phrase(&self) -> &'static str {
    match self {
      Self::OK => "OK",
      Self::Created => "Created",
      Self::NoContent => "No Content",
      Self::MovedPermanently => "Moved Permanently",
      Self::Found => "Found",
      Self::SeeOther => "See Other",
      Self::NotModified => "Not Modified",
      Self::TemporaryRedirect => "Temporary Redirect",
      Self::PermanentRedirect => "Permanent Redirect",
      Self::BadRequest => "Bad Request",
      Self::NotFound => "Not Found",
      Self::MethodNotAllowed => "Method Not Allowed",
      Self::NotAcceptable => "Not Acceptable",
      Self::PreconditionFailed => "Precondition Failed",
      Self::InternalServerError => "Internal Server Error",
      Self::BadGateway => "Bad Gateway",
      Self::ServiceUnavailable => "Service Unavailable",
      Self::GatewayTimeout => "Gateway Timeout",
      Self::Custom(_) => "Unknown",
    }
  }

  /// true for 2xx codes.
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.code())
  }

  /// true for 3xx codes.
  pub fn is_redirection(&self) -> bool {
    (300..400).contains(&self.code())
  }

  /// true for 4xx codes.
  pub fn is_client_error(&self) -> bool {
    (400..500).contains(&self.code())
  }

  /// true for 5xx codes.
  pub fn is_server_error(&self) -> bool {
    (500..600).contains(&self.code())
  }

  /// Transient server side failures that an idempotent request may retry.
  pub fn is_recoverable_error(&self) -> bool {
    matches!(self, Self::BadGateway | Self::ServiceUnavailable | Self::GatewayTimeout)
  }
}

impl Display for StatusCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.code(), self.reason_phrase())
  }
}
