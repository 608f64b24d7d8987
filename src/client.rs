//! Client side counterpart of the dispatch core: bounded retry for
//! idempotent calls and redirect following with loop detection.

use crate::http::{Method, Request, Response, StatusCode};
use crate::tern_error::TernResult;
use std::thread;
use std::time::Duration;

/// A synchronous outbound connector. Sending the request over a wire (or
/// straight into a local router) is entirely its business.
pub trait Connector: Send + Sync {
  /// Performs one exchange.
  fn call(&self, request: &Request) -> TernResult<Response>;
}

impl<F> Connector for F
where
  F: Fn(&Request) -> TernResult<Response> + Send + Sync,
{
  fn call(&self, request: &Request) -> TernResult<Response> {
    self(request)
  }
}

/// Wraps a connector with retry and redirection handling.
///
/// A recoverable error status (502/503/504) is retried after a fixed delay,
/// up to a bounded number of attempts, and only for idempotent methods
/// whose entity can be resent. Request entities here are owned byte
/// buffers, so a present entity is always resendable.
///
/// Redirect following tracks every visited target reference and aborts as
/// soon as one repeats, an infinite redirect loop therefore terminates
/// after its first full cycle. A 303 converts the follow-up call to GET
/// and drops the entity.
pub struct ClientCaller<C: Connector> {
  connector: C,
  retry_on_error: bool,
  retry_attempts: u32,
  retry_delay: Duration,
  follow_redirects: bool,
}

impl<C: Connector> ClientCaller<C> {
  /// Wraps the connector with the default policy: two retries two seconds
  /// apart, redirects followed.
  pub fn new(connector: C) -> ClientCaller<C> {
    ClientCaller {
      connector,
      retry_on_error: true,
      retry_attempts: 2,
      retry_delay: Duration::from_secs(2),
      follow_redirects: true,
    }
  }

  /// Enables or disables retrying recoverable errors.
  pub fn retry_on_error(mut self, retry: bool) -> Self {
    self.retry_on_error = retry;
    self
  }

  /// Sets how often a recoverable error is retried.
  pub fn retry_attempts(mut self, attempts: u32) -> Self {
    self.retry_attempts = attempts;
    self
  }

  /// Sets the fixed delay between retries.
  pub fn retry_delay(mut self, delay: Duration) -> Self {
    self.retry_delay = delay;
    self
  }

  /// Enables or disables redirect following.
  pub fn follow_redirects(mut self, follow: bool) -> Self {
    self.follow_redirects = follow;
    self
  }

  /// Performs the call, applying the retry and redirection policy.
  pub fn handle(&self, mut request: Request) -> TernResult<Response> {
    let mut visited: Vec<String> = vec![request.path().to_string()];
    let mut retries_left = self.retry_attempts;

    loop {
      let response = self.connector.call(&request)?;
      let status = response.status().clone();

      if self.retry_on_error
        && status.is_recoverable_error()
        && retries_left > 0
        && request.method().is_idempotent()
      {
        retries_left -= 1;
        log::warn!(
          "call to '{}' answered {}, retrying in {:?} ({} attempts left)",
          request.path(),
          status,
          self.retry_delay,
          retries_left
        );
        thread::sleep(self.retry_delay);
        continue;
      }

      if self.follow_redirects && status.is_redirection() {
        let location = response.location().map(|location| location.to_string());
        let Some(location) = location else {
          return Ok(response);
        };

        if visited.contains(&location) {
          log::warn!("redirect loop detected at '{location}', aborting");
          return Ok(response);
        }
        visited.push(location.clone());

        if status == StatusCode::SeeOther {
          request.set_method(Method::Get);
          request.clear_entity();
        }

        log::debug!("following {} to '{}'", status, location);
        request.set_path(location);
        retries_left = self.retry_attempts;
        continue;
      }

      return Ok(response);
    }
  }
}
