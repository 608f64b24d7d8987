//! Server side redirection handlers.

use crate::http::{Request, Response, StatusCode};
use crate::route::Handler;
use crate::template::Template;
use crate::tern_error::{TernError, TernResult};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Arc;

/// How a redirector answers a matched request.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum RedirectMode {
  /// Tell the client to permanently re-request the rewritten uri (308).
  ClientPermanent,
  /// Tell the client to temporarily re-request the rewritten uri (307).
  ClientTemporary,
  /// Re-dispatch internally without informing the client.
  Connector,
}

/// A handler that rewrites a matched request into a new target reference.
///
/// The target is itself a template, its variables resolve from the request
/// attributes filled in by routing (e.g. `{keywords}`). Substituted values
/// are form encoded, unresolved variables become the empty string, never
/// literal braces.
pub struct Redirector {
  target: Template,
  mode: RedirectMode,
  next: Option<Arc<dyn Handler>>,
}

impl Redirector {
  /// A 308 redirector with the given target template.
  pub fn permanent(target: impl AsRef<str>) -> TernResult<Redirector> {
    Ok(Redirector { target: Template::compile(target)?, mode: RedirectMode::ClientPermanent, next: None })
  }

  /// A 307 redirector with the given target template.
  pub fn temporary(target: impl AsRef<str>) -> TernResult<Redirector> {
    Ok(Redirector { target: Template::compile(target)?, mode: RedirectMode::ClientTemporary, next: None })
  }

  /// An internal redirector, the rewritten request goes straight to `next`.
  pub fn connector(
    target: impl AsRef<str>,
    next: Arc<dyn Handler>,
  ) -> TernResult<Redirector> {
    Ok(Redirector {
      target: Template::compile(target)?,
      mode: RedirectMode::Connector,
      next: Some(next),
    })
  }

  /// The redirection mode.
  pub fn mode(&self) -> RedirectMode {
    self.mode
  }

  /// Resolves the target reference for the given request.
  pub fn resolve_target(&self, request: &Request) -> String {
    let mut encoded: HashMap<String, String> = HashMap::new();
    for (name, value) in request.attributes() {
      encoded.insert(name.clone(), urlencoding::encode(value).to_string());
    }
    self.target.format(&encoded)
  }
}

impl Handler for Redirector {
  fn handle(&self, request: &mut Request) -> TernResult<Response> {
    let target = self.resolve_target(request);
    log::debug!("redirecting '{}' to '{}' ({:?})", request.path(), target, self.mode);

    match self.mode {
      RedirectMode::ClientPermanent => {
        Ok(Response::redirect(StatusCode::PermanentRedirect, target))
      }
      RedirectMode::ClientTemporary => {
        Ok(Response::redirect(StatusCode::TemporaryRedirect, target))
      }
      RedirectMode::Connector => {
        let next = self
          .next
          .as_ref()
          .ok_or_else(|| TernError::new_io(ErrorKind::NotFound, "connector redirect has no target handler"))?;

        match target.split_once('?') {
          Some((path, query)) => {
            request.set_path(path);
            for pair in query.split('&').filter(|p| !p.is_empty()) {
              match pair.split_once('=') {
                Some((name, value)) => {
                  let name = urlencoding::decode(name).map(|c| c.to_string()).unwrap_or_else(|_| name.to_string());
                  let value = urlencoding::decode(value).map(|c| c.to_string()).unwrap_or_else(|_| value.to_string());
                  request.add_query(name, value);
                }
                None => request.add_query(pair, ""),
              }
            }
          }
          None => request.set_path(target),
        }

        next.handle(request)
      }
    }
  }
}
