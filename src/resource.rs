//! The per resource dispatch state machine.
//!
//! A [`ServerResource`] is assembled once at registration time from an
//! explicit dispatch table and per resource flags, then handles any number
//! of concurrent requests. Per request state lives in the
//! [`DispatchContext`], which is owned by exactly one thread.

use crate::conditions::{ConditionOutcome, Tag};
use crate::conneg::{preferred_variant, Representation, RepresentationInfo, Variant};
use crate::http::{Method, MimeType, Request, Response, StatusCode};
use crate::tern_error::TernResult;
use std::collections::{BTreeSet, HashMap};

/// Per request, single threaded scratch state of one dispatch run.
#[derive(Debug)]
pub struct DispatchContext {
  request: Request,
  status: Option<StatusCode>,
  selected_variant: Option<Variant>,
}

impl DispatchContext {
  /// Creates the context for one request.
  pub fn new(request: Request) -> DispatchContext {
    DispatchContext { request, status: None, selected_variant: None }
  }

  /// The request being dispatched.
  pub fn request(&self) -> &Request {
    &self.request
  }

  /// Mutable access to the request.
  pub fn request_mut(&mut self) -> &mut Request {
    &mut self.request
  }

  /// The status resolved so far, if any.
  pub fn status(&self) -> Option<&StatusCode> {
    self.status.as_ref()
  }

  /// Resolves the response status. Handlers may call this to override the
  /// default 200/204 derivation.
  pub fn set_status(&mut self, status: StatusCode) {
    self.status = Some(status);
  }

  /// The variant selected by negotiation, if negotiation ran.
  pub fn selected_variant(&self) -> Option<&Variant> {
    self.selected_variant.as_ref()
  }
}

/// A resource method bound into the dispatch table.
pub trait ResourceMethod: Send + Sync {
  /// Produce the response entity, or None for an empty response.
  /// May resolve a status on the context.
  fn invoke(&self, ctx: &mut DispatchContext) -> TernResult<Option<Representation>>;
}

impl<F> ResourceMethod for F
where
  F: Fn(&mut DispatchContext) -> TernResult<Option<Representation>> + Send + Sync,
{
  fn invoke(&self, ctx: &mut DispatchContext) -> TernResult<Option<Representation>> {
    self(ctx)
  }
}

/// What a metadata probe learned about the current state of the resource.
pub enum ResourceInfo {
  /// Bare metadata, obtained without materializing a body.
  Metadata(RepresentationInfo),
  /// A full representation. Cheap resources may answer the probe this way,
  /// safe methods then short-circuit straight to it.
  Full(Representation),
}

impl ResourceInfo {
  fn metadata(&self) -> &RepresentationInfo {
    match self {
      ResourceInfo::Metadata(info) => info,
      ResourceInfo::Full(representation) => &representation.info,
    }
  }
}

/// Answers "does this resource exist and what are its validators" without
/// producing a body. Invoked by conditional handling before any method runs.
pub trait InfoProbe: Send + Sync {
  /// Returns the current metadata, or None if the resource has no current
  /// representation.
  fn probe(&self, ctx: &mut DispatchContext) -> TernResult<Option<ResourceInfo>>;
}

impl<F> InfoProbe for F
where
  F: Fn(&mut DispatchContext) -> TernResult<Option<ResourceInfo>> + Send + Sync,
{
  fn probe(&self, ctx: &mut DispatchContext) -> TernResult<Option<ResourceInfo>> {
    self(ctx)
  }
}

struct MethodEntry {
  plain: Option<Box<dyn ResourceMethod>>,
  /// Media keyed handlers in registration order. Registration order decides
  /// the order of the variants they imply for negotiation.
  negotiated: Vec<(MimeType, Box<dyn ResourceMethod>)>,
}

impl MethodEntry {
  fn new() -> MethodEntry {
    MethodEntry { plain: None, negotiated: Vec::new() }
  }
}

/// Builds a [`ServerResource`].
///
/// The dispatch table is explicit: every handler is registered under its
/// method, optionally keyed by the media type it produces. Media keyed
/// handlers imply negotiable variants on top of any declared ones.
pub struct ServerResourceBuilder {
  existing: bool,
  conditional: bool,
  negotiated: bool,
  entries: HashMap<Method, MethodEntry>,
  variants: HashMap<Method, Vec<Variant>>,
  common_variants: Vec<Variant>,
  info: Option<Box<dyn InfoProbe>>,
}

impl ServerResourceBuilder {
  fn new() -> ServerResourceBuilder {
    ServerResourceBuilder {
      existing: true,
      conditional: false,
      negotiated: false,
      entries: HashMap::new(),
      variants: HashMap::new(),
      common_variants: Vec::new(),
      info: None,
    }
  }

  /// Marks the resource as absent. Safe methods then answer 404 outright.
  pub fn existing(mut self, existing: bool) -> Self {
    self.existing = existing;
    self
  }

  /// Enables conditional request evaluation.
  pub fn conditional(mut self, conditional: bool) -> Self {
    self.conditional = conditional;
    self
  }

  /// Enables content negotiation.
  pub fn negotiated(mut self, negotiated: bool) -> Self {
    self.negotiated = negotiated;
    self
  }

  /// Binds a handler for a method.
  pub fn method(mut self, method: Method, handler: impl ResourceMethod + 'static) -> Self {
    self.entries.entry(method).or_insert_with(MethodEntry::new).plain = Some(Box::new(handler));
    self
  }

  /// Binds a handler for a method, keyed by the media type it produces.
  /// Implies a negotiable variant of that media type.
  pub fn method_for(
    mut self,
    method: Method,
    media_type: MimeType,
    handler: impl ResourceMethod + 'static,
  ) -> Self {
    self
      .entries
      .entry(method)
      .or_insert_with(MethodEntry::new)
      .negotiated
      .push((media_type, Box::new(handler)));
    self
  }

  /// Binds the GET handler.
  pub fn get(self, handler: impl ResourceMethod + 'static) -> Self {
    self.method(Method::Get, handler)
  }

  /// Binds a media keyed GET handler.
  pub fn get_for(self, media_type: MimeType, handler: impl ResourceMethod + 'static) -> Self {
    self.method_for(Method::Get, media_type, handler)
  }

  /// Binds the PUT handler.
  pub fn put(self, handler: impl ResourceMethod + 'static) -> Self {
    self.method(Method::Put, handler)
  }

  /// Binds the POST handler.
  pub fn post(self, handler: impl ResourceMethod + 'static) -> Self {
    self.method(Method::Post, handler)
  }

  /// Binds the DELETE handler.
  pub fn delete(self, handler: impl ResourceMethod + 'static) -> Self {
    self.method(Method::Delete, handler)
  }

  /// Declares a variant for a method. Declaration order is significant,
  /// negotiation breaks ties in favor of earlier variants.
  pub fn variant(mut self, method: Method, variant: Variant) -> Self {
    self.variants.entry(method).or_default().push(variant);
    self
  }

  /// Declares a variant available for every method.
  pub fn common_variant(mut self, variant: Variant) -> Self {
    self.common_variants.push(variant);
    self
  }

  /// Installs the metadata probe used by conditional handling.
  /// Without one, conditional handling probes via the GET handler.
  pub fn info(mut self, probe: impl InfoProbe + 'static) -> Self {
    self.info = Some(Box::new(probe));
    self
  }

  /// Freezes the dispatch table.
  pub fn build(self) -> ServerResource {
    ServerResource {
      existing: self.existing,
      conditional: self.conditional,
      negotiated: self.negotiated,
      entries: self.entries,
      variants: self.variants,
      common_variants: self.common_variants,
      info: self.info,
    }
  }
}

/// A handler instance with the full dispatch state machine:
/// `Init -> (ConditionalCheck?) -> (Negotiate?) -> Invoke -> Done`, with
/// early exits carrying a terminal status (404, 304, 412, 406, 405).
pub struct ServerResource {
  existing: bool,
  conditional: bool,
  negotiated: bool,
  entries: HashMap<Method, MethodEntry>,
  variants: HashMap<Method, Vec<Variant>>,
  common_variants: Vec<Variant>,
  info: Option<Box<dyn InfoProbe>>,
}

impl ServerResource {
  /// Starts building a resource.
  pub fn builder() -> ServerResourceBuilder {
    ServerResourceBuilder::new()
  }

  /// true if conditional request evaluation is enabled.
  pub fn is_conditional(&self) -> bool {
    self.conditional
  }

  /// true if content negotiation is enabled.
  pub fn is_negotiated(&self) -> bool {
    self.negotiated
  }

  /// true if the resource currently exists.
  pub fn is_existing(&self) -> bool {
    self.existing
  }

  /// Handles one request to completion. Never returns an error and never
  /// panics out of a handler: anything a resource method raises is caught
  /// here once and converted into a status bearing response.
  pub fn handle(&self, request: Request) -> Response {
    let mut ctx = DispatchContext::new(request);

    // A retrieval of something that is not there is a plain 404, no method
    // needs to run for that.
    if !self.existing && ctx.request().method().is_safe() {
      return Response::not_found();
    }

    let result = if self.conditional {
      self.do_conditional_handle(&mut ctx)
    } else if self.negotiated {
      self.do_negotiated_handle(&mut ctx)
    } else {
      self.do_handle(&mut ctx)
    };

    match result {
      Ok(entity) => {
        let status = match ctx.status {
          Some(status) => status,
          None if entity.is_some() => StatusCode::OK,
          None => StatusCode::NoContent,
        };

        log::debug!("dispatch of {} '{}' resolved to {}", ctx.request.method(), ctx.request.path(), status);

        let mut response = Response::new(status.clone());
        if let Some(entity) = entity {
          response = response.with_entity(entity);
        }

        if status == StatusCode::MethodNotAllowed {
          response.set_allowed_methods(self.allowed_methods());
        }

        response
      }
      Err(err) => {
        log::error!("resource method for '{}' failed: {}", ctx.request.path(), err);
        Response::new(StatusCode::InternalServerError)
      }
    }
  }

  /// The methods the dispatch table can serve.
  pub fn allowed_methods(&self) -> BTreeSet<Method> {
    self.entries.keys().cloned().collect()
  }

  /// Verifies the request preconditions and continues processing if they
  /// hold. The metadata needed for evaluation is obtained through the
  /// probe, without materializing a body unless the probe chose to.
  fn do_conditional_handle(&self, ctx: &mut DispatchContext) -> TernResult<Option<Representation>> {
    let conditions = ctx.request().conditions().clone();

    if !conditions.has_some() {
      return if self.negotiated { self.do_negotiated_handle(ctx) } else { self.do_handle(ctx) };
    }

    if !self.existing && conditions.match_tags().iter().any(Tag::is_any) {
      // A non existing resource cannot match any entity.
      ctx.set_status(StatusCode::PreconditionFailed);
      return Ok(None);
    }

    let probe_variant = if self.negotiated {
      let candidates = self.available_variants(&Method::Get);
      preferred_variant(&candidates, ctx.request().client_info()).cloned()
    } else {
      None
    };

    let info = self.do_probe(ctx, probe_variant)?;

    let Some(info) = info else {
      match ctx.status() {
        // Keep a special status a probe may have resolved, e.g. 401.
        Some(status) if !status.is_success() => {}
        _ => ctx.set_status(StatusCode::NotFound),
      }
      return Ok(None);
    };

    match conditions.status(ctx.request().method(), Some(info.metadata())) {
      ConditionOutcome::NotModified => {
        ctx.set_status(StatusCode::NotModified);
        Ok(None)
      }
      ConditionOutcome::PreconditionFailed => {
        ctx.set_status(StatusCode::PreconditionFailed);
        Ok(None)
      }
      ConditionOutcome::Proceed => {
        // If the probe already produced a full representation, return it
        // directly for retrieval methods instead of invoking twice.
        if let ResourceInfo::Full(representation) = info {
          if ctx.request().method().is_safe() {
            return Ok(Some(representation));
          }
        }

        if self.negotiated {
          self.do_negotiated_handle(ctx)
        } else {
          self.do_handle(ctx)
        }
      }
    }
  }

  /// Obtains the conditional metadata, via the configured probe or by
  /// falling back to the GET handler.
  fn do_probe(
    &self,
    ctx: &mut DispatchContext,
    variant: Option<Variant>,
  ) -> TernResult<Option<ResourceInfo>> {
    ctx.selected_variant = variant;

    if let Some(probe) = &self.info {
      return probe.probe(ctx);
    }

    let variant = ctx.selected_variant.clone();
    let entity = self.invoke(&Method::Get, variant.as_ref(), ctx)?;
    Ok(entity.map(ResourceInfo::Full))
  }

  /// Negotiates a variant and invokes the handler bound to it.
  fn do_negotiated_handle(&self, ctx: &mut DispatchContext) -> TernResult<Option<Representation>> {
    let method = ctx.request().method().clone();
    let candidates = self.available_variants(&method);

    if candidates.is_empty() {
      // Nothing declared for this method, negotiation has nothing to do.
      return self.do_handle(ctx);
    }

    match preferred_variant(&candidates, ctx.request().client_info()) {
      None => {
        ctx.set_status(StatusCode::NotAcceptable);
        Ok(Some(describe_variants(&candidates)))
      }
      Some(variant) => {
        let variant = variant.clone();
        ctx.selected_variant = Some(variant.clone());
        self.invoke(&method, Some(&variant), ctx)
      }
    }
  }

  /// Invokes the method keyed entry point directly, without negotiation.
  fn do_handle(&self, ctx: &mut DispatchContext) -> TernResult<Option<Representation>> {
    let method = ctx.request().method().clone();

    // PUT may create, everything else needs an existing resource.
    if !self.existing && method != Method::Put {
      ctx.set_status(StatusCode::NotFound);
      return Ok(None);
    }

    self.invoke(&method, None, ctx)
  }

  /// Dispatch table lookup and invocation. An unbound method resolves to
  /// 405; HEAD falls back to the GET entry.
  fn invoke(
    &self,
    method: &Method,
    variant: Option<&Variant>,
    ctx: &mut DispatchContext,
  ) -> TernResult<Option<Representation>> {
    let entry = match self.entries.get(method) {
      Some(entry) => Some(entry),
      None if method == &Method::Head => self.entries.get(&Method::Get),
      None => None,
    };

    let Some(entry) = entry else {
      ctx.set_status(StatusCode::MethodNotAllowed);
      return Ok(None);
    };

    if let Some(variant) = variant {
      if let Some((_, handler)) =
        entry.negotiated.iter().find(|(media, _)| media == variant.media_type())
      {
        return handler.invoke(ctx);
      }
    }

    match &entry.plain {
      Some(handler) => handler.invoke(ctx),
      None => {
        ctx.set_status(StatusCode::MethodNotAllowed);
        Ok(None)
      }
    }
  }

  /// The variants negotiable for a method: statically declared ones first,
  /// then common variants, then variants implied by media keyed handler
  /// registrations that added a media type not yet present.
  pub fn available_variants(&self, method: &Method) -> Vec<Variant> {
    let mut result: Vec<Variant> = Vec::new();

    if let Some(declared) = self.variants.get(method) {
      result.extend(declared.iter().cloned());
    }
    result.extend(self.common_variants.iter().cloned());

    let entry = match self.entries.get(method) {
      Some(entry) => Some(entry),
      None if method == &Method::Head => self.entries.get(&Method::Get),
      None => None,
    };

    if let Some(entry) = entry {
      for (media, _) in &entry.negotiated {
        if !result.iter().any(|variant| variant.media_type() == media) {
          result.push(Variant::new(media.clone()));
        }
      }
    }

    result
  }
}

/// The optional 406 body: one line per candidate variant.
fn describe_variants(candidates: &[Variant]) -> Representation {
  let mut listing = String::from("Available variants:\n");
  for candidate in candidates {
    listing.push_str(candidate.describe().as_str());
    listing.push('\n');
  }
  Representation::from_text(MimeType::TextPlain, listing)
}
