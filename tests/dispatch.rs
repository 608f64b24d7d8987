use std::io::ErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};
use tern::conditions::{Conditions, Tag};
use tern::conneg::{ClientInfo, Representation, RepresentationInfo, Variant};
use tern::resource::{DispatchContext, ResourceInfo, ServerResource};
use tern::{Method, MimeType, QValue, Request, StatusCode, TernError, TernResult};

fn plain_get(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  Ok(Some(Representation::from_text(MimeType::TextPlain, "the mail")))
}

fn silent_delete(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  Ok(None)
}

#[test]
pub fn get_with_a_body_resolves_to_200() {
  let resource = ServerResource::builder().get(plain_get).build();

  let response = resource.handle(Request::get("/mails/7"));
  assert_eq!(response.status(), &StatusCode::OK);
  assert_eq!(response.entity().unwrap().body_as_text(), "the mail");
}

#[test]
pub fn empty_success_resolves_to_204() {
  let resource = ServerResource::builder().delete(silent_delete).build();

  let response = resource.handle(Request::new(Method::Delete, "/mails/7"));
  assert_eq!(response.status(), &StatusCode::NoContent);
}

#[test]
pub fn head_falls_back_to_the_get_entry() {
  let resource = ServerResource::builder().get(plain_get).build();

  let response = resource.handle(Request::new(Method::Head, "/mails/7"));
  assert_eq!(response.status(), &StatusCode::OK);
}

#[test]
pub fn unbound_methods_answer_405_with_the_allowed_set() {
  let resource = ServerResource::builder().get(plain_get).delete(silent_delete).build();

  let response = resource.handle(Request::new(Method::Post, "/mails/7"));
  assert_eq!(response.status(), &StatusCode::MethodNotAllowed);
  assert!(response.allowed_methods().contains(&Method::Get));
  assert!(response.allowed_methods().contains(&Method::Delete));
  assert!(!response.allowed_methods().contains(&Method::Post));
}

static ABSENT_PUT_CALLS: AtomicU64 = AtomicU64::new(0);

fn creating_put(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  ABSENT_PUT_CALLS.fetch_add(1, Ordering::SeqCst);
  Ok(None)
}

#[test]
pub fn absent_resources_answer_404_except_for_put() {
  let resource = ServerResource::builder()
    .existing(false)
    .get(plain_get)
    .put(creating_put)
    .delete(silent_delete)
    .build();

  assert_eq!(resource.handle(Request::get("/gone")).status(), &StatusCode::NotFound);
  assert_eq!(
    resource.handle(Request::new(Method::Delete, "/gone")).status(),
    &StatusCode::NotFound
  );

  // PUT may create what is not there yet.
  let response = resource.handle(Request::new(Method::Put, "/gone"));
  assert_eq!(response.status(), &StatusCode::NoContent);
  assert_eq!(ABSENT_PUT_CALLS.load(Ordering::SeqCst), 1);
}

static CONDITIONAL_GET_CALLS: AtomicU64 = AtomicU64::new(0);

fn counted_get(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  CONDITIONAL_GET_CALLS.fetch_add(1, Ordering::SeqCst);
  Ok(Some(Representation::from_text(MimeType::TextPlain, "fresh")))
}

fn tagged_probe(_: &mut DispatchContext) -> TernResult<Option<ResourceInfo>> {
  let info =
    RepresentationInfo::new(Variant::new(MimeType::TextPlain)).with_tag(Tag::new("abc123"));
  Ok(Some(ResourceInfo::Metadata(info)))
}

#[test]
pub fn conditional_get_answers_304_without_running_the_handler() {
  let resource =
    ServerResource::builder().conditional(true).info(tagged_probe).get(counted_get).build();

  let conditions = Conditions::none().with_none_match(Tag::new("abc123"));
  let response = resource.handle(Request::get("/mails/7").with_conditions(conditions));

  assert_eq!(response.status(), &StatusCode::NotModified);
  assert!(response.entity().is_none());
  assert_eq!(CONDITIONAL_GET_CALLS.load(Ordering::SeqCst), 0);

  // A non matching validator lets the handler run normally.
  let conditions = Conditions::none().with_none_match(Tag::new("older"));
  let response = resource.handle(Request::get("/mails/7").with_conditions(conditions));
  assert_eq!(response.status(), &StatusCode::OK);
  assert_eq!(CONDITIONAL_GET_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
pub fn conditional_put_answers_412_on_a_stale_tag() {
  let resource =
    ServerResource::builder().conditional(true).info(tagged_probe).put(creating_put).build();

  let conditions = Conditions::none().with_match(Tag::new("stale"));
  let response = resource.handle(Request::new(Method::Put, "/mails/7").with_conditions(conditions));

  assert_eq!(response.status(), &StatusCode::PreconditionFailed);
}

#[test]
pub fn wildcard_if_match_on_an_absent_resource_fails_early() {
  let resource =
    ServerResource::builder().existing(false).conditional(true).put(creating_put).build();

  let conditions = Conditions::none().with_match(Tag::all());
  let response = resource.handle(Request::new(Method::Put, "/gone").with_conditions(conditions));

  assert_eq!(response.status(), &StatusCode::PreconditionFailed);
}

fn absent_probe(_: &mut DispatchContext) -> TernResult<Option<ResourceInfo>> {
  Ok(None)
}

#[test]
pub fn probe_finding_nothing_resolves_to_404() {
  let resource =
    ServerResource::builder().conditional(true).info(absent_probe).get(plain_get).build();

  let conditions = Conditions::none().with_none_match(Tag::new("any"));
  let response = resource.handle(Request::get("/mails/7").with_conditions(conditions));

  assert_eq!(response.status(), &StatusCode::NotFound);
}

static SHORT_CIRCUIT_GET_CALLS: AtomicU64 = AtomicU64::new(0);

fn never_get(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  SHORT_CIRCUIT_GET_CALLS.fetch_add(1, Ordering::SeqCst);
  Ok(Some(Representation::from_text(MimeType::TextPlain, "from handler")))
}

fn full_probe(_: &mut DispatchContext) -> TernResult<Option<ResourceInfo>> {
  let info =
    RepresentationInfo::new(Variant::new(MimeType::TextPlain)).with_tag(Tag::new("v1"));
  Ok(Some(ResourceInfo::Full(Representation::new(info, "from probe"))))
}

#[test]
pub fn full_probe_result_short_circuits_safe_methods() {
  let resource =
    ServerResource::builder().conditional(true).info(full_probe).get(never_get).build();

  let conditions = Conditions::none().with_none_match(Tag::new("miss"));
  let response = resource.handle(Request::get("/mails/7").with_conditions(conditions));

  assert_eq!(response.status(), &StatusCode::OK);
  assert_eq!(response.entity().unwrap().body_as_text(), "from probe");
  assert_eq!(SHORT_CIRCUIT_GET_CALLS.load(Ordering::SeqCst), 0);
}

fn json_get(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  Ok(Some(Representation::from_text(MimeType::ApplicationJson, "{\"mail\":7}")))
}

fn html_get(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  Ok(Some(Representation::from_text(MimeType::TextHtml, "<p>mail 7</p>")))
}

fn negotiated_resource() -> ServerResource {
  ServerResource::builder()
    .negotiated(true)
    .get_for(MimeType::ApplicationJson, json_get)
    .get_for(MimeType::TextHtml, html_get)
    .build()
}

#[test]
pub fn negotiation_routes_to_the_media_keyed_handler() {
  let resource = negotiated_resource();

  let client = ClientInfo::new().accept_media(MimeType::TextHtml, QValue::MAX);
  let response = resource.handle(Request::get("/mails/7").with_client_info(client));
  assert_eq!(response.entity().unwrap().body_as_text(), "<p>mail 7</p>");

  let client = ClientInfo::new().accept_media(MimeType::ApplicationJson, QValue::MAX);
  let response = resource.handle(Request::get("/mails/7").with_client_info(client));
  assert_eq!(response.entity().unwrap().body_as_text(), "{\"mail\":7}");
}

#[test]
pub fn unacceptable_requests_answer_406_listing_the_variants() {
  let resource = negotiated_resource();

  let client = ClientInfo::new().accept_media(tern::MimeGroup::Image, QValue::MAX);
  let response = resource.handle(Request::get("/mails/7").with_client_info(client));

  assert_eq!(response.status(), &StatusCode::NotAcceptable);
  let listing = response.entity().unwrap().body_as_text();
  assert!(listing.contains("application/json"));
  assert!(listing.contains("text/html"));
}

#[test]
pub fn negotiation_without_candidates_falls_through() {
  let resource = ServerResource::builder().negotiated(true).get(plain_get).build();

  let response = resource.handle(Request::get("/mails/7"));
  assert_eq!(response.status(), &StatusCode::OK);
  assert_eq!(response.entity().unwrap().body_as_text(), "the mail");
}

fn failing_get(_: &mut DispatchContext) -> TernResult<Option<Representation>> {
  Err(TernError::new_io(ErrorKind::Other, "backend unreachable"))
}

#[test]
pub fn a_failing_handler_becomes_a_500() {
  let resource = ServerResource::builder().get(failing_get).build();

  let response = resource.handle(Request::get("/mails/7"));
  assert_eq!(response.status(), &StatusCode::InternalServerError);
}

fn created_put(ctx: &mut DispatchContext) -> TernResult<Option<Representation>> {
  ctx.set_status(StatusCode::Created);
  Ok(None)
}

#[test]
pub fn handlers_may_resolve_their_own_status() {
  let resource = ServerResource::builder().put(created_put).build();

  let response = resource.handle(Request::new(Method::Put, "/mails"));
  assert_eq!(response.status(), &StatusCode::Created);
}
