use std::sync::Arc;
use tern::conneg::Representation;
use tern::route::Route;
use tern::router::{Router, RoutingMode};
use tern::template::{MatchingMode, Template};
use tern::{MimeType, Request, Response, TernResult};

fn text_response(body: impl AsRef<str>) -> TernResult<Response> {
  Ok(Response::ok(Representation::from_text(MimeType::TextPlain, body)))
}

fn body_of(response: &Response) -> String {
  response.entity().map(|entity| entity.body_as_text()).unwrap_or_default()
}

fn literal_a(_: &mut Request) -> TernResult<Response> {
  text_response("literal")
}

fn variable_a(request: &mut Request) -> TernResult<Response> {
  text_response(format!("variable {}", request.attribute("x").unwrap_or("?")))
}

#[test]
pub fn first_match_takes_attachment_order() {
  let router = Router::new(RoutingMode::FirstMatch);
  router.attach("/a", literal_a).unwrap();
  router.attach("/a/{x}", variable_a).unwrap();

  let mut request = Request::get("/a/5");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "variable 5");

  let mut request = Request::get("/a");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "literal");
}

fn prefix_short(_: &mut Request) -> TernResult<Response> {
  text_response("short")
}

fn prefix_long(_: &mut Request) -> TernResult<Response> {
  text_response("long")
}

#[test]
pub fn best_match_prefers_the_longer_literal_prefix() {
  let router = Router::new(RoutingMode::BestMatch);
  router.attach("/{x}/b", prefix_short).unwrap();
  router.attach("/a/{y}", prefix_long).unwrap();

  let mut request = Request::get("/a/b");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "long");
}

fn fewer_vars(_: &mut Request) -> TernResult<Response> {
  text_response("fewer")
}

fn more_vars(_: &mut Request) -> TernResult<Response> {
  text_response("more")
}

#[test]
pub fn best_match_prefers_fewer_variables() {
  let router = Router::new(RoutingMode::BestMatch);
  router.attach("/a/{x}/{y}", more_vars).unwrap();
  router.attach("/a/{x}/c", fewer_vars).unwrap();

  let mut request = Request::get("/a/b/c");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "fewer");
}

fn twin_one(_: &mut Request) -> TernResult<Response> {
  text_response("one")
}

fn twin_two(_: &mut Request) -> TernResult<Response> {
  text_response("two")
}

#[test]
pub fn best_match_ties_go_to_the_earlier_attachment() {
  let router = Router::new(RoutingMode::BestMatch);
  router.attach("/t/{x}", twin_one).unwrap();
  router.attach("/t/{x}", twin_two).unwrap();

  let mut request = Request::get("/t/v");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "one");
}

#[test]
pub fn unmatched_requests_fall_to_the_default_handler() {
  let router = Router::new(RoutingMode::FirstMatch);
  router.attach("/known", literal_a).unwrap();

  let mut request = Request::get("/unknown");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(response.status().code(), 404);
}

fn teapot(_: &mut Request) -> TernResult<Response> {
  Ok(Response::new(tern::StatusCode::Custom(418)))
}

#[test]
pub fn default_handler_is_replaceable() {
  let router = Router::new(RoutingMode::FirstMatch).with_default_handler(teapot);

  let mut request = Request::get("/nowhere");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(response.status().code(), 418);
}

#[test]
pub fn detached_routes_stop_matching() {
  let router = Router::new(RoutingMode::FirstMatch);
  let route = router.attach("/gone", literal_a).unwrap();

  let mut request = Request::get("/gone");
  assert_eq!(router.handle(&mut request).unwrap().status().code(), 200);

  router.detach(&route).unwrap();
  let mut request = Request::get("/gone");
  assert_eq!(router.handle(&mut request).unwrap().status().code(), 404);
}

fn echo_tag(request: &mut Request) -> TernResult<Response> {
  text_response(request.attribute("tag").unwrap_or("missing").to_string())
}

#[test]
pub fn query_extraction_turns_parameters_into_attributes() {
  let router = Router::new(RoutingMode::FirstMatch);
  let template = Template::compile("/items").unwrap();
  let route = Route::new(template, Arc::new(echo_tag)).extract_query("tag", "tag", false);
  router.attach_route(route).unwrap();

  let mut request = Request::get("/items").with_query("tag", "a").with_query("tag", "b");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "a,b");

  let router = Router::new(RoutingMode::FirstMatch);
  let template = Template::compile("/items").unwrap();
  let route = Route::new(template, Arc::new(echo_tag)).extract_query("tag", "tag", true);
  router.attach_route(route).unwrap();

  let mut request = Request::get("/items").with_query("tag", "a").with_query("tag", "b");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "a");
}

fn static_files(request: &mut Request) -> TernResult<Response> {
  text_response(format!("path {}", request.path()))
}

#[test]
pub fn prefix_routes_match_any_deeper_path() {
  let router = Router::new(RoutingMode::FirstMatch);
  let template = Template::compile("/static/").unwrap();
  let route = Route::new(template, Arc::new(static_files)).with_mode(MatchingMode::StartsWith);
  router.attach_route(route).unwrap();

  let mut request = Request::get("/static/css/site.css");
  let response = router.handle(&mut request).unwrap();
  assert_eq!(body_of(&response), "path /static/css/site.css");
}

#[test]
pub fn attaching_under_concurrent_matching_is_safe() {
  let router = Arc::new(Router::new(RoutingMode::FirstMatch));
  router.attach("/steady", literal_a).unwrap();

  let attacher = Arc::clone(&router);
  let handle = std::thread::spawn(move || {
    for _ in 0..50 {
      attacher.attach("/added/{x}", variable_a).unwrap();
    }
  });

  for _ in 0..200 {
    let mut request = Request::get("/steady");
    assert_eq!(router.handle(&mut request).unwrap().status().code(), 200);
  }
  handle.join().unwrap();

  let mut request = Request::get("/added/1");
  assert_eq!(body_of(&router.handle(&mut request).unwrap()), "variable 1");
}
