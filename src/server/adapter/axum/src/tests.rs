/* src/server/adapter/axum/src/tests.rs */

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use quire_server::{Environment, PageDefinition, PageRegistry, PageServer, Reply};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;

fn comments_page() -> PageDefinition {
  PageDefinition::new("blog/comments", "/comments/:id", |page| {
    page.authorize(|scope| async move { scope.request().header_value("x-user").is_some() });
    page.data(|scope| async move {
      Ok(json!({ "id": scope.param_str("id"), "page": scope.param_str("page") }))
    });
    page.get("show", |scope| async move {
      Ok(Reply::json(json!({ "show": scope.param_str("id") })))
    });
    page.post("create", |scope| async move {
      let content = scope.param_str("content").unwrap_or_default().to_string();
      Ok(Reply::json(json!({ "created": content, "id": scope.param_str("id") })).with_status(201))
    });
  })
}

fn home_page() -> PageDefinition {
  PageDefinition::new("home", "/", |page| {
    page.authorize(|_| async { true });
    page.data(|_| async { Ok(json!({ "welcome": true })) });
    page.get("ping", |_| async { Ok(Reply::text("pong")) });
  })
}

fn server(pages: Vec<PageDefinition>) -> PageServer {
  PageServer::new(Arc::new(PageRegistry::preloaded(pages, Environment::Test)))
}

fn router(pages: Vec<PageDefinition>) -> Router {
  server(pages).into_axum_router().unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
  let response = router.oneshot(request).await.unwrap();
  let status = response.status();
  let body = response.into_body().collect().await.unwrap().to_bytes();
  (status, body.to_vec())
}

async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
  let (status, body) = send(router, request).await;
  (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).header("x-user", "alice").body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header("x-user", "alice")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

#[tokio::test]
async fn view_as_json_with_path_and_query_params() {
  let request = Request::builder()
    .uri("/comments/7?page=2")
    .header("x-user", "alice")
    .header(header::ACCEPT, "application/json")
    .body(Body::empty())
    .unwrap();
  let (status, body) = send_json(router(vec![comments_page()]), request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "id": "7", "page": "2" }));
}

#[tokio::test]
async fn view_defaults_to_html() {
  let (status, body) = send(router(vec![comments_page()]), get("/comments/7")).await;
  assert_eq!(status, StatusCode::OK);
  let html = String::from_utf8(body).unwrap();
  assert!(html.contains(r#"data-page="blog/comments""#));
  assert!(html.contains(r#"{"id":"7","page":null}"#));
}

#[tokio::test]
async fn format_param_overrides_accept() {
  let request = Request::builder()
    .uri("/?format=json")
    .header(header::ACCEPT, "text/html")
    .body(Body::empty())
    .unwrap();
  let (status, body) = send_json(router(vec![home_page()]), request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "welcome": true }));
}

#[tokio::test]
async fn get_action_under_page_route() {
  let request = get("/comments/7/action/show");
  let (status, body) = send_json(router(vec![comments_page()]), request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "show": "7" }));
}

#[tokio::test]
async fn root_page_actions_live_at_slash_action() {
  let (status, body) = send(router(vec![home_page()]), get("/action/ping")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, b"pong");
}

#[tokio::test]
async fn post_action_reads_json_body() {
  let request = post("/comments/7/action/create", r#"{"content":"hello"}"#);
  let (status, body) = send_json(router(vec![comments_page()]), request).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body, json!({ "created": "hello", "id": "7" }));
}

#[tokio::test]
async fn post_action_rejects_invalid_json() {
  let request = post("/comments/7/action/create", "{not json");
  let (status, body) = send_json(router(vec![comments_page()]), request).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["ok"], false);
  assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn get_and_post_actions_are_separate() {
  let (status, body) =
    send_json(router(vec![comments_page()]), get("/comments/7/action/create")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["code"], "NOT_FOUND");
  assert_eq!(body["error"]["message"], "Action 'create' not found on page 'blog/comments'");
}

#[tokio::test]
async fn unauthorized_is_forbidden() {
  let request = Request::builder().uri("/comments/7").body(Body::empty()).unwrap();
  let (status, body) = send_json(router(vec![comments_page()]), request).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn missing_authorization_surfaces_as_not_found() {
  let page = PageDefinition::new("open", "/open", |page| {
    page.data(|_| async { Ok(json!("secret")) });
  });
  let (status, body) = send_json(router(vec![page]), get("/open")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn duplicate_routes_keep_first_page() {
  let shadow = PageDefinition::new("shadow", "/", |page| {
    page.authorize(|_| async { true });
    page.data(|_| async { Ok(json!("shadow")) });
  });
  let request = Request::builder().uri("/?format=json").body(Body::empty()).unwrap();
  let (status, body) = send_json(router(vec![home_page(), shadow]), request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "welcome": true }));
}

fn open_page(id: &str, route: &str) -> PageDefinition {
  let name = id.to_string();
  PageDefinition::new(id, route, move |page| {
    let name = name.clone();
    page.authorize(|_| async { true });
    page.data(move |scope| {
      let name = name.clone();
      async move { Ok(json!({ "page": name, "params": scope.params().clone() })) }
    });
    page.get("ping", |_| async { Ok(Reply::text("pong")) });
  })
}

async fn json_at(router: Router, uri: &str) -> (StatusCode, Value) {
  send_json(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn equivalent_templates_keep_first_page() {
  let pages = vec![open_page("by_id", "/items/:id"), open_page("by_slug", "/items/:slug")];
  let router = server(pages).into_axum_router().unwrap();
  let (status, body) = json_at(router, "/items/3?format=json").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["page"], "by_id");
  assert_eq!(body["params"]["id"], "3");
}

#[tokio::test]
async fn page_route_overlapping_action_route_is_skipped() {
  let pages = vec![open_page("x", "/x"), open_page("shadow", "/x/action/:foo")];
  let router = server(pages).into_axum_router().unwrap();
  let (status, body) = send(router, get("/x/action/ping")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, b"pong");
}

#[tokio::test]
async fn action_route_overlapping_page_route_is_not_mounted() {
  let pages = vec![open_page("shadow", "/x/action/:foo"), open_page("x", "/x")];
  let router = server(pages).into_axum_router().unwrap();
  let (status, body) = json_at(router.clone(), "/x?format=json").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["page"], "x");
  let (status, body) = json_at(router, "/x/action/ping?format=json").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["page"], "shadow");
  assert_eq!(body["params"]["foo"], "ping");
}

#[tokio::test]
async fn unknown_path_is_not_routed() {
  let (status, _) = send(router(vec![home_page()]), get("/nowhere")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn invalid_route_fails_router_build() {
  let page = PageDefinition::new("bad", "no-slash", |_| {});
  let err = server(vec![page]).into_axum_router().unwrap_err();
  assert_eq!(err.code(), "INTERNAL_ERROR");
}

#[test]
fn fallback_colliding_with_page_fails() {
  let page = PageDefinition::new("p", "/page", |_| {});
  assert!(server(vec![page]).fallback("/page").into_axum_router().is_err());
}

fn fallback_router() -> Router {
  server(vec![comments_page(), home_page()]).fallback("/page/").into_axum_router().unwrap()
}

#[tokio::test]
async fn fallback_view_selects_page_by_query() {
  let uri = "/page?page_id=blog/comments&format=json&id=9";
  let (status, body) = send_json(fallback_router(), get(uri)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "id": "9", "page": null }));
}

#[tokio::test]
async fn fallback_get_action() {
  let request = get("/page/action?page_id=home&action_name=ping");
  let (status, body) = send(fallback_router(), request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, b"pong");
}

#[tokio::test]
async fn fallback_post_action_reads_ids_from_body() {
  let payload = r#"{"page_id":"blog/comments","action_name":"create","content":"hi"}"#;
  let (status, body) = send_json(fallback_router(), post("/page/action", payload)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body, json!({ "created": "hi", "id": null }));
}

#[tokio::test]
async fn fallback_requires_page_id() {
  let (status, body) = send_json(fallback_router(), get("/page")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "MISSING_PARAMETER");
}

#[tokio::test]
async fn fallback_unknown_page_is_not_found() {
  let (status, body) = send_json(fallback_router(), get("/page?page_id=nope")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["message"], "Page 'nope' not found");
}
