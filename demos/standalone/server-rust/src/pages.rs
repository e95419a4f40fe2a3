/* demos/standalone/server-rust/src/pages.rs */

use quire_server::{ExecutionContext, PageError, Reply, ScriptTable};
use serde_json::json;

pub fn scripts() -> ScriptTable {
  ScriptTable::new().insert("home", home).insert("comments", comments)
}

fn home(page: &mut ExecutionContext) {
  page.authorize(|_| async { true });
  page.data(|_| async { Ok(json!({ "message": "hello from quire" })) });
  page.get("ping", |_| async { Ok(Reply::text("pong")) });
}

fn comments(page: &mut ExecutionContext) {
  page.before(|scope| async move {
    let user = scope.request().header_value("x-user").unwrap_or("guest").to_string();
    scope.set_local("user", json!(user));
    Ok(())
  });
  page.authorize(|scope| async move {
    scope.param_str("id").is_some_and(|id| id.parse::<u64>().is_ok())
  });
  page.data(|scope| async move {
    Ok(json!({
      "post": scope.param_str("id"),
      "viewer": scope.local("user"),
      "comments": [{ "author": "ada", "content": "first!" }],
    }))
  });
  page.get("count", |_| async { Ok(Reply::json(json!({ "count": 1 }))) });
  page.post("create", |scope| async move {
    let content = scope.param_str("content").unwrap_or_default().trim().to_string();
    if content.is_empty() {
      return Err(PageError::handler("EMPTY_COMMENT", 422, "comment content is required"));
    }
    let author = scope.local("user").unwrap_or_default();
    Ok(Reply::json(json!({ "author": author, "content": content })).with_status(201))
  });
}
