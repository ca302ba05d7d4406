//! End-to-end behaviour of the request pipeline, driven through the
//! in-memory test client.

use http::StatusCode;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vertex::middleware::stages::BasicAuth;
use vertex::prelude::*;
use vertex_test::TestClient;

/// `Id` in the path, `Name` required with only an upper length bound.
#[derive(Debug, Default)]
struct Rename {
    id: String,
    name: String,
}

impl Bindable for Rename {
    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            "Id" => Some(FieldRef::from(&self.id)),
            "Name" => Some(FieldRef::from(&self.name)),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Value) -> Result<(), BindError> {
        match key {
            "Id" => self.id = value.into_string()?,
            "Name" => self.name = value.into_string()?,
            _ => return Err(BindError::UnknownField(key.to_string())),
        }
        Ok(())
    }
}

impl DescribeInput for Rename {
    fn input_shape() -> InputShape {
        InputShape::fields([
            FieldDecl::string("Id").tags(r#"schema:"id" required:"true" in:"path""#),
            FieldDecl::string("Name").tags(r#"schema:"name" maxlen:"100" required:"true""#),
        ])
    }
}

impl RequestHandler for Rename {
    fn handle<'a>(
        &'a self,
        _w: &'a mut ResponseWriter,
        _req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move { Reply::json(&json!({ "id": self.id, "name": self.name })) })
    }
}

/// Same as [`Rename`] but the name must not be empty.
#[derive(Debug, Default)]
struct StrictRename(Rename);

impl Bindable for StrictRename {
    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        self.0.field(key)
    }

    fn set_field(&mut self, key: &str, value: Value) -> Result<(), BindError> {
        self.0.set_field(key, value)
    }
}

impl DescribeInput for StrictRename {
    fn input_shape() -> InputShape {
        InputShape::fields([
            FieldDecl::string("Id").tags(r#"schema:"id" required:"true" in:"path""#),
            FieldDecl::string("Name")
                .tags(r#"schema:"name" maxlen:"100" minlen:"1" required:"true""#),
        ])
    }
}

impl RequestHandler for StrictRename {
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        self.0.handle(w, req)
    }
}

/// A page query with an optional default and a required field that also
/// declares a default.
#[derive(Debug, Default)]
struct ListItems {
    limit: Option<i64>,
    owner: String,
}

impl Bindable for ListItems {
    fn field(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            "Limit" => self.limit.map(FieldRef::from),
            "Owner" => Some(FieldRef::from(&self.owner)),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Value) -> Result<(), BindError> {
        match key {
            "Limit" => self.limit = Some(value.into_int()?),
            "Owner" => self.owner = value.into_string()?,
            _ => return Err(BindError::UnknownField(key.to_string())),
        }
        Ok(())
    }
}

impl DescribeInput for ListItems {
    fn input_shape() -> InputShape {
        InputShape::fields([
            FieldDecl::int("Limit").tags(r#"schema:"limit" default:"10" min:"1" max:"100""#),
            FieldDecl::string("Owner").tags(r#"schema:"owner" required:"true" default:"root""#),
        ])
    }
}

impl RequestHandler for ListItems {
    fn handle<'a>(
        &'a self,
        _w: &'a mut ResponseWriter,
        _req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move { Reply::json(&json!({ "limit": self.limit, "owner": self.owner })) })
    }
}

fn append_token(name: &'static str, token: &'static str) -> BoxedMiddleware {
    Arc::new(middleware_fn(name, move |w, req, next| {
        let mut tokens = req.remove_attribute::<String>("tokens").unwrap_or_default();
        if !tokens.is_empty() {
            tokens.push(',');
        }
        tokens.push_str(token);
        req.set_attribute("tokens", tokens);
        next.run(w, req)
    }))
}

fn client(calls: Arc<AtomicUsize>) -> TestClient {
    let tokens = handler_fn(move |_w, req| {
        calls.fetch_add(1, Ordering::SeqCst);
        let tokens = req.attribute::<String>("tokens").cloned().unwrap_or_default();
        Box::pin(async move { Ok(Reply::text(tokens)) })
    });

    let stop = Arc::new(middleware_fn("stop", |_w, _req, _next| {
        Box::pin(async { Err(ApiError::unauthorized("stopped")) })
    }));

    let hijack = Arc::new(middleware_fn("hijack", |w, _req, _next| {
        w.write_status(StatusCode::ACCEPTED);
        w.write(b"taken over");
        Box::pin(async { Err(ApiError::Hijacked) })
    }));

    let registry = Registry::builder()
        .api(
            Api::new("things", "1.0")
                .with_middleware(append_token("mw1", "mw1"))
                .route(Route::handler::<Rename>("/rename/{id}", MethodFlag::POST))
                .route(Route::handler::<StrictRename>("/strict/{id}", MethodFlag::POST))
                .route(Route::handler::<ListItems>("/list", MethodFlag::GET))
                .route(
                    Route::new("/tokens", MethodFlag::GET, tokens.clone())
                        .with_middleware(append_token("mw2", "mw2"))
                        .with_middleware(append_token("mw3", "mw3")),
                )
                .route(
                    Route::new("/stopped", MethodFlag::GET, tokens)
                        .with_middleware(stop),
                )
                .route(
                    Route::handler::<VoidHandler>("/hijacked", MethodFlag::GET)
                        .with_middleware(hijack),
                )
                .route(
                    Route::handler::<VoidHandler>("/private", MethodFlag::GET)
                        .with_middleware(Arc::new(BasicAuth::new("user", "pass", "things"))),
                ),
        )
        .freeze()
        .unwrap();

    TestClient::new(registry)
}

#[tokio::test]
async fn test_empty_name_is_present() {
    let client = client(Arc::default());

    client
        .post("/things/1.0/rename/42")
        .form(&[("name", "")])
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_field("id", &json!("42"))
        .assert_json_field("name", &json!(""));
}

#[tokio::test]
async fn test_absent_name_is_missing() {
    let client = client(Arc::default());

    client
        .post("/things/1.0/rename/42")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_text("missing required param 'name'\n");
}

#[tokio::test]
async fn test_empty_name_fails_min_length() {
    let client = client(Arc::default());

    client
        .post("/things/1.0/strict/42")
        .form(&[("name", "")])
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_text("name is too short\n");
}

#[tokio::test]
async fn test_name_length_counts_characters() {
    let client = client(Arc::default());
    let name = "é".repeat(100);

    client
        .post("/things/1.0/rename/42")
        .form(&[("name", name.as_str())])
        .send()
        .await
        .assert_status(StatusCode::OK);

    let too_long = "é".repeat(101);
    let response = client
        .post("/things/1.0/rename/42")
        .form(&[("name", too_long.as_str())])
        .send()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().unwrap().contains("name"));
}

#[tokio::test]
async fn test_optional_default_applied() {
    let client = client(Arc::default());

    client
        .get("/things/1.0/list")
        .query("owner", "alice")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_field("limit", &json!(10))
        .assert_json_field("owner", &json!("alice"));
}

#[tokio::test]
async fn test_required_ignores_default() {
    let client = client(Arc::default());

    client
        .get("/things/1.0/list")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_text("missing required param 'owner'\n");
}

#[tokio::test]
async fn test_bounds_are_inclusive() {
    let client = client(Arc::default());

    for (limit, status) in [
        ("1", StatusCode::OK),
        ("100", StatusCode::OK),
        ("0", StatusCode::BAD_REQUEST),
        ("101", StatusCode::BAD_REQUEST),
    ] {
        client
            .get("/things/1.0/list")
            .query("owner", "alice")
            .query("limit", limit)
            .send()
            .await
            .assert_status(status);
    }
}

#[tokio::test]
async fn test_middleware_runs_in_declaration_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = client(Arc::clone(&calls));

    client
        .get("/things/1.0/tokens")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_text("mw1,mw2,mw3");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_short_circuit_skips_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = client(Arc::clone(&calls));

    client
        .get("/things/1.0/stopped")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hijacked_response_is_not_rendered() {
    let client = client(Arc::default());

    client
        .get("/things/1.0/hijacked")
        .send()
        .await
        .assert_status(StatusCode::ACCEPTED)
        .assert_text("taken over");
}

#[tokio::test]
async fn test_insecure_remote_is_refused() {
    let client = client(Arc::default());
    let remote = "10.0.0.7:5000".parse().unwrap();

    let response = client.get("/things/1.0/tokens").peer(remote).send().await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert!(response.text().unwrap().contains("Insecure Access Forbidden"));

    client
        .get("/things/1.0/tokens")
        .peer(remote)
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_basic_auth_route() {
    let client = client(Arc::default());

    let denied = client.get("/things/1.0/private").send().await;
    denied
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header("www-authenticate", "Basic realm=\"things\"");

    client
        .get("/things/1.0/private")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_documents_every_route() {
    let client = client(Arc::default());

    let response = client.get("/things/1.0/swagger").send().await;
    response.assert_status(StatusCode::OK);

    let doc: serde_json::Value = response.json().unwrap();
    assert_eq!(doc["basePath"], "/things/1.0");
    assert_eq!(doc["paths"]["/rename/{id}"]["post"]["parameters"][1]["maxLength"], 100);
    assert_eq!(doc["paths"]["/list"]["get"]["parameters"][0]["default"], "10");
    assert!(doc["paths"]["/tokens"]["get"].is_object());
}
