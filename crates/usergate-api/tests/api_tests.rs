use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use usergate_api::{AppState, create_router};
use usergate_auth::{
    AccessControl, BasicCredentials, CredentialSpec, CredentialStore, HashingParams,
    PasswordHasher, RouteRules,
};
use usergate_db::{Database, DbError, NewUser, User, UserRepository};

const ADMIN: (&str, &str) = ("admin", "admin123");
const INTERN: (&str, &str) = ("intern", "password123");

fn hasher() -> PasswordHasher {
    PasswordHasher::new(HashingParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

fn app_with(users: Arc<dyn UserRepository>) -> Router {
    let store = CredentialStore::from_specs(&CredentialSpec::defaults(), hasher()).unwrap();
    let access = Arc::new(AccessControl::new(store, RouteRules::default()));
    let state = AppState::new(users, Arc::new(hasher()), access);
    create_router(state, None)
}

async fn spawn_app() -> (Router, Database) {
    let db = Database::in_memory().await.unwrap();
    (app_with(Arc::new(db.clone())), db)
}

fn get(path: &str, auth: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some((user, pass)) = auth {
        builder = builder.header(
            header::AUTHORIZATION,
            BasicCredentials::new(user, pass).header_value(),
        );
    }
    builder.body(Body::empty()).unwrap()
}

fn post_user(auth: Option<(&str, &str)>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some((user, pass)) = auth {
        builder = builder.header(
            header::AUTHORIZATION,
            BasicCredentials::new(user, pass).header_value(),
        );
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_public_endpoint_ignores_credentials() {
    let (app, _db) = spawn_app().await;

    for auth in [None, Some(ADMIN), Some(INTERN), Some(("admin", "wrong"))] {
        let response = app.clone().oneshot(get("/public", auth)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "This is a public endpoint");
    }
}

#[tokio::test]
async fn test_unauthenticated_requests_are_rejected() {
    let (app, _db) = spawn_app().await;

    for path in ["/user", "/admin"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
    }

    let response = app
        .clone()
        .oneshot(post_user(None, serde_json::json!({"username": "bob", "password": "abcd", "role": "USER"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/admin", Some(("admin", "not-the-password"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_user_role_access() {
    let (app, db) = spawn_app().await;

    let response = app.clone().oneshot(get("/user", Some(INTERN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "This is a user endpoint");

    let response = app.clone().oneshot(get("/admin", Some(INTERN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["status"], 403);
    assert_eq!(body["error"], "Access Denied");
    assert_eq!(body["path"], "/admin");

    let response = app
        .clone()
        .oneshot(post_user(
            Some(INTERN),
            serde_json::json!({"username": "sneaky", "password": "abcd", "role": "ADMIN"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["path"], "/users");
    assert_eq!(db.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_admin_role_access() {
    let (app, _db) = spawn_app().await;

    let response = app.clone().oneshot(get("/admin", Some(ADMIN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "This is an admin endpoint");

    let response = app.clone().oneshot(get("/user", Some(ADMIN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_creates_user() {
    let (app, db) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_user(
            Some(ADMIN),
            serde_json::json!({"username": "testuser", "password": "password123", "role": "USER"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["username"], "testuser");
    assert_eq!(body["role"], "USER");

    let password = body["password"].as_str().unwrap();
    assert_ne!(password, "password123");
    assert!(hasher().verify("password123", password));

    let stored = db.find_by_username("testuser").await.unwrap().unwrap();
    assert_eq!(stored.id, body["id"].as_i64().unwrap());
    assert_eq!(stored.password, password);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let (app, db) = spawn_app().await;

    let first = app
        .clone()
        .oneshot(post_user(
            Some(ADMIN),
            serde_json::json!({"username": "dup", "password": "first-pass", "role": "USER"}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;

    let second = app
        .clone()
        .oneshot(post_user(
            Some(ADMIN),
            serde_json::json!({"username": "dup", "password": "second-pass", "role": "ADMIN"}),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["status"], 409);
    assert_eq!(body["error"], "Username 'dup' is already taken.");

    let stored = db.find_by_username("dup").await.unwrap().unwrap();
    assert_eq!(stored.id, first["id"].as_i64().unwrap());
    assert_eq!(stored.role, "USER");
    assert!(hasher().verify("first-pass", &stored.password));
    assert_eq!(db.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_validation_failures() {
    let (app, db) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_user(
            Some(ADMIN),
            serde_json::json!({"username": "ab", "password": "abcd", "role": "USER"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(
        body["errors"],
        serde_json::json!(["Username must be between 3 and 20 characters"])
    );

    let response = app
        .clone()
        .oneshot(post_user(
            Some(ADMIN),
            serde_json::json!({"username": "valid", "password": "abc", "role": "USER"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"],
        serde_json::json!(["Password must be at least 4 characters long"])
    );

    let response = app
        .clone()
        .oneshot(post_user(Some(ADMIN), serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(response).await["errors"].as_array().unwrap().clone();
    assert!(errors.contains(&serde_json::json!("Role cannot be blank")));

    assert_eq!(db.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _db) = spawn_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::AUTHORIZATION,
            BasicCredentials::new(ADMIN.0, ADMIN.1).header_value(),
        )
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unlisted_paths_need_any_identity() {
    let (app, _db) = spawn_app().await;

    let response = app.clone().oneshot(get("/nowhere", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(get("/nowhere", Some(INTERN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _db) = spawn_app().await;

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");

    let response = app.oneshot(get("/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let (app, db) = spawn_app().await;
    db.close().await;

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["database"], "unavailable");

    // Liveness does not depend on storage
    let response = app.oneshot(get("/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Repository whose username lookup never finds anything, as happens when two
/// creates for the same name race past the pre-check.
struct RacingRepository {
    inner: Database,
}

#[async_trait]
impl UserRepository for RacingRepository {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, DbError> {
        Ok(None)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<User>, DbError> {
        self.inner.find_all().await
    }

    async fn save(&self, user: NewUser) -> Result<User, DbError> {
        self.inner.save(user).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, DbError> {
        self.inner.delete_by_id(id).await
    }

    async fn count(&self) -> Result<i64, DbError> {
        self.inner.count().await
    }
}

#[tokio::test]
async fn test_storage_constraint_conflict_is_translated() {
    let db = Database::in_memory().await.unwrap();
    let app = app_with(Arc::new(RacingRepository { inner: db.clone() }));

    let payload = serde_json::json!({"username": "racer", "password": "abcd", "role": "USER"});

    let first = app
        .clone()
        .oneshot(post_user(Some(ADMIN), payload.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.clone().oneshot(post_user(Some(ADMIN), payload)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["status"], 409);
    assert_eq!(body["error"], "This username is already taken.");

    assert_eq!(db.count().await.unwrap(), 1);
}
