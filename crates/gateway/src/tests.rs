//! Router-level tests over the in-memory store

use super::*;
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use serde_json::{json, Value};
use smartlegal_common::{
    auth::USER_ID_HEADER,
    db::models::UserProfile,
    llm::{ChatClient, SimulatedChatClient},
};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

fn app(client: Option<Arc<dyn ChatClient>>) -> TestApp {
    let config = Arc::new(AppConfig::default());
    let store = Arc::new(MemoryStore::with_clauses(sample_clauses()));
    let llm = LlmGateway::new(client, "test-model");
    let services = LegalServices::new(
        store.clone() as Arc<dyn ContractStore>,
        Arc::new(llm),
        config.billing.clone(),
    );

    TestApp {
        router: create_router(AppState { config, services }),
        store,
    }
}

fn simulated_app() -> TestApp {
    app(Some(Arc::new(SimulatedChatClient::new()) as Arc<dyn ChatClient>))
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn upload(&self, user: Uuid, title: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/contracts",
                Some(user),
                Some(json!({"title": title, "original_text": "The tenant pays rent monthly."})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn set_balance(&self, user: Uuid, tokens: i32) {
        self.store
            .put_profile(UserProfile {
                user_id: user,
                subscription_level: "Basic".to_string(),
                tokens_remaining: tokens,
            })
            .await;
    }
}

#[tokio::test]
async fn test_health_needs_no_identity() {
    let app = app(None);
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["store"]["backend"], "memory");
    assert_eq!(body["checks"]["ai_service"]["status"], "missing_key");
}

#[tokio::test]
async fn test_api_requires_user_header() {
    let app = app(None);
    let (status, body) = app.call(Method::GET, "/api/contracts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_upload_is_scoped_to_owner() {
    let app = app(None);
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let created = app.upload(owner, "Lease").await;
    assert_eq!(created["status"], "UPL");
    assert_eq!(created["status_display"], "Uploaded");
    assert!(created["analysis_results"].is_null());

    let (_, listed) = app.call(Method::GET, "/api/contracts", Some(owner), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, listed) = app.call(Method::GET, "/api/contracts", Some(stranger), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let uri = format!("/api/contracts/{}", created["id"].as_str().unwrap());
    let (status, body) = app.call(Method::GET, &uri, Some(stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "CONTRACT_NOT_FOUND");
}

#[tokio::test]
async fn test_upload_provisions_default_profile() {
    let app = app(None);
    let owner = Uuid::new_v4();

    let (status, _) = app.call(Method::GET, "/api/profile", Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.upload(owner, "Lease").await;

    let (status, profile) = app.call(Method::GET, "/api/profile", Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile, json!({"subscription_level": "Basic", "tokens_remaining": 1000}));
}

#[tokio::test]
async fn test_invalid_upload_is_rejected() {
    let app = app(None);
    let owner = Uuid::new_v4();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/contracts",
            Some(owner),
            Some(json!({"title": "", "original_text": "text"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .call(Method::POST, "/api/contracts", Some(owner), Some(json!({"title": "x"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_archive_and_delete() {
    let app = app(None);
    let owner = Uuid::new_v4();
    let created = app.upload(owner, "Lease").await;
    let uri = format!("/api/contracts/{}", created["id"].as_str().unwrap());

    let (status, updated) = app
        .call(Method::PATCH, &uri, Some(owner), Some(json!({"title": "Lease v2"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Lease v2");
    assert_eq!(updated["original_text"], created["original_text"]);

    let (status, archived) = app
        .call(Method::POST, &format!("{}/archive", uri), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived["status"], "ARC");

    let (status, _) = app.call(Method::DELETE, &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.call(Method::GET, &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analysis_charges_and_records_usage() {
    let app = simulated_app();
    let owner = Uuid::new_v4();
    let created = app.upload(owner, "Lease").await;
    let uri = format!("/api/contracts/{}/run-analysis", created["id"].as_str().unwrap());

    let (status, analyzed) = app.call(Method::POST, &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analyzed["status"], "ANL");
    assert!(analyzed["analysis_results"]["summary"].is_string());
    let rating = analyzed["analysis_results"]["rating"].as_i64().unwrap();
    assert!((1..=5).contains(&rating));

    let (_, history) = app.call(Method::GET, "/api/service-requests", Some(owner), None).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["service_type"], "ANL");
    assert_eq!(history[0]["service_type_display"], "Contract analysis");
    assert_eq!(history[0]["is_paid"], true);
    assert_eq!(history[0]["related_contract_id"], created["id"]);

    let tokens_used = history[0]["tokens_used"].as_i64().unwrap();
    assert!(tokens_used > 0);

    let (_, profile) = app.call(Method::GET, "/api/profile", Some(owner), None).await;
    assert_eq!(profile["tokens_remaining"].as_i64().unwrap(), 1000 - tokens_used);
}

#[tokio::test]
async fn test_analysis_without_key_changes_nothing() {
    let app = app(None);
    let owner = Uuid::new_v4();
    let created = app.upload(owner, "Lease").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .call(Method::POST, &format!("/api/contracts/{}/run-analysis", id), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "AI_SERVICE_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("AI service key is missing."));

    let (_, contract) = app
        .call(Method::GET, &format!("/api/contracts/{}", id), Some(owner), None)
        .await;
    assert_eq!(contract["status"], "UPL");

    let (_, profile) = app.call(Method::GET, "/api/profile", Some(owner), None).await;
    assert_eq!(profile["tokens_remaining"], 1000);

    let (_, history) = app.call(Method::GET, "/api/service-requests", Some(owner), None).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_low_balance_is_payment_required() {
    let app = simulated_app();
    let owner = Uuid::new_v4();
    let created = app.upload(owner, "Lease").await;
    app.set_balance(owner, 499).await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/contracts/{}/run-analysis", created["id"].as_str().unwrap()),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_TOKENS");

    let (_, profile) = app.call(Method::GET, "/api/profile", Some(owner), None).await;
    assert_eq!(profile["tokens_remaining"], 499);
}

#[tokio::test]
async fn test_generation_drafts_from_clauses() {
    let app = simulated_app();
    let owner = Uuid::new_v4();
    app.set_balance(owner, 5000).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/contracts/generate",
            Some(owner),
            Some(json!({"contract_type": "REN", "details": {"keywords": "deposit"}})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["clause_count"], 1);
    assert_eq!(body["contract"]["status"], "GEN");
    assert_eq!(body["contract"]["title"], "Rental contract");
    assert!(body["contract"]["original_text"]
        .as_str()
        .unwrap()
        .contains("Security Deposit"));

    let (_, history) = app.call(Method::GET, "/api/service-requests", Some(owner), None).await;
    assert_eq!(history[0]["service_type"], "GEN");
    assert_eq!(history[0]["related_contract_id"], body["contract"]["id"]);
}

#[tokio::test]
async fn test_generation_without_matching_clause() {
    let app = simulated_app();
    let owner = Uuid::new_v4();
    app.set_balance(owner, 5000).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/contracts/generate",
            Some(owner),
            Some(json!({"contract_type": "NDA", "details": {"keywords": "non-compete"}})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "NO_VERIFIED_CLAUSES");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/contracts/generate",
            Some(owner),
            Some(json!({"contract_type": "XYZ"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clause_retrieval() {
    let app = app(None);
    let owner = Uuid::new_v4();

    let (status, body) = app
        .call(Method::GET, "/api/clauses?clause_type=emp", Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clause_type"], "EMP");
    assert_eq!(body["count"], 2);
    assert!(body["text"].as_str().unwrap().starts_with("## "));

    let (status, body) = app
        .call(Method::GET, "/api/clauses?clause_type=REN&keywords=spaceship", Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["text"], "");

    let (status, _) = app.call(Method::GET, "/api/clauses", Some(owner), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clause_keywords_are_not_trimmed() {
    let app = app(None);
    let owner = Uuid::new_v4();

    let (status, body) = app
        .call(Method::GET, "/api/clauses?clause_type=REN&keywords=%20%20%20", Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keywords"], "   ");
    assert_eq!(body["count"], 0);

    let (_, body) = app
        .call(Method::GET, "/api/clauses?clause_type=REN&keywords=", Some(owner), None)
        .await;
    assert_eq!(body["count"], 2);
    assert!(body["keywords"].is_null());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = app(None);
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;

    let response = tokio_test::assert_ok!(response);
    assert!(response.headers().contains_key("x-request-id"));
}

#[test]
fn test_cors_accepts_configured_origins() {
    // Invalid origins are dropped rather than failing startup
    let _ = cors_layer(&["https://app.example.com".to_string(), "bad\norigin".to_string()]);
    let _ = cors_layer(&[]);
}
