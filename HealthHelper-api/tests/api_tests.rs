use std::sync::{Arc, Once};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use health_helper_api::api::{create_app, Adapters, AppState};
use health_helper_api::config::AppConfig;
use health_helper_domain::adapters::{CatalogPlacesAdapter, ProfileStoreAdapter};
use health_helper_domain::auth::TokenSettings;
use health_helper_domain::health::HealthServiceTrait;
use health_helper_domain::testing::{
    MockAuthAdapter, MockHealthService, MockLocation, MockProfileStore, RecordingMessaging,
};

static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init();
    });
}

struct TestApp {
    router: Router,
    messaging: Arc<RecordingMessaging>,
}

struct Setup {
    store: Arc<dyn ProfileStoreAdapter>,
    location: MockLocation,
    messaging: RecordingMessaging,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            store: Arc::new(MockProfileStore::new()),
            location: MockLocation::at(37.4219983, -122.084),
            messaging: RecordingMessaging::new(),
        }
    }
}

impl TestApp {
    fn new() -> Self {
        Self::with(Setup::default())
    }

    fn with(setup: Setup) -> Self {
        initialize();
        let messaging = Arc::new(setup.messaging);
        let adapters = Adapters {
            auth: Arc::new(MockAuthAdapter::new()),
            profiles: setup.store,
            location: Arc::new(setup.location),
            messaging: messaging.clone(),
            places: Arc::new(CatalogPlacesAdapter::new()),
        };
        let config = AppConfig {
            profile_create_timeout: Duration::from_millis(200),
            ..AppConfig::default()
        };
        let tokens = TokenSettings::new("integration-test-secret", "health-helper-tests", 1);
        let health: Arc<dyn HealthServiceTrait + Send + Sync> = Arc::new(MockHealthService::new());

        Self {
            router: create_app(AppState::new(adapters, tokens, &config), health),
            messaging,
        }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Register a fresh account and return its bearer token
    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({"email": email, "password": "hunter2", "confirm_password": "hunter2"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn add_contact(&self, token: &str, name: &str, phone: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/contacts",
                Some(token),
                Some(json!({"name": name, "phone_number": phone, "relationship": "Friend"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add contact failed: {}", body);
        body
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_and_session() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"email": "user@example.com", "password": "hunter2", "confirm_password": "hunter2"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["profile_status"], "created");
    assert_eq!(body["profile"]["last_bmi"], 0.0);
    assert_eq!(body["profile"]["emergency_contacts"][0]["phone_number"], "911");

    let token = body["access_token"].as_str().unwrap();
    let (status, session) = app.send(Method::GET, "/auth/session", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["email"], "user@example.com");
    assert_eq!(session["auth_state"]["status"], "success");
}

#[tokio::test]
async fn test_register_validation_reports_each_field() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"email": "not-an-email", "password": "abc", "confirm_password": "abd"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"]["email"], "Please enter a valid email address");
    assert_eq!(body["details"]["password"], "Password must be at least 6 characters");
    assert_eq!(body["details"]["confirm_password"], "Passwords do not match");
}

#[tokio::test]
async fn test_duplicate_registration_and_bad_login() {
    let app = TestApp::new();
    app.register("user@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"email": "user@example.com", "password": "hunter2", "confirm_password": "hunter2"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "An account already exists with this email.");

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "user@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "user@example.com", "password": "hunter2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile_status"], "loaded");
}

#[tokio::test]
async fn test_registration_survives_profile_store_failure() {
    let app = TestApp::with(Setup {
        store: Arc::new(MockProfileStore::failing()),
        ..Setup::default()
    });

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"email": "user@example.com", "password": "hunter2", "confirm_password": "hunter2"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["profile_status"], "failed");
    assert!(body["profile"].is_null());
    assert!(body["notice"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/v1/contacts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.send(Method::GET, "/api/v1/contacts", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, _) = app.send(Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Session has ended");
}

#[tokio::test]
async fn test_bmi_evaluate_and_commit() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/bmi/evaluate",
            Some(&token),
            Some(json!({"height_cm": 170.0, "weight_kg": 70.0})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_value"], "24.2");
    assert_eq!(body["category"], "normal");
    assert_eq!(body["saved"], false);

    let (_, profile) = app.send(Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(profile["profile"]["last_bmi"], 0.0);
    assert!(profile.get("bmi_category").is_none());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/bmi",
            Some(&token),
            Some(json!({"height_cm": 180.0, "weight_kg": 110.0})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "obese");
    assert_eq!(body["saved"], true);

    let (status, profile) = app.send(Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["profile"]["height"], 180.0);
    assert_eq!(profile["profile"]["weight"], 110.0);
    assert_eq!(profile["bmi_category"], "obese");

    let (_, session) = app.send(Method::GET, "/auth/session", Some(&token), None).await;
    assert_eq!(session["profile"]["weight"], 110.0);
}

#[tokio::test]
async fn test_bmi_out_of_range() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/bmi",
            Some(&token),
            Some(json!({"height_cm": 50.0, "weight_kg": 70.0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["height_cm"], "Height should be between 100 and 250 cm");
}

#[tokio::test]
async fn test_session_tracks_last_flow() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, rejected) = app
        .send(
            Method::POST,
            "/api/v1/bmi",
            Some(&token),
            Some(json!({"height_cm": 175.0, "weight_kg": 500.0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, session) = app.send(Method::GET, "/auth/session", Some(&token), None).await;
    assert_eq!(session["auth_state"]["status"], "error");
    assert_eq!(session["auth_state"]["message"], rejected["message"]);
    assert_eq!(session["profile"]["weight"], 0.0);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/bmi",
            Some(&token),
            Some(json!({"height_cm": 175.0, "weight_kg": 70.0})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, session) = app.send(Method::GET, "/auth/session", Some(&token), None).await;
    assert_eq!(session["auth_state"]["status"], "success");
    assert_eq!(session["profile"]["weight"], 70.0);
}

#[tokio::test]
async fn test_contact_crud() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let created = app.add_contact(&token, "  Alice  ", "+1 (555) 123-4567").await;
    assert_eq!(created["name"], "Alice");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/v1/contacts/{}", id),
            Some(&token),
            Some(json!({"name": "Alice Smith", "phone_number": "555-0100", "relationship": "Sister"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["relationship"], "Sister");

    let (_, list) = app.send(Method::GET, "/api/v1/contacts", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(list[0]["name"], "Emergency Services");
    assert_eq!(list[1]["name"], "Alice Smith");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/contacts/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/contacts/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.send(Method::GET, "/api/v1/contacts", Some(&token), None).await;
    assert_eq!(list, json!([{"id": "1", "name": "Emergency Services", "phone_number": "911", "relationship": ""}]));
}

#[tokio::test]
async fn test_invalid_contact() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/contacts",
            Some(&token),
            Some(json!({"name": "", "phone_number": "abc123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["name"], "Name cannot be empty");
    assert_eq!(body["details"]["phone_number"], "Please enter a valid phone number");
}

#[tokio::test]
async fn test_sos_requires_contacts() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, _) = app.send(Method::DELETE, "/api/v1/contacts/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.send(Method::POST, "/api/v1/sos", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please add at least one emergency contact");
    assert!(app.messaging.sent().is_empty());
}

#[tokio::test]
async fn test_first_sos_reaches_emergency_services() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, body) = app.send(Method::POST, "/api/v1/sos", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handed_off"], 1);

    let sent = app.messaging.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "911");
}

#[tokio::test]
async fn test_sos_partial_failure() {
    let app = TestApp::with(Setup {
        messaging: RecordingMessaging::failing_for(&["555-0199"]),
        ..Setup::default()
    });
    let token = app.register("user@example.com").await;
    app.add_contact(&token, "Alice", "555-0100").await;
    app.add_contact(&token, "Bob", "555-0199").await;

    let (status, body) = app.send(Method::POST, "/api/v1/sos", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handed_off"], 2);
    assert_eq!(body["notices"], json!(["Unable to send message to Bob"]));
    assert_eq!(body["location_included"], true);

    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("This is an emergency. I need help at my current location."));
    assert!(text.ends_with("My location: https://maps.google.com/?q=37.4219983,-122.084"));

    let sent = app.messaging.sent();
    let numbers: Vec<&str> = sent.iter().map(|(number, _)| number.as_str()).collect();
    assert_eq!(numbers, ["911", "555-0100"]);
}

#[tokio::test]
async fn test_sos_without_location() {
    let app = TestApp::with(Setup {
        location: MockLocation::unavailable(),
        ..Setup::default()
    });
    let token = app.register("user@example.com").await;
    app.add_contact(&token, "Alice", "555-0100").await;

    let (status, body) = app
        .send(Method::POST, "/api/v1/sos", Some(&token), Some(json!({"message": "Help, I fell"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location_included"], false);
    assert_eq!(body["text"], "Help, I fell");

    let (status, body) = app
        .send(Method::POST, "/api/v1/sos", Some(&token), Some(json!({"message": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["message"], "Message cannot be empty");
}

#[tokio::test]
async fn test_places() {
    let app = TestApp::new();
    let token = app.register("user@example.com").await;

    let (status, body) = app.send(Method::GET, "/api/v1/places", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["place_type"], "hospital");
    assert_eq!(body["places"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .send(Method::GET, "/api/v1/places?type=pharmacy", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Pharmacies");
    for place in body["places"].as_array().unwrap() {
        let lat = place["position"]["latitude"].as_f64().unwrap();
        assert!((lat - 37.4219983).abs() <= 0.005 + 1e-9);
    }

    let (status, _) = app
        .send(Method::GET, "/api/v1/places?type=bakery", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_places_without_location() {
    let app = TestApp::with(Setup {
        location: MockLocation::unavailable(),
        ..Setup::default()
    });
    let token = app.register("user@example.com").await;

    let (status, body) = app.send(Method::GET, "/api/v1/places", Some(&token), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Could not get your current location.");
}
