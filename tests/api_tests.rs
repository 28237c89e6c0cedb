use amarea_site::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, create_router,
    auth,
    models::{ContactMessage, SiteContent},
    repository::{Repository, RepositoryState},
    storage::StorageState,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::util::ServiceExt;
use uuid::Uuid;

// --- Test Harness ---

struct TestApp {
    router: Router,
    repo: InMemoryRepository,
    token: String,
}

fn test_app() -> TestApp {
    let repo = InMemoryRepository::new();
    let config = AppConfig::default();
    let token = auth::issue_token(&config.jwt_secret, Uuid::new_v4(), "admin@amarea.com")
        .expect("token signing");

    let state = AppState {
        repo: Arc::new(repo.clone()) as RepositoryState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config,
    };

    TestApp {
        router: create_router(state),
        repo,
        token,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
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
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(self.token.as_str()), body).await
    }
}

fn service_body(number: &str, order: i32) -> Value {
    json!({
        "number": number,
        "title": format!("Service {}", number),
        "description": "Une description",
        "order": order
    })
}

// --- Guard ---

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = test_app();

    let (status, body) = app.send("GET", "/api/admin/services", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token manquant");

    let (status, body) = app
        .send("GET", "/api/admin/messages", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token invalide");
}

#[tokio::test]
async fn test_rejected_mutation_has_no_side_effect() {
    let app = test_app();

    let (status, _) = app
        .send("POST", "/api/admin/services", None, Some(service_body("01", 0)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("POST", "/api/admin/services", Some("forged.token.value"), Some(service_body("01", 0)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stored = app
        .repo
        .list_resources(amarea_site::ResourceKind::Services)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = test_app();
    let foreign = auth::issue_token(
        "another-secret-that-is-long-enough-to-pass",
        Uuid::new_v4(),
        "intruder@example.com",
    )
    .unwrap();

    let (status, body) = app
        .send("DELETE", "/api/admin/messages/00000000-0000-0000-0000-000000000000", Some(foreign.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token invalide");
}

// --- Resource CRUD ---

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let app = test_app();

    let (status, body) = app.admin("GET", "/api/admin/users", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Ressource non trouvée");

    let (status, _) = app
        .admin("POST", "/api/admin/site-content", Some(json!({ "key": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .admin("DELETE", &format!("/api/admin/passwords/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resource_lifecycle() {
    let app = test_app();

    let (status, created) = app
        .admin("POST", "/api/admin/stats", Some(json!({ "number": "150+", "label": "Mariages organisés" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["number"], "150+");
    assert_eq!(created["order"], 0);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .admin(
            "PUT",
            &format!("/api/admin/stats/{}", id),
            Some(json!({ "number": "200+", "label": "Mariages organisés", "order": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["number"], "200+");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, body) = app.admin("DELETE", &format!("/api/admin/stats/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, list) = app.admin("GET", "/api/admin/stats", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_orders_by_order_then_insertion() {
    let app = test_app();

    for (number, order) in [("A", 2), ("B", 1), ("C", 1), ("D", 0)] {
        let (status, _) = app
            .admin("POST", "/api/admin/services", Some(service_body(number, order)))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, list) = app.admin("GET", "/api/admin/services", None).await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["D", "B", "C", "A"]);

    // The public endpoint serves the same ordering without a token.
    let (status, public) = app.send("GET", "/api/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public, list);
}

#[tokio::test]
async fn test_create_rejects_body_of_wrong_shape() {
    let app = test_app();

    let (status, body) = app
        .admin("POST", "/api/admin/testimonials", Some(json!({ "author": "Sophie" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("text"));

    let (status, _) = app
        .admin("POST", "/api/admin/stats", Some(json!({ "number": "", "label": "Vide" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .admin(
            "POST",
            "/api/admin/gallery",
            Some(json!({ "src": "http://x/img.jpg", "category": "Buffet" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_ignores_echoed_metadata() {
    let app = test_app();

    let (_, created) = app
        .admin(
            "POST",
            "/api/admin/contact-info",
            Some(json!({ "type": "Phone", "title": "Téléphone", "details": "+33 1 23 45 67 89" })),
        )
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    // The admin UI sends back the whole record, id and timestamps included.
    let mut echoed = created.clone();
    echoed["details"] = json!("+33 6 00 00 00 00");
    echoed["id"] = json!(Uuid::new_v4());

    let (status, updated) = app
        .admin("PUT", &format!("/api/admin/contact-info/{}", id), Some(echoed))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["type"], "Phone");
    assert_eq!(updated["details"], "+33 6 00 00 00 00");
}

#[tokio::test]
async fn test_missing_id_is_server_error() {
    let app = test_app();
    let missing = Uuid::new_v4();

    let (status, body) = app
        .admin("DELETE", &format!("/api/admin/values/{}", missing), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur serveur");
    // Local environment exposes the cause.
    assert!(body["details"].as_str().unwrap().contains(&missing.to_string()));

    let (status, _) = app
        .admin(
            "PUT",
            &format!("/api/admin/values/{}", missing),
            Some(json!({ "title": "Passion", "description": "..." })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_resource_is_checked_before_id() {
    let app = test_app();

    let (status, body) = app.admin("DELETE", "/api/admin/unknown/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Ressource non trouvée");

    let (status, _) = app
        .admin("PUT", "/api/admin/unknown/not-a-uuid", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_fails_like_missing_id() {
    let app = test_app();

    let (status, body) = app.admin("DELETE", "/api/admin/values/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur serveur");
    assert!(body["details"].as_str().unwrap().contains("not-a-uuid"));

    let (status, body) = app
        .admin(
            "PUT",
            "/api/admin/values/not-a-uuid",
            Some(json!({ "title": "Passion", "description": "..." })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur serveur");

    let (status, body) = app.admin("PUT", "/api/admin/messages/42/read", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur serveur");
}

#[tokio::test]
async fn test_id_of_other_kind_is_not_updated() {
    let app = test_app();

    let (_, service) = app
        .admin("POST", "/api/admin/services", Some(service_body("01", 0)))
        .await;
    let id = service["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .admin("DELETE", &format!("/api/admin/stats/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, services) = app.send("GET", "/api/services", None, None).await;
    assert_eq!(services.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_public_lists_for_every_kind() {
    let app = test_app();

    for segment in ["services", "testimonials", "gallery", "stats", "values", "contact-info"] {
        let (status, body) = app.send("GET", &format!("/api/{}", segment), None, None).await;
        assert_eq!(status, StatusCode::OK, "GET /api/{}", segment);
        assert_eq!(body, json!([]));
    }
}

#[tokio::test]
async fn test_value_icon_and_gallery_category_defaults() {
    let app = test_app();

    let (_, value) = app
        .admin("POST", "/api/admin/values", Some(json!({ "title": "Passion", "description": "Toujours" })))
        .await;
    assert_eq!(value["icon"], "Heart");

    let (_, image) = app
        .admin("POST", "/api/admin/gallery", Some(json!({ "src": "http://cdn/x.jpg" })))
        .await;
    assert_eq!(image["category"], "Cérémonie");

    let (_, testimonial) = app
        .admin(
            "POST",
            "/api/admin/testimonials",
            Some(json!({ "text": "Magique", "author": "Emma & Thomas" })),
        )
        .await;
    assert_eq!(testimonial["featured"], false);
    assert_eq!(testimonial["role"], Value::Null);
}

// --- Page content ---

#[tokio::test]
async fn test_page_content_upsert_and_page_filter() {
    let app = test_app();

    let (status, saved) = app
        .admin(
            "PUT",
            "/api/page-content/about.story.title1",
            Some(json!({ "value": "Notre histoire" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["key"], "about.story.title1");
    assert_eq!(saved["type"], "text");

    // Second write to the same key replaces the value; no duplicate row.
    let (_, resaved) = app
        .admin(
            "PUT",
            "/api/page-content/about.story.title1",
            Some(json!({ "value": "Notre belle histoire" })),
        )
        .await;
    assert_eq!(resaved["id"], saved["id"]);

    app.admin("PUT", "/api/page-content/home.hero.title", Some(json!({ "value": "Bienvenue" })))
        .await;
    app.admin("PUT", "/api/page-content/aboutus.title", Some(json!({ "value": "Autre page" })))
        .await;

    let request = Request::builder()
        .uri("/api/page-content?page=about")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cache_control = response.headers()[header::CACHE_CONTROL].to_str().unwrap();
    assert!(cache_control.contains("no-store"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let about: Vec<SiteContent> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(about.len(), 1);
    assert_eq!(about[0].value, "Notre belle histoire");

    let (_, all) = app.send("GET", "/api/page-content", None, None).await;
    let keys: Vec<&str> = all.as_array().unwrap().iter().map(|c| c["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["about.story.title1", "aboutus.title", "home.hero.title"]);
}

#[tokio::test]
async fn test_page_content_body_key_wins_over_path() {
    let app = test_app();

    let (status, saved) = app
        .admin(
            "PUT",
            "/api/page-content/undefined",
            Some(json!({ "key": "home.hero.subtitle", "value": "Sur mesure", "type": "text" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["key"], "home.hero.subtitle");

    let (status, body) = app
        .admin("PUT", "/api/page-content/undefined", Some(json!({ "value": "perdu" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Clé invalide"));
}

#[tokio::test]
async fn test_page_content_without_value_is_bad_request() {
    let app = test_app();

    let (status, body) = app
        .admin("PUT", "/api/page-content/about.story.title1", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("value"));

    let (_, stored) = app.send("GET", "/api/page-content/about.story.title1", None, None).await;
    assert_eq!(stored, Value::Null);
}

#[tokio::test]
async fn test_page_content_write_requires_token() {
    let app = test_app();

    let (status, _) = app
        .send("PUT", "/api/page-content/home.hero.title", None, Some(json!({ "value": "x" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send("GET", "/api/page-content/home.hero.title", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

// --- Contact inbox ---

#[tokio::test]
async fn test_contact_message_flow() {
    let app = test_app();

    let (status, created) = app
        .send(
            "POST",
            "/api/contact",
            None,
            Some(json!({
                "name": "Claire",
                "email": "claire@example.com",
                "phone": "",
                "weddingDate": "2026-06-12",
                "guestCount": "120",
                "message": "Bonjour !"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    assert_eq!(created["message"]["read"], false);
    assert_eq!(created["message"]["phone"], Value::Null);
    assert_eq!(created["message"]["weddingDate"], "2026-06-12");
    let id = created["message"]["id"].as_str().unwrap().to_string();

    let (_, inbox) = app.admin("GET", "/api/admin/messages", None).await;
    let inbox: Vec<ContactMessage> = serde_json::from_value(inbox).unwrap();
    assert_eq!(inbox.len(), 1);

    for _ in 0..2 {
        let (status, read) = app
            .admin("PUT", &format!("/api/admin/messages/{}/read", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["read"], true);
    }

    let (status, _) = app
        .admin("DELETE", &format!("/api/admin/messages/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .admin("DELETE", &format!("/api/admin/messages/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_contact_message_requires_core_fields() {
    let app = test_app();

    let (status, body) = app
        .send(
            "POST",
            "/api/contact",
            None,
            Some(json!({ "name": "Claire", "email": "claire@example.com", "message": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nom, email et message requis");

    let (status, body) = app
        .send(
            "POST",
            "/api/contact",
            None,
            Some(json!({ "name": "Claire", "email": "claire@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("message"));
    assert!(app.repo.list_messages().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_inbox_is_newest_first() {
    let app = test_app();

    for name in ["Premier", "Second"] {
        app.send(
            "POST",
            "/api/contact",
            None,
            Some(json!({ "name": name, "email": "a@b.fr", "message": "Bonjour" })),
        )
        .await;
    }

    let (_, inbox) = app.admin("GET", "/api/admin/messages", None).await;
    let names: Vec<&str> = inbox.as_array().unwrap().iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Second", "Premier"]);
}

// --- Live server ---

#[tokio::test]
async fn test_health_check() {
    let state = AppState {
        repo: Arc::new(InMemoryRepository::new()) as RepositoryState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let response = reqwest::Client::new()
        .get(format!("{}/health", address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}
