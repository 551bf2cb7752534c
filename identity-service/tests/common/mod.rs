use std::sync::Arc;

use auth::Authenticator;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::SigningKey;
use identity_service::domain::user::service::SessionService;
use identity_service::inbound::http::middleware::AuthenticationGate;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use serde_json::json;

pub const TEST_SECRET: &[u8; 40] = b"test-secret-key-for-jwt-signing-32-bytes";

pub fn jwt_handler(secret: &[u8], expiration: chrono::Duration) -> JwtHandler {
    let key = SigningKey::from_bytes(secret.to_vec()).expect("Failed to build signing key");
    JwtHandler::new(&key, expiration).expect("Failed to build jwt handler")
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());

        // Cheap argon2 parameters keep the suite fast
        let authenticator = Arc::new(
            Authenticator::new(jwt_handler(TEST_SECRET, chrono::Duration::hours(24)))
                .with_password_hasher(
                    PasswordHasher::with_params(8, 1, 1).expect("Failed to build hasher"),
                ),
        );

        let session_service = Arc::new(SessionService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));
        let gate = AuthenticationGate::new(authenticator, Arc::clone(&repository));

        let router = create_router(session_service, gate);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            repository,
            api_client: reqwest::Client::new(),
            jwt_handler: jwt_handler(TEST_SECRET, chrono::Duration::hours(24)),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register `username` with password "pass_word!" and return the issued token
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post("/auth/register")
            .json(&json!({
                "username": username,
                "password": "pass_word!",
                "firstname": "Nicola",
                "lastname": "Tesla",
                "country": "HR"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }
}
