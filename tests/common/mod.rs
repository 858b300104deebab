#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use storefront_auth::auth::{hash_password, TokenCodec};
use storefront_auth::configuration::{JwtSettings, PasswordSettings, DEFAULT_PUBLIC_PATHS};
use storefront_auth::error::{AppError, DatabaseError};
use storefront_auth::middleware::PublicRoutes;
use storefront_auth::startup::run;
use storefront_auth::users::{NewUser, UserRecord, UserStore};

pub const TEST_COST: u32 = 4;

/// User store kept in memory so the suite runs without Postgres
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<UserRecord>>,
}

impl InMemoryUsers {
    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn by_email(&self, email: &str) -> Option<UserRecord> {
        self.users.lock().unwrap().iter().find(|u| u.email == email).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        Ok(self.get(id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.by_email(email))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )
            .into());
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            avatar: None,
            online: false,
            created_at: now,
            updated_at: now,
        };
        users.push(record.clone());
        Ok(record)
    }
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        access_secret: "integration-access-secret-32-characters".to_string(),
        refresh_secret: Some("integration-refresh-secret-32-characters".to_string()),
        access_token_expiry: 900,
        refresh_token_expiry: 604_800,
    }
}

pub struct TestApp {
    pub address: String,
    pub users: Arc<InMemoryUsers>,
    /// Same secrets as the server, for decoding and forging in tests
    pub codec: TokenCodec,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn seed_user(&self, name: &str, email: &str, password: &str) -> UserRecord {
        let password_hash = hash_password(password, TEST_COST).expect("Failed to hash password");
        self.users
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .expect("Failed to seed user")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_with_token(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}{}", self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let users = Arc::new(InMemoryUsers::default());
    let store: Arc<dyn UserStore> = users.clone();

    let server = run(
        listener,
        store,
        TokenCodec::new(&jwt_settings()).expect("Failed to build codec"),
        PasswordSettings { cost: TEST_COST },
        PublicRoutes::new(DEFAULT_PUBLIC_PATHS),
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        users,
        codec: TokenCodec::new(&jwt_settings()).expect("Failed to build codec"),
        client: reqwest::Client::new(),
    }
}
