#![allow(dead_code)]

use async_trait::async_trait;
use docchat::configuration::{get_configuration, DatabaseSettings, Settings};
use docchat::connectors::{BlobStorage, EventPublisher, LocalBlobStorage, PublishError};
use docchat::models::{EventChannel, IngestionEvent};
use serde_json::Value;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::{Arc, Mutex};

/// Keeps every published event in memory instead of talking to a broker.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<IngestionEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<IngestionEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn ensure_channel(&self, _channel: EventChannel) -> Result<(), PublishError> {
        Ok(())
    }

    async fn publish(&self, event: IngestionEvent) -> Result<(), PublishError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub publisher: Arc<RecordingPublisher>,
    pub blob_store: LocalBlobStorage,
    pub client: reqwest::Client,
    _storage_dir: tempfile::TempDir,
}

/// Starts the server against a fresh database. `None` when PostgreSQL is not reachable.
pub async fn spawn_app() -> Option<TestApp> {
    let configuration = get_configuration().expect("Failed to get configuration");
    spawn_app_with_configuration(configuration).await
}

pub async fn spawn_app_with_configuration(mut configuration: Settings) -> Option<TestApp> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let storage_dir = tempfile::tempdir().expect("Failed to create storage dir");
    let blob_store = LocalBlobStorage::new(storage_dir.path(), &configuration.storage.bucket_name);
    let publisher = Arc::new(RecordingPublisher::default());

    let server = docchat::startup::serve(
        listener,
        connection_pool.clone(),
        configuration,
        publisher.clone(),
        Arc::new(blob_store.clone()) as Arc<dyn BlobStorage>,
    )
    .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        publisher,
        blob_store,
        client: reqwest::Client::new(),
        _storage_dir: storage_dir,
    })
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    Ok(connection_pool)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn signup(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/accounts"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
                "email": format!("{username}@example.com"),
            }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/accounts/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Signs up and returns a bearer token for the new account.
    pub async fn token_for(&self, username: &str, password: &str) -> String {
        assert_eq!(201, self.signup(username, password).await.status().as_u16());
        let body: Value = self
            .login(username, password)
            .await
            .json()
            .await
            .expect("Failed to parse login response");
        body["item"]["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }

    pub async fn create_chat(&self, token: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/chats"))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().expect("chat id")
    }

    pub async fn post_message(
        &self,
        token: &str,
        chat_id: i64,
        sender: &str,
        text: &str,
    ) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/chats/{chat_id}/messages")))
            .bearer_auth(token)
            .json(&serde_json::json!({"sender": sender, "text": text}))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn upload(&self, token: &str, name: &str, bytes: &'static [u8]) -> reqwest::Response {
        self.client
            .post(self.url("/documents"))
            .query(&[("name", name)])
            .bearer_auth(token)
            .body(bytes)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
