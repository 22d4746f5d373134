use chat_service::config::ChatConfig;
use chat_service::startup::Application;
use service_core::config::{Config as CoreConfig, GoogleConfig, ModelConfig};
use service_core::genai::mock::MockTextProvider;
use service_core::genai::ChatSession;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub provider: Arc<MockTextProvider>,
    pub session: Arc<ChatSession>,
}

pub fn test_config() -> ChatConfig {
    ChatConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        google: GoogleConfig {
            api_key: "test-api-key".to_string(),
            api_base: "http://127.0.0.1:9/v1beta".to_string(),
        },
        models: ModelConfig {
            text_model: "gemini-2.0-flash".to_string(),
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MockTextProvider::new(true)).await
    }

    pub async fn spawn_with(provider: MockTextProvider) -> Self {
        let provider = Arc::new(provider);

        let app = Application::build_with_provider(test_config(), provider.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let session = app.session();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            provider,
            session,
        }
    }

    pub async fn ask(&self, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/ask", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
