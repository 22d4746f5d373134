use docqa_service::config::{DocQaConfig, UploadConfig};
use docqa_service::services::DocumentStore;
use docqa_service::startup::Application;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use reqwest::multipart;
use service_core::config::{Config as CoreConfig, GoogleConfig, ModelConfig};
use service_core::genai::mock::MockTextProvider;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub provider: Arc<MockTextProvider>,
    pub documents: DocumentStore,
    pub client: reqwest::Client,
}

pub fn test_config() -> DocQaConfig {
    DocQaConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        google: GoogleConfig {
            api_key: "test-api-key".to_string(),
            api_base: "http://127.0.0.1:9/v1beta".to_string(),
        },
        models: ModelConfig {
            text_model: "gemini-2.0-flash".to_string(),
        },
        upload: UploadConfig::default(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), MockTextProvider::new(true)).await
    }

    pub async fn spawn_with(config: DocQaConfig, provider: MockTextProvider) -> Self {
        let provider = Arc::new(provider);

        let app = Application::build_with_provider(config, provider.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let documents = app.documents().clone();
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
            documents,
            client,
        }
    }

    /// Uploads `(file_name, bytes)` pairs under the `files` field.
    pub async fn upload(&self, files: Vec<(&str, Vec<u8>)>) -> reqwest::Response {
        let mut form = multipart::Form::new();
        for (file_name, bytes) in files {
            form = form.part(
                "files",
                multipart::Part::bytes(bytes)
                    .file_name(file_name.to_string())
                    .mime_str("application/pdf")
                    .unwrap(),
            );
        }

        self.client
            .post(format!("{}/upload_pdf", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn ask_question(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/ask_question", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Builds an in-memory PDF with one Helvetica text line per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize PDF");
    bytes
}
