pub mod documents;
pub mod health;

pub use documents::{ask_question, upload_pdf};
pub use health::health_check;
pub use service_core::chat::ask;
