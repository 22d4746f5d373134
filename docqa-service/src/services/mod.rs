pub mod assistant;
pub mod pdf;
pub mod store;

pub use assistant::DocumentAssistant;
pub use store::DocumentStore;
