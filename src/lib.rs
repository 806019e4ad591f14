pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod interceptors;
pub mod json_utils;
pub mod model;
pub mod prompt;
pub mod scorer;
pub mod server;
pub mod service;
pub mod store;

// Convenient re-exports
pub use error::{GenerationError, QuizError, StoreError};
pub use generator::{GeneratedQuiz, GeneratorConfig, QuizGenerator};
pub use model::{ClientQuestion, Question, QuizRecord, ScoreReport};
pub use service::{QuizService, ServiceConfig};
pub use store::{DocumentStore, QuizStore};
