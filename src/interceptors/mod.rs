use async_trait::async_trait;
use std::fmt::Debug;

/// Receives every prompt/response pair the generator exchanges with the model.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, prompt: &str, response: &str) -> std::io::Result<()>;
}

pub mod file;
pub use file::FileInterceptor;
