pub mod claude;
pub mod deepseek;
pub mod flexible;
pub mod mock;
pub mod openai;

pub use claude::*;
pub use deepseek::*;
pub use flexible::*;
pub use mock::*;
pub use openai::*;
