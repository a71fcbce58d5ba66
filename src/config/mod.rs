pub mod traits;
pub mod search;
pub mod mutation;
pub mod data_pool;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use search::SearchConfig;
pub use mutation::MutationConfig;
pub use data_pool::DataPoolConfig;
