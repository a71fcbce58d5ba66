pub mod pool;

pub use pool::DataPool;
