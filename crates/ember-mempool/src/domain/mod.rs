pub mod entities;
pub mod errors;
pub mod pool;
pub mod value_objects;

pub use entities::{PoolConfig, PoolTransaction, TxBox};
pub use errors::MempoolError;
pub use pool::TxPool;
pub use value_objects::{PoolStatus, PricedBox};
