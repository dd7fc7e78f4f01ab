pub mod aggregator;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod period;
pub mod repository;
pub mod rollup;
pub mod service;

pub use aggregator::*;
pub use error::*;
pub use handlers::*;
pub use metrics::*;
pub use models::*;
pub use period::*;
pub use repository::*;
pub use rollup::*;
pub use service::*;
