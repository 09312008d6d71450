pub mod error;
pub mod models;
pub mod price_calculator;
pub mod repository;
pub mod service;

pub use error::*;
pub use models::*;
pub use price_calculator::*;
pub use repository::*;
pub use service::*;
