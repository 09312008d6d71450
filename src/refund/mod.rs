pub mod error;
pub mod policy;
pub mod schedule;

pub use error::*;
pub use policy::*;
pub use schedule::*;
