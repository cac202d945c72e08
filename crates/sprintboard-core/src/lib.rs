pub mod config;
pub mod error;
pub mod pagination;
pub mod result;

pub use config::AppConfig;
pub use error::BoardError;
pub use pagination::{Page, PageError, PageRequest};
pub use result::BoardResult;
