pub mod config;
pub mod confluence;
pub mod error;
pub mod http;
pub mod logging;
pub mod metadata;
pub mod pagination;
pub mod slack;
pub mod storage;
pub mod tools;

pub use error::{Result, ToolsError};
