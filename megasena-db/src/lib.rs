pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod source;

pub use rusqlite;

pub use error::{Error, Result};
