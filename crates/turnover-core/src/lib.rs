pub mod actor;
pub mod cache;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod io;
pub mod paths;
pub mod remote;
pub mod status;
pub mod sync;
pub mod types;
pub mod validate;

pub use error::{Result, TurnoverError};
