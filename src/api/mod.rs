pub mod client;

pub use client::{ApiError, MediaClient, Result};
