pub mod client;
pub mod error;
pub mod model;

pub use client::EventBookingsApi;
pub use error::{ConflictKind, EventBookingsError};
pub use model::*;
