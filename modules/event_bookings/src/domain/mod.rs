pub mod availability;
pub mod error;
pub mod events;
pub mod gate;
pub mod guests;
pub mod identity;
pub mod lifecycle;
pub mod planning;
pub mod ports;
pub mod repo;
pub mod service;
pub mod stats;
pub mod validation;
