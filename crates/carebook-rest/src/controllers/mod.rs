//! REST API controllers.

pub mod address_controller;
pub mod health_controller;
pub mod patient_controller;

pub use health_controller::*;
