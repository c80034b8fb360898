pub mod config;
pub mod controllers;
pub mod errors;
pub mod services;
pub mod store;
pub mod types;
pub mod validation;
