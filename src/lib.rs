pub mod configuration;
pub mod domain;
pub mod error_log;
pub mod services;
pub mod startup;
