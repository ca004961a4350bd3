pub mod config;
pub mod error;
pub mod item;
pub mod mastery;
pub mod scheduler;
pub mod service;
pub mod session;
