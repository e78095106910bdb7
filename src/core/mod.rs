pub mod app;
pub mod config;
pub mod controller;
pub mod message;
pub mod provider;
pub mod reveal;
pub mod session;
