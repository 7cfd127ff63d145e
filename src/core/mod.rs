pub mod app;
pub mod config;
pub mod controller;
pub mod message;
pub mod profile;
pub mod session;
