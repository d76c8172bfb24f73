pub mod config;
pub mod controller;
pub mod dispatch;
pub mod message;
pub mod session;
