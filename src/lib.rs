//! Chatterbox is a terminal chat client for remote text and image generation
//! endpoints, with any number of independent chat sessions.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session store, the active-session controller and the
//!   dispatch pipeline that turns a submitted line into messages.
//! - [`api`] is the boundary with the generation services.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`commands`] implements the slash commands handled by the front end.
//! - [`utils`] holds URL helpers and logging setup.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
