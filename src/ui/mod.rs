//! Terminal UI layer for interactive chat sessions.
//!
//! - [`surface`]: the [`surface::UiSurface`] contract the chat core draws
//!   through, and the [`surface::ChatView`] model that implements it.
//! - [`renderer`] and [`theme`]: frame composition and styling.
//! - [`chat_loop`]: terminal setup, key handling and the draw loop.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns sessions and the submission pipeline.

pub mod chat_loop;
pub mod renderer;
pub mod surface;
pub mod theme;
