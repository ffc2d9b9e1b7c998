//! # Mindmap Context
//!
//! Bounded-length outline text of a mindmap, for prompting an agent.
//!
//! Two rendering modes:
//!
//! - **Global**: the whole tree as indented bullets from the root
//! - **Node**: path to the selected node, its siblings, its subtree and
//!   its notes
//!
//! [`render_context`] retries with smaller [`RenderParams`] until the text
//! fits the character budget, or reports [`RenderOutcome::TooLarge`] with
//! hints for narrowing the request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindmap_context::render_context;
//! use mindmap_editor::ScopeRequest;
//!
//! let outcome = render_context(&state, &ScopeRequest::node(selected_id), Some(8_000))?;
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! ```

mod budget;
mod outline;
mod params;
mod render;

pub use budget::{
    render_context, render_context_with, BudgetLimits, ContextMeta, RenderOutcome, CONTEXT_TOO_LARGE, DEFAULT_BUDGET,
    HINTS, MAX_ATTEMPTS, MAX_BUDGET,
};
pub use params::{RenderParams, SizeTier};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Node scope requires a selected node")]
    MissingSelection,

    #[error("Selected node not found: {0}")]
    SelectedNotFound(String),
}
