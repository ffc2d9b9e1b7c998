//! # Budget Search
//!
//! Greedy fit of rendered context into a character budget:
//!
//! ```text
//! tier → initial params → render → fits? ──yes──→ Ok
//!                           ↑         │no
//!                           └─shrink──┤
//!                                     └─no progress / attempts spent → TooLarge
//! ```

use crate::params::{RenderParams, SizeTier};
use crate::render::{render_global, render_node, Rendered};
use crate::ContextError;
use mindmap_editor::{ChildIndex, Scope, ScopeRequest, TreeState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BUDGET: usize = 12_000;
pub const MAX_BUDGET: usize = 60_000;
pub const MAX_ATTEMPTS: usize = 6;

pub const CONTEXT_TOO_LARGE: &str = "context_too_large";
pub const HINTS: [&str; 3] = ["switch to node scope", "reduce depth", "work on one branch"];

/// Default and ceiling for the character budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetLimits {
    pub default_budget: usize,
    pub max_budget: usize,
}

impl Default for BudgetLimits {
    fn default() -> Self {
        Self {
            default_budget: DEFAULT_BUDGET,
            max_budget: MAX_BUDGET,
        }
    }
}

impl BudgetLimits {
    /// Requested budget, or the default, never above the ceiling
    pub fn effective(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_budget).min(self.max_budget)
    }
}

/// Measurements of the last rendering attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMeta {
    pub chars: usize,
    pub lines: usize,
    pub truncated: bool,
    pub budget: usize,
    pub attempts: usize,
    pub params: RenderParams,
    pub tier: SizeTier,
    pub scope: Scope,
}

/// Context payload, serialized as `{context, meta}` or
/// `{error: "context_too_large", hints, meta}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RenderOutcome {
    Ok {
        context: String,
        meta: ContextMeta,
    },
    TooLarge {
        error: &'static str,
        hints: Vec<&'static str>,
        meta: ContextMeta,
    },
}

impl RenderOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, RenderOutcome::Ok { .. })
    }

    pub fn context(&self) -> Option<&str> {
        match self {
            RenderOutcome::Ok { context, .. } => Some(context),
            RenderOutcome::TooLarge { .. } => None,
        }
    }

    pub fn meta(&self) -> &ContextMeta {
        match self {
            RenderOutcome::Ok { meta, .. } | RenderOutcome::TooLarge { meta, .. } => meta,
        }
    }
}

/// Render with the default [`BudgetLimits`]
pub fn render_context(
    state: &TreeState,
    request: &ScopeRequest,
    budget: Option<usize>,
) -> Result<RenderOutcome, ContextError> {
    render_context_with(state, request, budget, &BudgetLimits::default())
}

/// Render `state` for `request`, shrinking until the text fits
#[instrument(skip(state, request, limits), fields(scope = request.scope.as_str(), nodes = state.len()))]
pub fn render_context_with(
    state: &TreeState,
    request: &ScopeRequest,
    budget: Option<usize>,
    limits: &BudgetLimits,
) -> Result<RenderOutcome, ContextError> {
    let budget = limits.effective(budget);
    let index = ChildIndex::build(state);

    let (selected, node_count) = match request.scope {
        Scope::Global => (None, state.len()),
        Scope::Node => {
            let id = request
                .selected_node_id
                .as_deref()
                .ok_or(ContextError::MissingSelection)?;
            let node = state
                .node(id)
                .ok_or_else(|| ContextError::SelectedNotFound(id.to_string()))?;
            let id = node.id.as_str();
            (Some(id), index.descendants_of(id).len())
        }
    };

    let tier = SizeTier::for_count(node_count);
    let mut params = RenderParams::initial(request.scope, tier);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let rendered = match selected {
            None => render_global(state, &index, &params),
            Some(id) => render_node(state, &index, id, &params),
        };
        let meta = measure(&rendered, budget, attempts, params, tier, request.scope);
        debug!(attempt = attempts, chars = meta.chars, lines = meta.lines, budget, "Rendered context");

        if meta.chars <= budget {
            info!(chars = meta.chars, attempts, truncated = meta.truncated, "Context fits budget");
            return Ok(RenderOutcome::Ok {
                context: rendered.text,
                meta,
            });
        }

        let next = params.shrink(attempts);
        if attempts >= MAX_ATTEMPTS || next == params {
            warn!(chars = meta.chars, budget, attempts, "Context too large");
            return Ok(RenderOutcome::TooLarge {
                error: CONTEXT_TOO_LARGE,
                hints: HINTS.to_vec(),
                meta,
            });
        }
        params = next;
    }
}

fn measure(
    rendered: &Rendered,
    budget: usize,
    attempts: usize,
    params: RenderParams,
    tier: SizeTier,
    scope: Scope,
) -> ContextMeta {
    ContextMeta {
        chars: rendered.text.chars().count(),
        lines: rendered.text.lines().count(),
        truncated: rendered.truncated,
        budget,
        attempts,
        params,
        tier,
        scope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_budget() {
        let limits = BudgetLimits::default();
        assert_eq!(limits.effective(None), DEFAULT_BUDGET);
        assert_eq!(limits.effective(Some(500)), 500);
        assert_eq!(limits.effective(Some(1_000_000)), MAX_BUDGET);
    }

    #[test]
    fn test_small_tree_fits_first_try() {
        let state = TreeState::new("r", "Root");
        let outcome = render_context(&state, &ScopeRequest::global(), None).unwrap();
        assert_eq!(outcome.context(), Some("- (r) Root"));
        assert_eq!(outcome.meta().attempts, 1);
        assert_eq!(outcome.meta().tier, SizeTier::Small);
    }

    #[test]
    fn test_zero_budget_gives_up_after_shrinking() {
        let state = TreeState::new("r", "Root");
        let outcome = render_context(&state, &ScopeRequest::global(), Some(0)).unwrap();
        assert!(!outcome.is_ok());
        assert!(outcome.meta().attempts > 1);
        assert!(outcome.meta().attempts <= MAX_ATTEMPTS);
    }

    #[test]
    fn test_selection_errors() {
        let state = TreeState::new("r", "Root");
        let missing = ScopeRequest {
            scope: Scope::Node,
            selected_node_id: None,
        };
        assert_eq!(
            render_context(&state, &missing, None).unwrap_err(),
            ContextError::MissingSelection
        );
        assert_eq!(
            render_context(&state, &ScopeRequest::node("ghost"), None).unwrap_err(),
            ContextError::SelectedNotFound("ghost".into())
        );
    }

    #[test]
    fn test_too_large_payload_shape() {
        let state = TreeState::new("r", "Root");
        let outcome = render_context(&state, &ScopeRequest::global(), Some(1)).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "context_too_large");
        assert_eq!(json["hints"][0], "switch to node scope");
        assert_eq!(json["hints"][2], "work on one branch");
        assert_eq!(json["meta"]["budget"], 1);
        assert_eq!(json["meta"]["scope"], "global");
    }
}
