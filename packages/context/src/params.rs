//! Rendering parameters and their shrink schedule.

use mindmap_editor::Scope;
use serde::{Deserialize, Serialize};

const DEPTH_FLOOR: usize = 1;
const LINES_FLOOR: usize = 10;
const TITLE_FLOOR: usize = 16;
const SIBLINGS_FLOOR: usize = 3;
const NOTES_FLOOR: usize = 80;

/// Tree size class that picks the starting parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Small,
    Medium,
    Large,
}

impl SizeTier {
    /// Tier for a tree (or subtree) of `node_count` nodes
    pub fn for_count(node_count: usize) -> Self {
        match node_count {
            0..=150 => SizeTier::Small,
            151..=1500 => SizeTier::Medium,
            _ => SizeTier::Large,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeTier::Small => "small",
            SizeTier::Medium => "medium",
            SizeTier::Large => "large",
        }
    }
}

/// Knobs for one rendering attempt.
///
/// `max_depth` counts levels below the starting node, so `1` shows the
/// start and its direct children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    pub max_depth: usize,
    pub max_lines: usize,
    pub max_title_chars: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sibling_lines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_notes_chars: Option<usize>,
}

impl RenderParams {
    /// Starting vector for a scope and tier
    pub fn initial(scope: Scope, tier: SizeTier) -> Self {
        match scope {
            Scope::Global => {
                let (max_depth, max_lines, max_title_chars) = match tier {
                    SizeTier::Small => (12, 400, 160),
                    SizeTier::Medium => (8, 300, 100),
                    SizeTier::Large => (5, 200, 80),
                };
                Self {
                    max_depth,
                    max_lines,
                    max_title_chars,
                    max_sibling_lines: None,
                    max_notes_chars: None,
                }
            }
            Scope::Node => {
                let (max_depth, max_lines, max_title_chars, siblings, notes) = match tier {
                    SizeTier::Small => (10, 300, 160, 30, 4000),
                    SizeTier::Medium => (6, 200, 100, 20, 2000),
                    SizeTier::Large => (4, 120, 80, 12, 1200),
                };
                Self {
                    max_depth,
                    max_lines,
                    max_title_chars,
                    max_sibling_lines: Some(siblings),
                    max_notes_chars: Some(notes),
                }
            }
        }
    }

    /// Parameters for the attempt after shrink number `step` (1-based).
    ///
    /// Every cap is scaled to three fifths, clamped at its floor. Depth
    /// drops by one on odd steps, and on any step where scaling alone
    /// changed nothing. A result equal to `self` means every knob is at
    /// its floor.
    pub fn shrink(&self, step: usize) -> Self {
        let mut next = Self {
            max_depth: self.max_depth,
            max_lines: scale(self.max_lines, LINES_FLOOR),
            max_title_chars: scale(self.max_title_chars, TITLE_FLOOR),
            max_sibling_lines: self.max_sibling_lines.map(|v| scale(v, SIBLINGS_FLOOR)),
            max_notes_chars: self.max_notes_chars.map(|v| scale(v, NOTES_FLOOR)),
        };
        if step % 2 == 1 || next == *self {
            next.max_depth = self.max_depth.saturating_sub(1).max(DEPTH_FLOOR);
        }
        next
    }
}

fn scale(value: usize, floor: usize) -> usize {
    (value * 3 / 5).max(floor)
}
