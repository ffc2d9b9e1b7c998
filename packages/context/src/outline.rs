//! Depth-first indented bullet outline.

use crate::params::RenderParams;
use mindmap_editor::{ChildIndex, TreeState};

pub(crate) const TRUNCATED_MARKER: &str = "… (truncated)";
pub(crate) const ELLIPSIS: &str = "…";

/// Lines of one outline plus whether anything was left out
#[derive(Debug, Default)]
pub(crate) struct Outline {
    pub lines: Vec<String>,
    pub truncated: bool,
}

enum Entry<'a> {
    Node { id: &'a str, depth: usize },
    /// Children hidden by the depth cap
    Elided { depth: usize },
}

/// Outline of `start` and its descendants, indented from column zero.
///
/// At most `max_lines` entries are emitted; the marker line that replaces
/// the rest does not count against the cap.
pub(crate) fn outline<'a>(
    state: &'a TreeState,
    index: &ChildIndex<'a>,
    start: &'a str,
    params: &RenderParams,
) -> Outline {
    let mut out = Outline::default();
    let mut stack = vec![Entry::Node { id: start, depth: 0 }];

    while let Some(entry) = stack.pop() {
        if out.lines.len() >= params.max_lines {
            out.lines.push(TRUNCATED_MARKER.to_string());
            out.truncated = true;
            break;
        }

        match entry {
            Entry::Node { id, depth } => {
                let Some(node) = state.node(id) else {
                    continue;
                };
                out.lines.push(bullet(depth, id, &node.text, params.max_title_chars));

                let children = index.children(id);
                if children.is_empty() {
                    continue;
                }
                if depth < params.max_depth {
                    stack.extend(children.iter().rev().map(|child| Entry::Node {
                        id: *child,
                        depth: depth + 1,
                    }));
                } else {
                    stack.push(Entry::Elided { depth: depth + 1 });
                }
            }
            Entry::Elided { depth } => {
                out.lines.push(format!("{}{ELLIPSIS}", indent(depth)));
                out.truncated = true;
            }
        }
    }

    out
}

/// `"<indent>- (id) title"`
pub(crate) fn bullet(depth: usize, id: &str, text: &str, max_title_chars: usize) -> String {
    format!("{}- ({id}) {}", indent(depth), clip_title(text, max_title_chars))
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Single-line title of at most `max_chars` characters
pub(crate) fn clip_title(text: &str, max_chars: usize) -> String {
    let flat: String = text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();
    clip(&flat, max_chars).0
}

/// Cut `text` to `max_chars` characters, ending in `…` when cut
pub(crate) fn clip(text: &str, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push_str(ELLIPSIS);
    (clipped, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_editor::Node;

    fn chain(len: usize) -> TreeState {
        let mut state = TreeState::new("n0", "Root");
        for i in 1..len {
            let id = format!("n{i}");
            state
                .nodes
                .insert(id.clone(), Node::new(id, Some(format!("n{}", i - 1)), format!("Level {i}"), 0));
        }
        state
    }

    fn params(max_depth: usize, max_lines: usize) -> RenderParams {
        RenderParams {
            max_depth,
            max_lines,
            max_title_chars: 40,
            max_sibling_lines: None,
            max_notes_chars: None,
        }
    }

    #[test]
    fn test_depth_cap_leaves_placeholder() {
        let state = chain(5);
        let index = ChildIndex::build(&state);
        let out = outline(&state, &index, "n0", &params(2, 100));

        assert_eq!(
            out.lines,
            vec!["- (n0) Root", "  - (n1) Level 1", "    - (n2) Level 2", "      …"]
        );
        assert!(out.truncated);
    }

    #[test]
    fn test_line_cap_appends_marker() {
        let state = chain(30);
        let index = ChildIndex::build(&state);
        let out = outline(&state, &index, "n0", &params(100, 10));

        assert_eq!(out.lines.len(), 11);
        assert_eq!(out.lines.last().map(String::as_str), Some(TRUNCATED_MARKER));
        assert!(out.truncated);
    }

    #[test]
    fn test_complete_outline_is_not_truncated() {
        let state = chain(3);
        let index = ChildIndex::build(&state);
        let out = outline(&state, &index, "n1", &params(10, 10));
        assert_eq!(out.lines, vec!["- (n1) Level 1", "  - (n2) Level 2"]);
        assert!(!out.truncated);
    }

    #[test]
    fn test_clip_title() {
        assert_eq!(clip_title("two\nlines", 20), "two lines");
        assert_eq!(clip_title("abcdefghij", 5), "abcd…");
        assert_eq!(clip_title("héllo", 5), "héllo");
    }
}
