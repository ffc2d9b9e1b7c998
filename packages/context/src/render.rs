//! Global and node-centred context text for one parameter vector.

use crate::outline::{bullet, clip, clip_title, outline, ELLIPSIS};
use crate::params::RenderParams;
use mindmap_editor::{ChildIndex, TreeState};

/// Text produced by a single rendering attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rendered {
    pub(crate) text: String,
    /// Whether any cap removed content
    pub(crate) truncated: bool,
}

/// Whole tree from the root
pub(crate) fn render_global<'a>(state: &'a TreeState, index: &ChildIndex<'a>, params: &RenderParams) -> Rendered {
    let Some(root) = state.root() else {
        return Rendered {
            text: String::new(),
            truncated: false,
        };
    };
    let out = outline(state, index, root.id.as_str(), params);
    Rendered {
        text: out.lines.join("\n"),
        truncated: out.truncated,
    }
}

/// Path, siblings, subtree and notes around `selected`.
///
/// Nothing outside the selected subtree, its ancestor path and its
/// siblings is ever written.
pub(crate) fn render_node<'a>(
    state: &'a TreeState,
    index: &ChildIndex<'a>,
    selected: &'a str,
    params: &RenderParams,
) -> Rendered {
    let Some(node) = state.node(selected) else {
        return Rendered {
            text: String::new(),
            truncated: false,
        };
    };
    let mut truncated = false;
    let mut lines = Vec::new();

    let path: Vec<String> = state
        .path_to(selected)
        .into_iter()
        .map(|n| clip_title(&n.text, params.max_title_chars))
        .collect();
    lines.push(format!("Path: {}", path.join(" > ")));
    lines.push(format!(
        "Selected node: ({selected}) {}",
        clip_title(&node.text, params.max_title_chars)
    ));

    let siblings: Vec<&str> = match node.parent_id.as_deref() {
        Some(parent_id) => index
            .children(parent_id)
            .iter()
            .copied()
            .filter(|id| *id != selected)
            .collect(),
        None => Vec::new(),
    };
    if siblings.is_empty() {
        lines.push("Siblings: none".to_string());
    } else {
        lines.push("Siblings:".to_string());
        let cap = params.max_sibling_lines.unwrap_or(siblings.len());
        for id in siblings.iter().take(cap) {
            if let Some(sibling) = state.node(id) {
                lines.push(bullet(0, id, &sibling.text, params.max_title_chars));
            }
        }
        if siblings.len() > cap {
            lines.push(format!("- {ELLIPSIS} and {} more", siblings.len() - cap));
            truncated = true;
        }
    }

    lines.push("Subtree:".to_string());
    let subtree = outline(state, index, selected, params);
    truncated |= subtree.truncated;
    lines.extend(subtree.lines);

    match node.notes.as_deref().filter(|notes| !notes.trim().is_empty()) {
        Some(notes) => {
            let (notes, clipped) = match params.max_notes_chars {
                Some(max) => clip(notes, max),
                None => (notes.to_string(), false),
            };
            truncated |= clipped;
            lines.push("Notes:".to_string());
            lines.push(notes);
        }
        None => lines.push("Notes: none".to_string()),
    }

    Rendered {
        text: lines.join("\n"),
        truncated,
    }
}
