//! Hit testing: point → element lookup.
//!
//! Reverse-walks the document (last child first, as it paints on top) to
//! find the deepest rendered element whose layout box contains a point.
//! Hosts use it to turn pointer coordinates into the node a drag event is
//! over.

use crate::dom::Document;
use petgraph::graph::NodeIndex;

/// Find the topmost element at page position (px, py).
/// Returns `None` over bare page background.
pub fn element_at(doc: &Document, px: f32, py: f32) -> Option<NodeIndex> {
    hit_element(doc, doc.root, px, py)
}

fn hit_element(doc: &Document, idx: NodeIndex, px: f32, py: f32) -> Option<NodeIndex> {
    let element = doc.get(idx)?;
    if element.hidden {
        return None;
    }

    // Check children in reverse (topmost first)
    for &child in doc.children(idx).iter().rev() {
        if let Some(hit) = hit_element(doc, child, px, py) {
            return Some(hit);
        }
    }

    if idx == doc.root {
        return None;
    }

    if let Some(b) = element.bounds
        && b.contains(px, py)
    {
        return Some(idx);
    }

    None
}

/// Every rendered element whose box contains the point, innermost first.
pub fn elements_at(doc: &Document, px: f32, py: f32) -> Vec<NodeIndex> {
    let Some(top) = element_at(doc, px, py) else {
        return Vec::new();
    };
    doc.ancestors(top)
        .filter(|&a| a != doc.root)
        .filter(|&a| doc.graph[a].bounds.is_some_and(|b| b.contains(px, py)))
        .collect()
}
