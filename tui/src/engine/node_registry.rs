//! LayoutNode registry: index → node, lifetime tied to the component.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::layout_node::LayoutNode;

thread_local! {
    static NODES: RefCell<HashMap<usize, Rc<LayoutNode>>> = RefCell::new(HashMap::new());
}

/// Create (or fetch) the LayoutNode for `index`. Primitives call this right
/// after `allocate_index`.
pub fn create_layout_node(index: usize) -> Rc<LayoutNode> {
    NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        if let Some(node) = nodes.get(&index) {
            return node.clone();
        }
        let node = Rc::new(LayoutNode::new(index));
        nodes.insert(index, node.clone());
        node
    })
}

/// Fetch the LayoutNode for `index`, if the component has one.
pub fn get_layout_node(index: usize) -> Option<Rc<LayoutNode>> {
    NODES.with(|nodes| nodes.borrow().get(&index).cloned())
}

/// Disconnect and drop the node. Called by `release_index`.
pub fn destroy_layout_node(index: usize) {
    NODES.with(|nodes| {
        if let Some(node) = nodes.borrow_mut().remove(&index) {
            node.disconnect();
        }
    });
}

/// Disconnect and drop every node (empty-reset and tests).
pub fn reset_layout_nodes() {
    NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        for node in nodes.values() {
            node.disconnect();
        }
        nodes.clear();
    });
}

/// Number of live nodes.
pub fn layout_node_count() -> usize {
    NODES.with(|nodes| nodes.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    #[test]
    fn create_is_idempotent() {
        reset_layout_nodes();
        let a = create_layout_node(0);
        let b = create_layout_node(0);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(layout_node_count(), 1);
    }

    #[test]
    fn destroy_removes() {
        reset_layout_nodes();
        let node = create_layout_node(2);
        node.width.set_value(Dimension::Cells(9));
        destroy_layout_node(2);
        assert!(get_layout_node(2).is_none());
        assert_eq!(layout_node_count(), 0);
    }
}
