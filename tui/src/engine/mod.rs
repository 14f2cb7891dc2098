//! Component engine: registry, layout nodes, parallel arrays.

pub mod arrays;
pub mod layout_node;
pub mod node_registry;
pub mod registry;

pub use layout_node::{LayoutNode, INSET_UNSET};
pub use node_registry::{
    create_layout_node, destroy_layout_node, get_layout_node, layout_node_count,
    reset_layout_nodes,
};
pub use registry::{
    add_destroy_callback, allocate_index, current_component, get_allocated_count,
    get_allocated_indices, get_current_parent_index, get_id, get_index, is_allocated,
    pop_current_component, pop_parent_context, push_current_component, push_parent_context,
    release_index, reset_registry,
};
