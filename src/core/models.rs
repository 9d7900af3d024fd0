use std::collections::BTreeSet;

pub type NodeId = u64;

/*
 * Builds the default content text for a node. New nodes start with it, and
 * stored nodes that predate the content field are given it during migration.
 */
pub fn content_template(title: &str) -> String {
    format!("Content of {title}.")
}

// A single outline entry. Children are owned exclusively by their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    pub content_visible: bool,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /*
     * Creates a leaf node with the content template derived from its title and
     * its content hidden.
     */
    pub fn new(id: NodeId, title: String) -> Self {
        let content = content_template(&title);
        OutlineNode {
            id,
            title,
            content,
            content_visible: false,
            children: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn new_full(
        id: NodeId,
        title: &str,
        content: &str,
        content_visible: bool,
        children: Vec<OutlineNode>,
    ) -> Self {
        OutlineNode {
            id,
            title: title.to_string(),
            content: content.to_string(),
            content_visible,
            children,
        }
    }
}

/*
 * The complete state of one editing session: the root nodes in display order,
 * the current selection, the id counter and the set of expanded nodes.
 * Expansion (`open_nodes`) is tracked separately from each node's
 * `content_visible` flag; the two toggles are independent.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub nodes: Vec<OutlineNode>,
    pub selected_node_id: Option<NodeId>,
    pub next_id: NodeId,
    pub open_nodes: BTreeSet<NodeId>,
}

impl EditorState {
    pub fn new() -> Self {
        EditorState {
            nodes: Vec::new(),
            selected_node_id: None,
            next_id: 1,
            open_nodes: BTreeSet::new(),
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
