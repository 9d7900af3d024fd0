/*
 * The mutation engine owns the live `EditorState` of a session and is the only
 * place that changes it node by node: creating roots and children, renaming,
 * editing content, deleting subtrees and flipping the two visibility toggles.
 * Ids are unique and always below `next_id`, and are never handed out twice.
 * `open_nodes` only references nodes that exist, and a delete never leaves the
 * selection pointing into the removed subtree.
 *
 * Persistence is not triggered from here; the caller decides when to save.
 */
use super::models::{EditorState, NodeId, OutlineNode};
use super::node_tree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    NotFound(NodeId),
    InvalidInput(String),
    IdSpaceExhausted,
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::NotFound(id) => write!(f, "No node with id {id} exists"),
            EditError::InvalidInput(reason) => write!(f, "Invalid input: {reason}"),
            EditError::IdSpaceExhausted => write!(f, "No further node ids can be issued"),
        }
    }
}

impl std::error::Error for EditError {}

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    BlankTitle,
    UnknownNode,
}

/*
 * Result of an operation that may deliberately do nothing. `Ignored` means the
 * state is exactly as it was before the call.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Default)]
pub struct MutationEngine {
    state: EditorState,
}

impl MutationEngine {
    pub fn new(state: EditorState) -> Self {
        MutationEngine { state }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    #[cfg(test)]
    pub fn into_state(self) -> EditorState {
        self.state
    }

    /*
     * Supersedes the whole state, as an import does. Nothing of the previous
     * state survives, including the id counter.
     */
    pub fn replace_state(&mut self, state: EditorState) {
        log::debug!(
            "MutationEngine: Replacing state ({} nodes, next id {}).",
            node_tree::count_nodes(&state.nodes),
            state.next_id
        );
        debug_assert!(node_tree::max_id(&state.nodes).is_none_or(|max| state.next_id > max));
        self.state = state;
    }

    pub fn node(&self, id: NodeId) -> Option<&OutlineNode> {
        node_tree::find_by_id(&self.state.nodes, id)
    }

    pub fn selected_node(&self) -> Option<&OutlineNode> {
        self.state.selected_node_id.and_then(|id| self.node(id))
    }

    #[cfg(test)]
    pub fn is_open(&self, id: NodeId) -> bool {
        self.state.open_nodes.contains(&id)
    }

    fn validated_title(title: &str) -> Result<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(EditError::InvalidInput(
                "title must not be empty".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    // The counter only moves when an id is actually handed out.
    fn allocate_id(&mut self) -> Result<NodeId> {
        let id = self.state.next_id;
        self.state.next_id = id.checked_add(1).ok_or(EditError::IdSpaceExhausted)?;
        Ok(id)
    }

    /// Appends a new root node at the end of the outline and returns its id.
    pub fn create_root(&mut self, title: &str) -> Result<NodeId> {
        let title = Self::validated_title(title)?;
        let id = self.allocate_id()?;
        self.state.nodes.push(OutlineNode::new(id, title));
        log::debug!("MutationEngine: Created root node {id}.");
        Ok(id)
    }

    /*
     * Appends a new child at the end of `parent_id`'s children and expands the
     * parent so the child is visible. The parent is checked before the title,
     * and no id is consumed when either check fails.
     */
    pub fn create_child(&mut self, parent_id: NodeId, title: &str) -> Result<NodeId> {
        if !node_tree::contains_id(&self.state.nodes, parent_id) {
            return Err(EditError::NotFound(parent_id));
        }
        let title = Self::validated_title(title)?;
        let id = self.allocate_id()?;
        let parent = node_tree::find_by_id_mut(&mut self.state.nodes, parent_id)
            .ok_or(EditError::NotFound(parent_id))?;
        parent.children.push(OutlineNode::new(id, title));
        self.state.open_nodes.insert(parent_id);
        log::debug!("MutationEngine: Created child node {id} under {parent_id}.");
        Ok(id)
    }

    /*
     * Renames a node. A blank title leaves the node untouched and reports
     * `Ignored(BlankTitle)` rather than an error.
     */
    pub fn rename_node(&mut self, id: NodeId, new_title: &str) -> Result<MutationOutcome> {
        let node =
            node_tree::find_by_id_mut(&mut self.state.nodes, id).ok_or(EditError::NotFound(id))?;
        let trimmed = new_title.trim();
        if trimmed.is_empty() {
            log::warn!("MutationEngine: Ignoring blank title for node {id}.");
            return Ok(MutationOutcome::Ignored(IgnoreReason::BlankTitle));
        }
        node.title = trimmed.to_string();
        log::debug!("MutationEngine: Renamed node {id}.");
        Ok(MutationOutcome::Applied)
    }

    // Any string is valid content, including the empty one.
    pub fn edit_content(&mut self, id: NodeId, new_content: &str) -> Result<()> {
        let node =
            node_tree::find_by_id_mut(&mut self.state.nodes, id).ok_or(EditError::NotFound(id))?;
        node.content = new_content.to_string();
        log::debug!("MutationEngine: Updated content of node {id}.");
        Ok(())
    }

    /*
     * Deletes a node together with its subtree. Every removed id leaves
     * `open_nodes`, and the selection is cleared when it pointed anywhere
     * inside the removed subtree.
     */
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        let removed =
            node_tree::remove_by_id(&mut self.state.nodes, id).ok_or(EditError::NotFound(id))?;
        let removed_ids = node_tree::subtree_ids(&removed);
        for removed_id in &removed_ids {
            self.state.open_nodes.remove(removed_id);
        }
        if let Some(selected) = self.state.selected_node_id {
            if removed_ids.contains(&selected) {
                self.state.selected_node_id = None;
            }
        }
        log::debug!(
            "MutationEngine: Deleted node {id} and {} descendant(s).",
            removed_ids.len() - 1
        );
        Ok(())
    }

    pub fn toggle_open(&mut self, id: NodeId) -> MutationOutcome {
        if !node_tree::contains_id(&self.state.nodes, id) {
            return MutationOutcome::Ignored(IgnoreReason::UnknownNode);
        }
        if !self.state.open_nodes.remove(&id) {
            self.state.open_nodes.insert(id);
        }
        MutationOutcome::Applied
    }

    pub fn toggle_content_visible(&mut self, id: NodeId) -> MutationOutcome {
        match node_tree::find_by_id_mut(&mut self.state.nodes, id) {
            Some(node) => {
                node.content_visible = !node.content_visible;
                MutationOutcome::Applied
            }
            None => MutationOutcome::Ignored(IgnoreReason::UnknownNode),
        }
    }

    /*
     * Selection is set without an existence check: the same click that selects
     * a node may also toggle it, and the host only offers ids it has rendered.
     */
    pub fn select_node(&mut self, id: NodeId) {
        self.state.selected_node_id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::collections::HashSet;

    fn engine_with_tree() -> (MutationEngine, NodeId, NodeId, NodeId) {
        let mut engine = MutationEngine::default();
        let a = engine.create_root("A").unwrap();
        let b = engine.create_child(a, "B").unwrap();
        let c = engine.create_child(b, "C").unwrap();
        (engine, a, b, c)
    }

    #[test]
    fn test_create_root_allocates_sequential_ids() {
        let mut engine = MutationEngine::default();
        assert_eq!(engine.create_root("First").unwrap(), 1);
        assert_eq!(engine.create_root("  Second  ").unwrap(), 2);
        let state = engine.state();
        assert_eq!(state.next_id, 3);
        assert_eq!(state.nodes[1].title, "Second");
        assert_eq!(state.nodes[1].content, "Content of Second.");
        assert!(!state.nodes[1].content_visible);
    }

    #[test]
    fn test_create_root_blank_title_is_invalid_and_consumes_no_id() {
        let mut engine = MutationEngine::default();
        assert!(matches!(
            engine.create_root("   "),
            Err(EditError::InvalidInput(_))
        ));
        assert_eq!(engine.state().next_id, 1);
        assert!(engine.state().nodes.is_empty());
    }

    #[test]
    fn test_create_child_opens_parent_and_appends() {
        let mut engine = MutationEngine::default();
        let a = engine.create_root("A").unwrap();
        let first = engine.create_child(a, "one").unwrap();
        let second = engine.create_child(a, "two").unwrap();
        assert!(engine.is_open(a));
        let children: Vec<NodeId> = engine.node(a).unwrap().children.iter().map(|n| n.id).collect();
        assert_eq!(children, vec![first, second]);
    }

    #[test]
    fn test_create_child_errors() {
        let mut engine = MutationEngine::default();
        let a = engine.create_root("A").unwrap();
        assert_eq!(engine.create_child(99, "x"), Err(EditError::NotFound(99)));
        assert!(matches!(
            engine.create_child(a, ""),
            Err(EditError::InvalidInput(_))
        ));
        assert_eq!(engine.state().next_id, 2);
        assert!(!engine.is_open(a));
    }

    #[test]
    fn test_rename_not_found_and_blank_are_distinct() {
        let (mut engine, a, _, _) = engine_with_tree();
        assert_eq!(engine.rename_node(404, "x"), Err(EditError::NotFound(404)));
        assert_eq!(
            engine.rename_node(a, " \t "),
            Ok(MutationOutcome::Ignored(IgnoreReason::BlankTitle))
        );
        assert_eq!(engine.node(a).unwrap().title, "A");
        assert_eq!(engine.rename_node(a, "  Alpha "), Ok(MutationOutcome::Applied));
        assert_eq!(engine.node(a).unwrap().title, "Alpha");
    }

    #[test]
    fn test_edit_content_accepts_empty_string() {
        let (mut engine, _, b, _) = engine_with_tree();
        engine.edit_content(b, "").unwrap();
        assert_eq!(engine.node(b).unwrap().content, "");
        assert_eq!(engine.edit_content(77, "x"), Err(EditError::NotFound(77)));
    }

    #[test]
    fn test_delete_scenario_root_with_child() {
        let mut engine = MutationEngine::default();
        let a = engine.create_root("A").unwrap();
        let b = engine.create_child(a, "B").unwrap();
        assert_eq!((a, b), (1, 2));
        assert!(engine.is_open(1));
        engine.select_node(a);

        engine.delete_node(a).unwrap();

        let state = engine.state();
        assert!(state.nodes.is_empty());
        assert!(state.open_nodes.is_empty());
        assert_eq!(state.selected_node_id, None);
        assert_eq!(state.next_id, 3);
    }

    #[test]
    fn test_delete_clears_selection_of_descendant_and_open_descendants() {
        let (mut engine, a, b, c) = engine_with_tree();
        let other = engine.create_root("Other").unwrap();
        engine.toggle_open(c);
        engine.toggle_open(other);
        engine.select_node(c);

        engine.delete_node(b).unwrap();

        assert!(engine.node(b).is_none());
        assert!(engine.node(c).is_none());
        assert_eq!(engine.state().selected_node_id, None);
        assert!(engine.is_open(a));
        assert!(!engine.is_open(b));
        assert!(!engine.is_open(c));
        assert!(engine.is_open(other));
    }

    #[test]
    fn test_delete_keeps_selection_outside_subtree() {
        let (mut engine, a, b, _) = engine_with_tree();
        engine.select_node(a);
        engine.delete_node(b).unwrap();
        assert_eq!(engine.state().selected_node_id, Some(a));
        assert_eq!(engine.delete_node(b), Err(EditError::NotFound(b)));
    }

    #[test]
    fn test_toggles_are_independent() {
        let (mut engine, a, _, _) = engine_with_tree();
        assert!(engine.is_open(a));
        assert_eq!(engine.toggle_open(a), MutationOutcome::Applied);
        assert!(!engine.is_open(a));
        assert!(!engine.node(a).unwrap().content_visible);

        assert_eq!(engine.toggle_content_visible(a), MutationOutcome::Applied);
        assert!(engine.node(a).unwrap().content_visible);
        assert!(!engine.is_open(a));

        engine.toggle_open(a);
        assert!(engine.is_open(a));
        assert!(engine.node(a).unwrap().content_visible);
    }

    #[test]
    fn test_toggles_on_unknown_node_are_ignored() {
        let (mut engine, _, _, _) = engine_with_tree();
        let before = engine.state().clone();
        assert_eq!(
            engine.toggle_open(50),
            MutationOutcome::Ignored(IgnoreReason::UnknownNode)
        );
        assert_eq!(
            engine.toggle_content_visible(50),
            MutationOutcome::Ignored(IgnoreReason::UnknownNode)
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_select_node_does_not_check_existence() {
        let mut engine = MutationEngine::default();
        engine.select_node(12);
        assert_eq!(engine.state().selected_node_id, Some(12));
        assert!(engine.selected_node().is_none());
    }

    #[test]
    fn test_random_create_delete_sequences_never_reuse_ids() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let mut engine = MutationEngine::default();
            let mut issued = HashSet::new();
            let mut last_issued = 0;
            for step in 0..60 {
                let existing = node_tree::collect_ids(&engine.state().nodes);
                let roll = rng.random_range(0..10);
                let new_id = if existing.is_empty() || roll < 3 {
                    Some(engine.create_root(&format!("Root {step}")).unwrap())
                } else if roll < 8 {
                    let parent = existing[rng.random_range(0..existing.len())];
                    Some(engine.create_child(parent, &format!("Child {step}")).unwrap())
                } else {
                    let victim = existing[rng.random_range(0..existing.len())];
                    engine.delete_node(victim).unwrap();
                    None
                };
                if let Some(id) = new_id {
                    assert!(id > last_issued, "id {id} not above {last_issued}");
                    assert!(issued.insert(id), "id {id} issued twice");
                    last_issued = id;
                }
                let state = engine.state();
                assert_eq!(node_tree::find_duplicate_id(&state.nodes), None);
                if let Some(max) = node_tree::max_id(&state.nodes) {
                    assert!(state.next_id > max);
                }
                for open in &state.open_nodes {
                    assert!(node_tree::contains_id(&state.nodes, *open));
                }
            }
        }
    }

    #[test]
    fn test_exhausted_id_space_is_reported_without_changes() {
        let mut state = EditorState::new();
        state.nodes.push(OutlineNode::new(5, "X".to_string()));
        state.next_id = NodeId::MAX;
        let mut engine = MutationEngine::new(state.clone());

        assert_eq!(engine.create_root("Y"), Err(EditError::IdSpaceExhausted));
        assert_eq!(engine.create_child(5, "Z"), Err(EditError::IdSpaceExhausted));
        assert_eq!(engine.state(), &state);
    }

    #[test]
    fn test_last_id_below_max_is_issued() {
        let mut state = EditorState::new();
        state.next_id = NodeId::MAX - 1;
        let mut engine = MutationEngine::new(state);
        assert_eq!(engine.create_root("Last").unwrap(), NodeId::MAX - 1);
        assert_eq!(engine.state().next_id, NodeId::MAX);
        assert_eq!(engine.create_root("Over"), Err(EditError::IdSpaceExhausted));
    }
}
