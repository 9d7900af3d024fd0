/*
 * Converts an `EditorState` to and from its storable `Snapshot` form, and
 * migrates snapshots written by older versions of the application.
 *
 * There is no schema version in a snapshot. Older versions simply did not
 * write some node fields (`contentVisible`, `content`, `children`), so the
 * snapshot node type keeps those as `Option`s and migration fills in whatever
 * is absent. A snapshot that already has every field passes through unchanged,
 * which makes migration idempotent.
 */
use super::models::{EditorState, NodeId, OutlineNode, content_template};
use super::node_tree;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    pub id: NodeId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SnapshotNode>>,
}

/*
 * The stored form of a whole editor state. `open_nodes` is a plain sequence
 * here; `next_id` is optional so that a snapshot lacking it can still be
 * loaded and repaired.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub selected_node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<NodeId>,
    #[serde(default)]
    pub open_nodes: Vec<NodeId>,
}

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    DuplicateId(NodeId),
    // A node carries the largest possible id, so no next id can be issued.
    IdSpaceExhausted,
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err)
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Json(e) => write!(f, "Snapshot JSON error: {e}"),
            CodecError::DuplicateId(id) => {
                write!(f, "Snapshot contains node id {id} more than once")
            }
            CodecError::IdSpaceExhausted => {
                write!(f, "Snapshot uses the largest node id, no further ids can be issued")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Json(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

fn node_to_snapshot(node: &OutlineNode) -> SnapshotNode {
    SnapshotNode {
        id: node.id,
        title: node.title.clone(),
        content: Some(node.content.clone()),
        content_visible: Some(node.content_visible),
        children: Some(node.children.iter().map(node_to_snapshot).collect()),
    }
}

/// Copies the live state into a snapshot with every field present.
pub fn serialize(state: &EditorState) -> Snapshot {
    Snapshot {
        nodes: state.nodes.iter().map(node_to_snapshot).collect(),
        selected_node_id: state.selected_node_id,
        next_id: Some(state.next_id),
        open_nodes: state.open_nodes.iter().copied().collect(),
    }
}

fn migrate_nodes(nodes: &mut [SnapshotNode]) {
    for node in nodes.iter_mut() {
        if node.content_visible.is_none() {
            node.content_visible = Some(false);
        }
        if node.content.is_none() {
            node.content = Some(content_template(&node.title));
        }
        let children = node.children.get_or_insert_with(Vec::new);
        migrate_nodes(children);
    }
}

fn snapshot_max_id(nodes: &[SnapshotNode]) -> Option<NodeId> {
    nodes
        .iter()
        .map(|node| {
            let child_max = node.children.as_deref().and_then(snapshot_max_id);
            child_max.map_or(node.id, |m| m.max(node.id))
        })
        .max()
}

fn snapshot_contains(nodes: &[SnapshotNode], id: NodeId) -> bool {
    nodes.iter().any(|node| {
        node.id == id
            || node
                .children
                .as_deref()
                .is_some_and(|children| snapshot_contains(children, id))
    })
}

/*
 * Brings a snapshot up to the current schema in place. Per node, absent
 * fields get their defaults. For the state as a whole, `next_id` is raised
 * above every id present, and open or selected ids that do not name an
 * existing node are dropped. Running it twice gives the same result as
 * running it once. Fails when a node already uses `NodeId::MAX`, since no
 * `next_id` above it exists.
 */
pub fn migrate_snapshot(snapshot: &mut Snapshot) -> Result<()> {
    migrate_nodes(&mut snapshot.nodes);

    let minimum_next_id = match snapshot_max_id(&snapshot.nodes) {
        Some(max) => max.checked_add(1).ok_or(CodecError::IdSpaceExhausted)?,
        None => 1,
    };
    match snapshot.next_id {
        Some(next_id) if next_id >= minimum_next_id => {}
        stored => {
            log::debug!(
                "PersistenceCodec: Repairing next id {stored:?} to {minimum_next_id}."
            );
            snapshot.next_id = Some(minimum_next_id);
        }
    }

    let nodes = &snapshot.nodes;
    snapshot
        .open_nodes
        .retain(|id| snapshot_contains(nodes, *id));
    if let Some(selected) = snapshot.selected_node_id {
        if !snapshot_contains(nodes, selected) {
            log::debug!("PersistenceCodec: Dropping selection of missing node {selected}.");
            snapshot.selected_node_id = None;
        }
    }
    Ok(())
}

fn node_from_snapshot(node: SnapshotNode) -> OutlineNode {
    let content = node
        .content
        .unwrap_or_else(|| content_template(&node.title));
    OutlineNode {
        id: node.id,
        title: node.title,
        content,
        content_visible: node.content_visible.unwrap_or(false),
        children: node
            .children
            .unwrap_or_default()
            .into_iter()
            .map(node_from_snapshot)
            .collect(),
    }
}

/*
 * Builds a live state from a stored snapshot, migrating it first. Fails when
 * the snapshot repeats a node id or uses up the id space, since no migration
 * can make such a tree consistent.
 */
pub fn deserialize(mut snapshot: Snapshot) -> Result<EditorState> {
    migrate_snapshot(&mut snapshot)?;
    let nodes: Vec<OutlineNode> = snapshot.nodes.into_iter().map(node_from_snapshot).collect();
    if let Some(duplicate) = node_tree::find_duplicate_id(&nodes) {
        return Err(CodecError::DuplicateId(duplicate));
    }
    Ok(EditorState {
        nodes,
        selected_node_id: snapshot.selected_node_id,
        next_id: snapshot.next_id.unwrap_or(1),
        open_nodes: snapshot.open_nodes.into_iter().collect::<BTreeSet<_>>(),
    })
}

pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn snapshot_from_json(text: &str) -> Result<Snapshot> {
    Ok(from_json_text(text)?)
}

/*
 * Parses JSON without serde_json's nesting limit. Outlines may be nested to
 * any depth, and each level costs two levels of JSON (node object and
 * `children` array). `serde_stacker` grows the stack on demand instead.
 */
pub(crate) fn from_json_text<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Converts an already parsed JSON value with the same stack protection.
pub(crate) fn from_json_value<T: DeserializeOwned>(
    value: serde_json::Value,
) -> serde_json::Result<T> {
    T::deserialize(serde_stacker::Deserializer::new(value))
}
