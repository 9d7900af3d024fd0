/*
 * Prompt texts and status messages the application logic hands to the host.
 * Kept in one place so the presenter and its tests agree on the wording.
 */

pub const PROMPT_NEW_ROOT_TITLE: &str = "Enter the title for the new root node:";
pub const PROMPT_NEW_CHILD_TITLE: &str = "Enter the title for the new child node:";
pub const PROMPT_RENAME_TITLE: &str = "Enter the new title:";
pub const PROMPT_EDIT_CONTENT: &str = "Enter the content for this node:";
pub const PROMPT_CONFIRM_DELETE: &str =
    "Are you sure you want to delete this node and all of its children?";
pub const PROMPT_IMPORT_PATH: &str = "Choose an outline document to import:";
pub const PROMPT_EXPORT_PATH: &str = "Choose where to save the exported outline:";

pub fn default_root_title(next_id: u64) -> String {
    format!("Node {next_id}")
}

pub fn default_child_title(next_id: u64) -> String {
    format!("Child Node {next_id}")
}

pub const MSG_NOTHING_SELECTED: &str = "Select a node first.";
pub const MSG_SAVE_FAILED_PREFIX: &str = "Changes could not be saved";
pub const MSG_LOAD_FAILED_PREFIX: &str = "The saved outline could not be loaded";
pub const MSG_CREATE_FAILED_PREFIX: &str = "The node could not be created";
pub const MSG_IMPORT_FAILED_PREFIX: &str = "Import failed";
pub const MSG_EXPORT_FAILED_PREFIX: &str = "Export failed";
