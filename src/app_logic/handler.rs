use super::input_provider::InputProviderOperations;
use super::types::{ActionOutcome, AppEvent, ClickTarget, HostCommand, MessageSeverity};
use super::ui_constants;
use crate::core::import_export::default_export_file_name;
use crate::core::{
    ConfigManagerOperations, DocumentFileOperations, EditError, EditorState, MutationEngine,
    MutationOutcome, NodeId, StateStoreOperations,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;

pub(crate) const APP_NAME: &str = "OutlineKeeper";

/*
 * Orchestrates one editing session in a host-agnostic way. It receives action
 * triggers (`AppEvent`) from the host, asks the user for input through the
 * host's `InputProviderOperations`, drives the `MutationEngine`, persists the
 * state after every change through `StateStoreOperations`, and queues
 * `HostCommand`s telling the host what to redraw or report.
 *
 * The in-memory state is authoritative. A failed save is reported to the user
 * but the change it tried to persist is kept, and the next successful save
 * writes it out.
 */
pub struct OutlineAppLogic {
    engine: MutationEngine,
    state_store: Arc<dyn StateStoreOperations>,
    config_manager: Arc<dyn ConfigManagerOperations>,
    document_files: Arc<dyn DocumentFileOperations>,
    command_queue: VecDeque<HostCommand>,
}

impl OutlineAppLogic {
    pub fn new(
        state_store: Arc<dyn StateStoreOperations>,
        config_manager: Arc<dyn ConfigManagerOperations>,
        document_files: Arc<dyn DocumentFileOperations>,
    ) -> Self {
        OutlineAppLogic {
            engine: MutationEngine::default(),
            state_store,
            config_manager,
            document_files,
            command_queue: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        self.engine.state()
    }

    #[cfg(test)]
    pub fn engine(&self) -> &MutationEngine {
        &self.engine
    }

    pub fn try_dequeue_command(&mut self) -> Option<HostCommand> {
        self.command_queue.pop_front()
    }

    fn enqueue_command(&mut self, command: HostCommand) {
        self.command_queue.push_back(command);
    }

    fn show_message(&mut self, severity: MessageSeverity, text: String) {
        self.enqueue_command(HostCommand::ShowMessage { severity, text });
    }

    fn queue_redraw(&mut self) {
        let has_selection = self.engine.selected_node().is_some();
        self.enqueue_command(HostCommand::RedrawTree);
        self.enqueue_command(HostCommand::SetSelectionActionsEnabled(has_selection));
    }

    /*
     * Loads the stored state, if any. A missing snapshot starts an empty
     * outline. An unreadable one is reported as a warning and also starts an
     * empty outline; the store keeps a copy of the unreadable file before the
     * first save replaces it.
     */
    pub fn on_startup(&mut self) {
        match self.state_store.load_state() {
            Ok(Some(state)) => {
                log::debug!("AppLogic: Restored stored outline.");
                self.engine.replace_state(state);
            }
            Ok(None) => {
                log::debug!("AppLogic: No stored outline, starting empty.");
            }
            Err(e) => {
                log::error!("AppLogic: Failed to load stored outline: {e}");
                self.show_message(
                    MessageSeverity::Warning,
                    format!("{}: {e}", ui_constants::MSG_LOAD_FAILED_PREFIX),
                );
            }
        }
        self.queue_redraw();
    }

    fn persist(&mut self) {
        if let Err(e) = self.state_store.save_state(self.engine.state()) {
            log::error!("AppLogic: Failed to persist outline: {e}");
            self.show_message(
                MessageSeverity::Error,
                format!("{}: {e}", ui_constants::MSG_SAVE_FAILED_PREFIX),
            );
        }
    }

    fn persist_and_redraw(&mut self) -> ActionOutcome {
        self.persist();
        self.queue_redraw();
        ActionOutcome::Applied
    }

    pub fn handle_event(
        &mut self,
        event: AppEvent,
        input: &mut dyn InputProviderOperations,
    ) -> ActionOutcome {
        log::trace!("AppLogic: Handling {event:?}");
        match event {
            AppEvent::AddRoot => self.handle_add_root(input),
            AppEvent::AddChild => self.handle_add_child(input),
            AppEvent::Rename => self.handle_rename(input),
            AppEvent::EditContent => self.handle_edit_content(input),
            AppEvent::Delete => self.handle_delete(input),
            AppEvent::NodeClicked { id, target } => self.handle_node_clicked(id, target),
            AppEvent::ToggleOpen(id) => {
                let outcome = self.engine.toggle_open(id);
                self.finish_mutation(outcome)
            }
            AppEvent::ToggleContentVisible(id) => {
                let outcome = self.engine.toggle_content_visible(id);
                self.finish_mutation(outcome)
            }
            AppEvent::Select(id) => {
                self.engine.select_node(id);
                self.persist_and_redraw()
            }
            AppEvent::Export => self.handle_export(input),
            AppEvent::Import => self.handle_import(input),
            AppEvent::Quit => {
                self.enqueue_command(HostCommand::Quit);
                ActionOutcome::Applied
            }
        }
    }

    fn finish_mutation(&mut self, outcome: MutationOutcome) -> ActionOutcome {
        match outcome {
            MutationOutcome::Applied => self.persist_and_redraw(),
            MutationOutcome::Ignored(reason) => {
                log::debug!("AppLogic: Mutation ignored ({reason:?}).");
                ActionOutcome::Ignored
            }
        }
    }

    // Blank titles are dropped without a message so the input flow is not interrupted.
    fn created(&mut self, result: Result<NodeId, EditError>) -> ActionOutcome {
        match result {
            Ok(id) => {
                log::debug!("AppLogic: Node {id} created.");
                self.persist_and_redraw()
            }
            Err(EditError::InvalidInput(reason)) => {
                log::warn!("AppLogic: Node not created: {reason}");
                ActionOutcome::Ignored
            }
            Err(EditError::NotFound(id)) => {
                log::warn!("AppLogic: Parent node {id} no longer exists.");
                ActionOutcome::Ignored
            }
            Err(e @ EditError::IdSpaceExhausted) => {
                log::error!("AppLogic: Node not created: {e}");
                let text = format!("{}: {e}", ui_constants::MSG_CREATE_FAILED_PREFIX);
                self.show_message(MessageSeverity::Error, text.clone());
                ActionOutcome::Rejected(text)
            }
        }
    }

    fn handle_add_root(&mut self, input: &mut dyn InputProviderOperations) -> ActionOutcome {
        let default_title = ui_constants::default_root_title(self.engine.state().next_id);
        let Some(title) = input.request_title(ui_constants::PROMPT_NEW_ROOT_TITLE, &default_title)
        else {
            return ActionOutcome::Cancelled;
        };
        let result = self.engine.create_root(&title);
        self.created(result)
    }

    /*
     * The selection-bound actions share this guard. The host disables them when
     * nothing is selected; a selection that points at a node which no longer
     * exists is handled the same way.
     */
    fn selected_id(&self) -> Option<NodeId> {
        let id = self.engine.selected_node().map(|node| node.id);
        if id.is_none() {
            log::debug!("AppLogic: {}", ui_constants::MSG_NOTHING_SELECTED);
        }
        id
    }

    fn handle_add_child(&mut self, input: &mut dyn InputProviderOperations) -> ActionOutcome {
        let Some(parent_id) = self.selected_id() else {
            return ActionOutcome::Ignored;
        };
        let default_title = ui_constants::default_child_title(self.engine.state().next_id);
        let Some(title) =
            input.request_title(ui_constants::PROMPT_NEW_CHILD_TITLE, &default_title)
        else {
            return ActionOutcome::Cancelled;
        };
        let result = self.engine.create_child(parent_id, &title);
        self.created(result)
    }

    fn handle_rename(&mut self, input: &mut dyn InputProviderOperations) -> ActionOutcome {
        let Some(id) = self.selected_id() else {
            return ActionOutcome::Ignored;
        };
        let current_title = self
            .engine
            .node(id)
            .map(|node| node.title.clone())
            .unwrap_or_default();
        let Some(new_title) = input.request_title(ui_constants::PROMPT_RENAME_TITLE, &current_title)
        else {
            return ActionOutcome::Cancelled;
        };
        match self.engine.rename_node(id, &new_title) {
            Ok(outcome) => self.finish_mutation(outcome),
            Err(e) => {
                log::warn!("AppLogic: Rename failed: {e}");
                ActionOutcome::Ignored
            }
        }
    }

    fn handle_edit_content(&mut self, input: &mut dyn InputProviderOperations) -> ActionOutcome {
        let Some(id) = self.selected_id() else {
            return ActionOutcome::Ignored;
        };
        let current_content = self
            .engine
            .node(id)
            .map(|node| node.content.clone())
            .unwrap_or_default();
        let Some(new_content) =
            input.request_content(ui_constants::PROMPT_EDIT_CONTENT, &current_content)
        else {
            return ActionOutcome::Cancelled;
        };
        match self.engine.edit_content(id, &new_content) {
            Ok(()) => self.persist_and_redraw(),
            Err(e) => {
                log::warn!("AppLogic: Content edit failed: {e}");
                ActionOutcome::Ignored
            }
        }
    }

    fn handle_delete(&mut self, input: &mut dyn InputProviderOperations) -> ActionOutcome {
        let Some(id) = self.selected_id() else {
            return ActionOutcome::Ignored;
        };
        if !input.confirm(ui_constants::PROMPT_CONFIRM_DELETE) {
            return ActionOutcome::Cancelled;
        }
        match self.engine.delete_node(id) {
            Ok(()) => self.persist_and_redraw(),
            Err(e) => {
                log::warn!("AppLogic: Delete failed: {e}");
                ActionOutcome::Ignored
            }
        }
    }

    /*
     * A click always selects the node. A click on the title also expands or
     * collapses it, a click on the content toggle shows or hides its content.
     */
    fn handle_node_clicked(&mut self, id: NodeId, target: ClickTarget) -> ActionOutcome {
        self.engine.select_node(id);
        match target {
            ClickTarget::Title => {
                self.engine.toggle_open(id);
            }
            ClickTarget::ContentToggle => {
                self.engine.toggle_content_visible(id);
            }
            ClickTarget::Body => {}
        }
        self.persist_and_redraw()
    }

    fn remember_document_path(&self, path: &std::path::Path) {
        if let Err(e) = self.config_manager.save_last_document_path(path) {
            log::warn!("AppLogic: Could not remember document path {path:?}: {e}");
        }
    }

    fn last_document_path(&self) -> Option<PathBuf> {
        match self.config_manager.load_last_document_path() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("AppLogic: Could not read last document path: {e}");
                None
            }
        }
    }

    fn handle_export(&mut self, input: &mut dyn InputProviderOperations) -> ActionOutcome {
        let file_name = default_export_file_name(OffsetDateTime::now_utc());
        let suggested = match self.last_document_path() {
            Some(last) => last
                .parent()
                .map(|dir| dir.join(&file_name))
                .unwrap_or_else(|| PathBuf::from(&file_name)),
            None => PathBuf::from(&file_name),
        };
        let Some(path) = input.request_export_path(ui_constants::PROMPT_EXPORT_PATH, &suggested)
        else {
            return ActionOutcome::Cancelled;
        };

        match self.document_files.export_to_file(self.engine.state(), &path) {
            Ok(()) => {
                self.remember_document_path(&path);
                self.show_message(
                    MessageSeverity::Information,
                    format!("Outline exported to {}", path.display()),
                );
                ActionOutcome::Applied
            }
            Err(e) => {
                log::error!("AppLogic: Export to {path:?} failed: {e}");
                let text = format!("{}: {e}", ui_constants::MSG_EXPORT_FAILED_PREFIX);
                self.show_message(MessageSeverity::Error, text.clone());
                ActionOutcome::Rejected(text)
            }
        }
    }

    /*
     * Replaces the whole outline with the imported one. An invalid document
     * leaves the current outline untouched.
     */
    fn handle_import(&mut self, input: &mut dyn InputProviderOperations) -> ActionOutcome {
        let suggested = self.last_document_path();
        let Some(path) =
            input.request_import_path(ui_constants::PROMPT_IMPORT_PATH, suggested.as_deref())
        else {
            return ActionOutcome::Cancelled;
        };

        match self.document_files.import_from_file(&path) {
            Ok(state) => {
                self.engine.replace_state(state);
                self.remember_document_path(&path);
                self.show_message(
                    MessageSeverity::Information,
                    format!("Outline imported from {}", path.display()),
                );
                self.persist_and_redraw()
            }
            Err(e) => {
                log::warn!("AppLogic: Import from {path:?} rejected: {e}");
                let text = format!("{}: {e}", ui_constants::MSG_IMPORT_FAILED_PREFIX);
                self.show_message(MessageSeverity::Error, text.clone());
                ActionOutcome::Rejected(text)
            }
        }
    }
}
