/*
 * Data types exchanged between the application logic and the host that
 * renders the outline and collects user input. The host turns user actions
 * into `AppEvent`s; the logic answers with `HostCommand`s it queues for the
 * host to execute. Neither side needs to know how the other is implemented.
 */
use crate::core::NodeId;

// Which part of a rendered node the user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Title,
    ContentToggle,
    Body,
}

/*
 * Action triggers coming from the host. The first group acts on the current
 * selection, the rest name their node explicitly.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    AddRoot,
    AddChild,
    Rename,
    EditContent,
    Delete,
    NodeClicked { id: NodeId, target: ClickTarget },
    ToggleOpen(NodeId),
    ToggleContentVisible(NodeId),
    Select(NodeId),
    Export,
    Import,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    RedrawTree,
    // Add-child, rename, edit-content and delete need a selection.
    SetSelectionActionsEnabled(bool),
    ShowMessage {
        severity: MessageSeverity,
        text: String,
    },
    Quit,
}

/*
 * What became of one event. `Ignored` and `Cancelled` both leave the state
 * untouched and nothing is persisted; `Rejected` carries the message that
 * was shown to the user.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Ignored,
    Cancelled,
    Rejected(String),
}
