/*
 * A line-oriented host for the outline editor. It stands in for a graphical
 * front end: it reads commands, turns them into `AppEvent`s, answers the
 * logic's prompts from the same input stream, and executes the queued
 * `HostCommand`s by printing the outline and messages.
 *
 * Reader and writer are generic so the host can be driven by tests.
 */
use crate::app_logic::handler::OutlineAppLogic;
use crate::app_logic::input_provider::InputProviderOperations;
use crate::app_logic::types::{AppEvent, ClickTarget, HostCommand, MessageSeverity};
use crate::core::{EditorState, NodeId, OutlineNode};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

// Typing this at any prompt cancels it.
pub const CANCEL_TOKEN: &str = "/cancel";

pub const HELP_TEXT: &str = "\
Commands:
  add                 add a root node
  child               add a child to the selected node
  rename              rename the selected node
  content             edit the content of the selected node
  delete              delete the selected node and its children
  select <id>         select a node
  open <id>           expand or collapse a node
  show <id>           show or hide a node's content
  export              export the outline to a document
  import              replace the outline with a document
  list                print the outline
  help                print this text
  quit                leave
At a prompt, press Enter to accept the suggestion or type /cancel.";

/*
 * Draws the outline as an indented list. `[-]` marks an expanded node and
 * `[+]` a collapsed one; the selected node is prefixed with `>`. Content is
 * printed under a node only when its content is visible, and children only
 * when the node is expanded.
 */
pub fn render_outline(state: &EditorState) -> String {
    if state.nodes.is_empty() {
        return "(the outline is empty)\n".to_string();
    }
    let mut out = String::new();
    render_nodes(&state.nodes, state, 0, &mut out);
    out
}

fn render_nodes(nodes: &[OutlineNode], state: &EditorState, depth: usize, out: &mut String) {
    for node in nodes {
        let indent = "    ".repeat(depth);
        let is_open = state.open_nodes.contains(&node.id);
        let marker = if state.selected_node_id == Some(node.id) {
            '>'
        } else {
            ' '
        };
        let toggle = if is_open { "[-]" } else { "[+]" };
        out.push_str(&format!("{marker}{indent}{toggle} #{} {}\n", node.id, node.title));
        if node.content_visible {
            out.push_str(&format!(" {indent}      | {}\n", node.content));
        }
        if is_open {
            render_nodes(&node.children, state, depth + 1, out);
        }
    }
}

fn parse_id(argument: Option<&str>) -> Result<NodeId, String> {
    let text = argument.ok_or_else(|| "a node id is required".to_string())?;
    text.trim_start_matches('#')
        .parse::<NodeId>()
        .map_err(|_| format!("'{text}' is not a node id"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Event(AppEvent),
    List,
    Help,
}

pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    let command = match verb.to_lowercase().as_str() {
        "add" => ConsoleCommand::Event(AppEvent::AddRoot),
        "child" => ConsoleCommand::Event(AppEvent::AddChild),
        "rename" => ConsoleCommand::Event(AppEvent::Rename),
        "content" => ConsoleCommand::Event(AppEvent::EditContent),
        "delete" => ConsoleCommand::Event(AppEvent::Delete),
        "select" => ConsoleCommand::Event(AppEvent::Select(parse_id(argument)?)),
        "open" => ConsoleCommand::Event(AppEvent::NodeClicked {
            id: parse_id(argument)?,
            target: ClickTarget::Title,
        }),
        "show" => ConsoleCommand::Event(AppEvent::NodeClicked {
            id: parse_id(argument)?,
            target: ClickTarget::ContentToggle,
        }),
        "export" => ConsoleCommand::Event(AppEvent::Export),
        "import" => ConsoleCommand::Event(AppEvent::Import),
        "quit" | "exit" => ConsoleCommand::Event(AppEvent::Quit),
        "list" | "ls" => ConsoleCommand::List,
        "help" | "?" => ConsoleCommand::Help,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

pub struct ConsoleIo<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    selection_actions_enabled: bool,
}

impl<R: BufRead, W: Write> ConsoleIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        ConsoleIo {
            reader,
            writer,
            selection_actions_enabled: false,
        }
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn write_text(&mut self, text: &str) {
        if let Err(e) = self.writer.write_all(text.as_bytes()).and_then(|_| self.writer.flush()) {
            log::error!("ConsoleHost: Failed to write output: {e}");
        }
    }

    // `None` at end of input.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::error!("ConsoleHost: Failed to read input: {e}");
                None
            }
        }
    }

    fn ask(&mut self, prompt: &str, suggestion: &str) -> Option<String> {
        if suggestion.is_empty() {
            self.write_text(&format!("{prompt} "));
        } else {
            self.write_text(&format!("{prompt} [{suggestion}] "));
        }
        let answer = self.read_line()?;
        if answer.trim() == CANCEL_TOKEN {
            return None;
        }
        Some(answer)
    }

    fn execute(&mut self, command: HostCommand, state: &EditorState) -> bool {
        match command {
            HostCommand::RedrawTree => {
                let outline = render_outline(state);
                self.write_text(&outline);
            }
            HostCommand::SetSelectionActionsEnabled(enabled) => {
                self.selection_actions_enabled = enabled;
            }
            HostCommand::ShowMessage { severity, text } => {
                let label = match severity {
                    MessageSeverity::Information => "info",
                    MessageSeverity::Warning => "warning",
                    MessageSeverity::Error => "error",
                };
                self.write_text(&format!("[{label}] {text}\n"));
            }
            HostCommand::Quit => return false,
        }
        true
    }
}

impl<R: BufRead, W: Write> InputProviderOperations for ConsoleIo<R, W> {
    // An empty answer accepts the suggested title.
    fn request_title(&mut self, prompt: &str, default_title: &str) -> Option<String> {
        let answer = self.ask(prompt, default_title)?;
        if answer.is_empty() {
            Some(default_title.to_string())
        } else {
            Some(answer)
        }
    }

    fn request_content(&mut self, prompt: &str, current_content: &str) -> Option<String> {
        self.write_text(&format!("Current: {current_content}\n"));
        self.ask(prompt, "")
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        matches!(
            self.ask(&format!("{prompt} (y/n)"), "")
                .map(|answer| answer.trim().to_lowercase())
                .as_deref(),
            Some("y") | Some("yes")
        )
    }

    fn request_import_path(&mut self, prompt: &str, suggested: Option<&Path>) -> Option<PathBuf> {
        let suggestion = suggested
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let answer = self.ask(prompt, &suggestion)?;
        match (answer.trim(), suggested) {
            ("", Some(path)) => Some(path.to_path_buf()),
            ("", None) => None,
            (text, _) => Some(PathBuf::from(text)),
        }
    }

    fn request_export_path(&mut self, prompt: &str, suggested: &Path) -> Option<PathBuf> {
        let answer = self.ask(prompt, &suggested.display().to_string())?;
        match answer.trim() {
            "" => Some(suggested.to_path_buf()),
            text => Some(PathBuf::from(text)),
        }
    }
}

/*
 * Runs the command loop until `quit` or end of input. Returns once the logic
 * has queued `HostCommand::Quit` or the reader is exhausted.
 */
pub fn run_console<R: BufRead, W: Write>(
    logic: &mut OutlineAppLogic,
    io: &mut ConsoleIo<R, W>,
) -> io::Result<()> {
    if !drain_commands(logic, io) {
        return Ok(());
    }
    io.write_text("Type 'help' for a list of commands.\n");
    loop {
        io.write_text("outline> ");
        let Some(line) = io.read_line() else {
            io.write_text("\n");
            return Ok(());
        };
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Help)) => io.write_text(&format!("{HELP_TEXT}\n")),
            Ok(Some(ConsoleCommand::List)) => {
                let outline = render_outline(logic.state());
                io.write_text(&outline);
            }
            Ok(Some(ConsoleCommand::Event(event))) => {
                if needs_selection(&event) && !io.selection_actions_enabled {
                    io.write_text("Select a node first (select <id>).\n");
                    continue;
                }
                let outcome = logic.handle_event(event, io);
                log::debug!("ConsoleHost: Outcome {outcome:?}");
                if !drain_commands(logic, io) {
                    return Ok(());
                }
            }
            Err(message) => io.write_text(&format!("{message}\n")),
        }
    }
}

fn needs_selection(event: &AppEvent) -> bool {
    matches!(
        event,
        AppEvent::AddChild | AppEvent::Rename | AppEvent::EditContent | AppEvent::Delete
    )
}

// Returns false once a quit command was executed.
fn drain_commands<R: BufRead, W: Write>(
    logic: &mut OutlineAppLogic,
    io: &mut ConsoleIo<R, W>,
) -> bool {
    while let Some(command) = logic.try_dequeue_command() {
        if !io.execute(command, logic.state()) {
            return false;
        }
    }
    true
}
