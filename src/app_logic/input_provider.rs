/*
 * Defines how the application logic asks the user for text, paths and
 * confirmations. The host supplies the implementation (a console prompt, a
 * dialog, a test script). Every method reports a cancelled prompt as `None`
 * or `false`, and the logic treats that as "do nothing at all".
 */
use std::path::{Path, PathBuf};

pub trait InputProviderOperations {
    /*
     * Asks for a node title, pre-filled with `default_title`. The returned text
     * is not validated here; blank titles are handled by the caller.
     */
    fn request_title(&mut self, prompt: &str, default_title: &str) -> Option<String>;

    // Content may legitimately come back as an empty string.
    fn request_content(&mut self, prompt: &str, current_content: &str) -> Option<String>;

    fn confirm(&mut self, prompt: &str) -> bool;

    fn request_import_path(&mut self, prompt: &str, suggested: Option<&Path>) -> Option<PathBuf>;

    fn request_export_path(&mut self, prompt: &str, suggested: &Path) -> Option<PathBuf>;
}
