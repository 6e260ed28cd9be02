//! Handle to the editor host's extension API.
//!
//! The bootstrap never calls these methods itself; it only binds the handle
//! so the interpreter module receives it through
//! [`crate::ActivationGlobals`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A folder open in the host workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFolder {
    /// Display name of the folder.
    pub name: String,
    /// Folder URI as reported by the host.
    pub uri: String,
}

/// Options for an input prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBoxOptions {
    /// Text shown above the input field.
    pub prompt: Option<String>,
    /// Initial value of the field.
    pub value: Option<String>,
    /// Hides the typed characters.
    pub password: bool,
}

/// Host API surface exposed to interpreter scripts.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Shows an information notification and resolves to the chosen item.
    async fn show_information_message(&self, message: &str, items: &[String]) -> Option<String>;

    /// Prompts for text input; `None` when the prompt is dismissed.
    async fn show_input_box(&self, options: InputBoxOptions) -> Option<String>;

    /// Folders currently open in the workspace.
    fn workspace_folders(&self) -> Vec<WorkspaceFolder>;
}
