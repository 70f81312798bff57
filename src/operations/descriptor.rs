//! Operation descriptors

use serde::{Deserialize, Serialize};

/// Title keywords that mark an operation as destructive
pub const DESTRUCTIVE_KEYWORDS: [&str; 3] = ["delete", "remove", "destroy"];

/// Payload sent to the task-execution endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Backend task file, e.g. `tasks/get_mce_component_status.yml`
    #[serde(rename = "task_file")]
    pub task_id: String,
    pub description: String,
}

impl TaskRequest {
    pub fn new(task_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            description: description.into(),
        }
    }
}

/// A user-triggerable operation
///
/// Identity is `id`: two descriptors with the same id are the same logical
/// action for history and loading-state purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredOperation")]
pub struct Operation {
    pub id: String,
    pub title: String,
    pub task: TaskRequest,
    destructive: bool,
}

/// Persisted shape of an [`Operation`]; any stored `destructive` flag is
/// ignored and recomputed from the title.
#[derive(Deserialize)]
struct StoredOperation {
    id: String,
    title: String,
    task: TaskRequest,
}

impl From<StoredOperation> for Operation {
    fn from(stored: StoredOperation) -> Self {
        Operation::new(stored.id, stored.title, stored.task)
    }
}

impl Operation {
    pub fn new(id: impl Into<String>, title: impl Into<String>, task: TaskRequest) -> Self {
        let title = title.into();
        let destructive = is_destructive_title(&title);
        Self {
            id: id.into(),
            title,
            task,
            destructive,
        }
    }

    /// Operation whose task description is its title
    pub fn for_task(id: impl Into<String>, title: impl Into<String>, task_id: impl Into<String>) -> Self {
        let title = title.into();
        let task = TaskRequest::new(task_id, title.clone());
        Self::new(id, title, task)
    }

    pub fn is_destructive(&self) -> bool {
        self.destructive
    }
}

/// Case-insensitive keyword match against [`DESTRUCTIVE_KEYWORDS`]
pub fn is_destructive_title(title: &str) -> bool {
    let title = title.to_lowercase();
    DESTRUCTIVE_KEYWORDS.iter().any(|k| title.contains(k))
}
