//! Broadcast hub for task change notifications.
//!
//! Task mutations publish an event naming the kind of change and the task id.
//! Publishing is best-effort: with no subscribers the event is dropped, and a
//! mutation never fails because of the hub.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::types::TaskId;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TaskEventKind {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskEvent {
    pub event: TaskEventKind,
    pub task_id: TaskId,
}

#[derive(Debug, Clone)]
pub struct TaskEvents {
    sender: broadcast::Sender<TaskEvent>,
}

impl TaskEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event to whoever is listening. The send result is ignored:
    /// no subscribers is the normal quiet state, not an error.
    pub fn publish(&self, event: TaskEventKind, task_id: TaskId) {
        let _ = self.sender.send(TaskEvent { event, task_id });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }
}

impl Default for TaskEvents {
    fn default() -> Self {
        Self::new()
    }
}
