//! WebSocket stream of task change events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::auth::MaybeUser;
use crate::notifications::TaskEvent;
use crate::AppState;

/// GET /events/tasks - subscribe to task change events.
///
/// The stream is open to anonymous clients; a bearer token, when present, is
/// only used to label the subscription in the logs.
#[tracing::instrument(skip_all)]
pub async fn task_events(ws: WebSocketUpgrade, State(state): State<AppState>, MaybeUser(user): MaybeUser) -> impl IntoResponse {
    match &user {
        Some(user) => info!(email = %user.email, "Task event subscriber connected"),
        None => info!("Anonymous task event subscriber connected"),
    }

    let receiver = state.task_events.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, receiver))
}

async fn stream_events(mut socket: WebSocket, mut receiver: broadcast::Receiver<TaskEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(error) => {
                        warn!(%error, "Failed to serialize task event");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    debug!("Task event subscriber disconnected");
                    break;
                }
            }
            // A slow subscriber skips the events it missed and carries on
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "Task event subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::notifications::{TaskEvent, TaskEventKind};
    use crate::test_utils::{build_test_app_http, create_project, register_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_task_create_reaches_websocket_subscriber(pool: PgPool) {
        let server = build_test_app_http(pool);
        let (token, user_id) = register_user(&server, "alice").await;
        let project = create_project(&server, &token, user_id, "Board").await;

        let mut socket = server.get_websocket("/api/v1/events/tasks").await.into_websocket().await;

        let response = server
            .post("/api/v1/tasks")
            .authorization_bearer(&token)
            .json(&json!({"title": "announce me", "project_id": project.id}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let event: TaskEvent = socket.receive_json().await;
        assert_eq!(event.event, TaskEventKind::TaskCreated);
    }
}
