use serde_json::Value;
use tokio::task::JoinHandle;

/// echo
///
/// Placeholder background job: logs the payload it was given and acknowledges.
pub async fn echo(data: Value) -> bool {
    tracing::info!(target: "tasks", payload = %data, "echo task received payload");
    true
}

/// Runs [`echo`] on the runtime without waiting for it. The handle can be awaited
/// for the acknowledgement or dropped.
pub fn spawn_echo(data: Value) -> JoinHandle<bool> {
    tokio::spawn(echo(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn echo_acknowledges() {
        assert!(echo(json!({ "job": 1 })).await);
    }

    #[tokio::test]
    async fn spawned_echo_completes() {
        let handle = spawn_echo(json!("payload"));
        assert!(handle.await.unwrap());
    }
}
