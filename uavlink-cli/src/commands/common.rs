//! Task joining shared by the long-running commands.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::CliError;

/// How long a task may take to wind down after shutdown is requested.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Wait for `handle` to finish on its own, or for `cancellation` followed by
/// at most `grace` for the task to stop.
///
/// Returns `None` if the task overran the grace period; it is aborted.
pub async fn join_task<T>(
    name: &'static str,
    mut handle: JoinHandle<T>,
    cancellation: &CancellationToken,
    grace: Duration,
) -> Result<Option<T>, CliError> {
    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = cancellation.cancelled() => {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(task = name, grace_secs = grace.as_secs(), "Task did not stop in time");
                    handle.abort();
                    return Ok(None);
                }
            }
        }
    };

    joined.map(Some).map_err(|e| CliError::Task {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_finished_task() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(async { 7 });
        let result = join_task("test", handle, &cancel, SHUTDOWN_GRACE)
            .await
            .unwrap();
        assert_eq!(result, Some(7));
    }

    #[tokio::test]
    async fn test_join_after_cancel() {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            task_cancel.cancelled().await;
            "stopped"
        });
        cancel.cancel();
        let result = join_task("test", handle, &cancel, SHUTDOWN_GRACE)
            .await
            .unwrap();
        assert_eq!(result, Some("stopped"));
    }

    #[tokio::test]
    async fn test_stuck_task_is_abandoned_after_grace() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        cancel.cancel();
        let result = join_task("test", handle, &cancel, Duration::from_millis(50))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_panicked_task_is_reported() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(async {
            panic!("boom");
        });
        let err = join_task::<()>("test", handle, &cancel, SHUTDOWN_GRACE)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Task { name: "test", .. }));
    }
}
