use log::{error, info};
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub(crate) struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Waits for `run_for_millis` to elapse or, if unset, for Ctrl+C. Returns early if the
    /// token is cancelled from elsewhere.
    async fn listen_for_shutdown(&self, run_for_millis: Option<u64>) {
        tokio::select! {
            _ = self.token.cancelled() => return,
            _ = Self::wait_trigger(run_for_millis) => {}
        }
        self.token.cancel();
    }

    async fn wait_trigger(run_for_millis: Option<u64>) {
        match run_for_millis {
            Some(time_to_live_millis) => {
                tokio::time::sleep(Duration::from_millis(time_to_live_millis)).await;
                info!("Run time of {} ms elapsed. Stopping...", time_to_live_millis);
            }
            None => match signal::ctrl_c().await {
                Ok(()) => info!("Ctrl+C received. Sending stop signal..."),
                Err(e) => {
                    error!("Error while waiting for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            },
        }
    }
}

pub(crate) fn listen_for_shutdown(
    token: CancellationToken,
    run_for_millis: Option<u64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let shutdown_signal = ShutdownSignal::new(token);
        shutdown_signal.listen_for_shutdown(run_for_millis).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_shutdown_signal_with_timeout() {
        let token = CancellationToken::new();
        let handle = listen_for_shutdown(token.clone(), Some(200));

        let result = timeout(Duration::from_millis(300), token.cancelled()).await;
        assert!(result.is_ok(), "Shutdown signal was not received in time");

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_signal_cancelled_externally() {
        let token = CancellationToken::new();
        let handle = listen_for_shutdown(token.clone(), Some(10_000));

        token.cancel();
        let result = timeout(Duration::from_millis(100), handle).await;
        assert!(result.is_ok());
    }
}
