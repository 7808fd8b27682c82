use log::{error, info};
use tokio::signal;

use super::connection::ConnectionState;

const SHUTDOWN_PERIOD_MS: u64 = 100;
const MAX_RETRIES: u64 = 10;

pub(crate) struct ShutdownSignal {
    connection: ConnectionState,
}

impl ShutdownSignal {
    fn new(connection: ConnectionState) -> Self {
        Self { connection }
    }

    async fn listen_for_shutdown(&self, run_for_millis: Option<u64>) {
        if let Some(time_to_live_millis) = run_for_millis {
            tokio::time::sleep(std::time::Duration::from_millis(time_to_live_millis)).await;
        } else {
            let mut retries = 0;
            loop {
                match signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Ctrl+C received. Closing connection...");
                        break;
                    }
                    Err(e) => {
                        error!("Error while waiting for Ctrl+C: {}", e);
                        retries += 1;
                        if retries >= MAX_RETRIES {
                            info!("Maximum retries reached, giving up on shutdown signal");
                            return;
                        }
                        tokio::time::sleep(std::time::Duration::from_millis(SHUTDOWN_PERIOD_MS))
                            .await;
                    }
                }
            }
        }
        self.connection.disconnect();
    }
}

/// Clears `connection` after `run_for_millis`, or on Ctrl+C when no run time is given.
pub fn listen_for_shutdown(
    connection: ConnectionState,
    run_for_millis: Option<u64>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let shutdown_signal = ShutdownSignal::new(connection);
        shutdown_signal.listen_for_shutdown(run_for_millis).await;
    })
}
