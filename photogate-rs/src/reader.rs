// Serial read loop shared by the production and simulated adapters.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use common::RawTrigger;
use publisher::{Publishable, Publisher};

use crate::helpers;
use crate::models::connection::ConnectionState;

/// Reads newline-delimited trigger lines until `connection` is cleared.
///
/// Every read is bounded by `read_timeout`, so the loop notices a cleared flag within one
/// timeout interval. Decoded triggers are published synchronously, in the order they were
/// read. Malformed lines are dropped and read errors are logged; neither stops the loop.
///
/// Returns the number of triggers published.
pub(crate) async fn read_triggers<R>(
    reader: R,
    connection: &ConnectionState,
    publisher: Option<&Publisher<RawTrigger>>,
    read_timeout: Duration,
) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.split(b'\n');
    let mut n_triggers = 0;

    while connection.is_connected() {
        match tokio::time::timeout(read_timeout, lines.next_segment()).await {
            // Nothing arrived, check the flag again
            Err(_) => continue,
            Ok(Ok(Some(line))) => {
                let Some(trigger) = helpers::decode_line(&line) else {
                    continue;
                };
                n_triggers += 1;
                debug!("Trigger {}", trigger);
                if let Some(publisher) = publisher {
                    publisher.notify_listeners(Arc::new(trigger));
                }
            }
            Ok(Ok(None)) => {
                warn!("Device stream reached end of file");
                tokio::time::sleep(read_timeout).await;
            }
            Ok(Err(e)) => {
                warn!("Error reading from device: {}", e);
                tokio::time::sleep(read_timeout).await;
            }
        }
    }
    debug!("Reader stopped after {} triggers", n_triggers);
    n_triggers
}

#[cfg(test)]
mod tests {
    use super::*;
    use publisher::Listener;
    use std::sync::Mutex;
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio::time::{timeout, Instant};
    use uuid::Uuid;

    const TEST_READ_TIMEOUT: Duration = Duration::from_millis(50);

    fn collecting_publisher() -> (Publisher<RawTrigger>, Arc<Mutex<Vec<RawTrigger>>>) {
        let publisher = Publisher::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut listener = Listener::new({
            let received = received.clone();
            move |_id: Uuid, trigger: Arc<RawTrigger>| received.lock().unwrap().push(*trigger)
        });
        publisher.register_listener(&mut listener);
        (publisher, received)
    }

    #[tokio::test]
    async fn test_reads_triggers_in_order_and_drops_malformed_lines() {
        let (device, host) = tokio::io::duplex(256);
        let connection = ConnectionState::connected();
        let (publisher, received) = collecting_publisher();

        let reader_connection = connection.clone();
        let reader = tokio::spawn(async move {
            read_triggers(
                BufReader::new(host),
                &reader_connection,
                Some(&publisher),
                TEST_READ_TIMEOUT,
            )
            .await
        });

        let mut device = device;
        device
            .write_all(b"1000000\r\n12a4\r\n1142857\r\n\r\n1202030\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        connection.disconnect();

        let n_triggers = reader.await.unwrap();
        assert_eq!(n_triggers, 3);
        assert_eq!(
            *received.lock().unwrap(),
            vec![
                RawTrigger::new(1_000_000),
                RawTrigger::new(1_142_857),
                RawTrigger::new(1_202_030)
            ]
        );
    }

    #[tokio::test]
    async fn test_line_split_across_writes() {
        let (mut device, host) = tokio::io::duplex(256);
        let connection = ConnectionState::connected();
        let (publisher, received) = collecting_publisher();

        let reader_connection = connection.clone();
        let reader = tokio::spawn(async move {
            read_triggers(
                BufReader::new(host),
                &reader_connection,
                Some(&publisher),
                TEST_READ_TIMEOUT,
            )
            .await
        });

        device.write_all(b"1234").await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        device.write_all(b"567\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        connection.disconnect();

        reader.await.unwrap();
        assert_eq!(*received.lock().unwrap(), vec![RawTrigger::new(1_234_567)]);
    }

    #[tokio::test]
    async fn test_exits_within_one_read_timeout_when_disconnected() {
        let (_device, host) = tokio::io::duplex(64);
        let connection = ConnectionState::connected();

        let reader_connection = connection.clone();
        let reader = tokio::spawn(async move {
            read_triggers(BufReader::new(host), &reader_connection, None, TEST_READ_TIMEOUT).await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        let disconnected_at = Instant::now();
        connection.disconnect();

        let result = timeout(Duration::from_millis(500), reader).await;
        assert!(result.is_ok(), "reader did not observe the cleared flag");
        assert!(disconnected_at.elapsed() < TEST_READ_TIMEOUT * 3);
    }

    #[tokio::test]
    async fn test_survives_device_hang_up() {
        let (device, host) = tokio::io::duplex(64);
        let connection = ConnectionState::connected();

        let reader_connection = connection.clone();
        let reader = tokio::spawn(async move {
            read_triggers(BufReader::new(host), &reader_connection, None, TEST_READ_TIMEOUT).await
        });

        drop(device);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!reader.is_finished());

        connection.disconnect();
        let n_triggers = timeout(Duration::from_millis(500), reader)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(n_triggers, 0);
    }

    #[tokio::test]
    async fn test_not_started_when_disconnected() {
        let connection = ConnectionState::new();
        let n_triggers = read_triggers(
            BufReader::new(&b"1000\n2000\n"[..]),
            &connection,
            None,
            TEST_READ_TIMEOUT,
        )
        .await;
        assert_eq!(n_triggers, 0);
    }
}
