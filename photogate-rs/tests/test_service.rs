use common::{RawTrigger, TriggerSource};
use photogate_rs::{run_mock_service, DropProfile, MockConfig};
use publisher::Listener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Listeners are attached after the rig starts, the scaled pause leaves time for that
fn fast_config() -> MockConfig {
    MockConfig {
        pause_between_drops: Duration::from_millis(1_000),
        time_scale: 20.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_receive_drop_triggers() {
    let received: Arc<Mutex<Vec<RawTrigger>>> = Arc::new(Mutex::new(Vec::new()));
    let config = fast_config();
    let n_gates = config.profile.n_gates;
    let first_trigger = RawTrigger::new(config.device_epoch_micros);

    // Start simulated rig
    let (handle, photogate) = run_mock_service("Test", config, Some(1_000)).unwrap();

    // create listener handler
    let mut listener = {
        let received = received.clone();
        Listener::new(move |_id, trigger: Arc<RawTrigger>| {
            received.lock().unwrap().push(*trigger);
        })
    };

    // install handler
    photogate.register_listener(&mut listener);

    handle.await.unwrap();

    // check that triggers were received in order
    let buffer = received.lock().unwrap();
    assert_eq!(buffer.len(), n_gates);
    assert_eq!(buffer[0], first_trigger);
    assert!(buffer.windows(2).all(|w| w[1] > w[0]));
}

#[tokio::test]
async fn test_release_command_starts_drop() {
    let received: Arc<Mutex<Vec<RawTrigger>>> = Arc::new(Mutex::new(Vec::new()));
    let config = MockConfig {
        auto_release: false,
        inject_malformed: true,
        profile: DropProfile {
            n_gates: 5,
            ..Default::default()
        },
        ..fast_config()
    };

    let (handle, photogate) = run_mock_service("Test", config, None).unwrap();
    let mut listener = {
        let received = received.clone();
        Listener::new(move |_id, trigger: Arc<RawTrigger>| {
            received.lock().unwrap().push(*trigger);
        })
    };
    photogate.register_listener(&mut listener);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(received.lock().unwrap().is_empty());

    photogate.release().await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    photogate.disconnect().await;
    handle.await.unwrap();

    assert_eq!(received.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn test_unregistered_listener_receives_nothing() {
    let received: Arc<Mutex<Vec<RawTrigger>>> = Arc::new(Mutex::new(Vec::new()));
    let (handle, photogate) = run_mock_service("Test", fast_config(), Some(500)).unwrap();

    let mut listener = {
        let received = received.clone();
        Listener::new(move |_id, trigger: Arc<RawTrigger>| {
            received.lock().unwrap().push(*trigger);
        })
    };
    let id = photogate.register_listener(&mut listener);
    photogate.unregister_listener(id);

    handle.await.unwrap();
    assert!(received.lock().unwrap().is_empty());
}
