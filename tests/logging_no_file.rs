use std::{thread::sleep, time::Duration};

use tempfile::tempdir;

#[test]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gestures.log");

    gesture_engine::logging::init(false, None);
    tracing::info!("test");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
}
