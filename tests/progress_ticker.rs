use ecoscan::acquire;
use ecoscan::config::{Config, Progress};
use ecoscan::model::DeviceAnalysis;
use ecoscan::progress::spawn_ticker;
use ecoscan::session::{Phase, SessionHandle};
use std::time::Duration;

fn fast() -> Progress {
    Progress {
        tick_ms: 10,
        step_percent: 30,
        cap_percent: 95,
    }
}

fn uploading_session() -> SessionHandle {
    let cfg = Config::default();
    let session = SessionHandle::new();
    let generation = session.generation();
    let preview =
        acquire::preview_from_bytes(&cfg, "device.png", acquire::SAMPLE_IMAGE.to_vec()).unwrap();
    session.select_preview(generation, preview).unwrap();
    session.begin_upload(generation).unwrap();
    session
}

#[tokio::test]
async fn estimate_advances_monotonically_and_caps_below_100() {
    let session = uploading_session();
    spawn_ticker(session.clone(), session.generation(), fast());

    tokio::time::sleep(Duration::from_millis(60)).await;
    let early = session.snapshot().progress;
    assert!(early > 0, "estimate never advanced");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let late = session.snapshot().progress;
    assert!(late >= early);
    assert_eq!(late, 95, "estimate must stop at the cap");
}

#[tokio::test]
async fn reset_mid_upload_stops_the_ticker_for_good() {
    let session = uploading_session();
    spawn_ticker(session.clone(), session.generation(), fast());

    tokio::time::sleep(Duration::from_millis(40)).await;
    session.reset();
    assert_eq!(session.snapshot().progress, 0);

    // However long we wait, the old timer never touches the new session.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let snap = session.snapshot();
    assert_eq!(snap.phase, Phase::Idle);
    assert_eq!(snap.progress, 0);
    assert_eq!(snap.history, vec![Phase::Idle]);
}

#[tokio::test]
async fn completion_jumps_to_100_and_releases_the_ticker() {
    let session = uploading_session();
    let generation = session.generation();
    spawn_ticker(session.clone(), generation, fast());

    session
        .mark_uploaded(generation, "https://cdn.example/device.png".into())
        .unwrap();
    session
        .mark_complete(generation, DeviceAnalysis::default())
        .unwrap();
    assert_eq!(session.snapshot().progress, 100);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.snapshot().progress, 100);
}

#[tokio::test]
async fn cap_is_always_below_100() {
    let session = uploading_session();
    let over = Progress {
        tick_ms: 5,
        step_percent: 60,
        cap_percent: 100,
    };
    spawn_ticker(session.clone(), session.generation(), over);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(session.snapshot().progress, 99);
}
