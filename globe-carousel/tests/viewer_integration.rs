mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{RecordingDriver, ScriptedSdk, SingleDriverFactory, API_KEY};
use globe_carousel::catalog::Region;
use globe_carousel::config::ViewerConfig;
use globe_carousel::cycling::CyclingPhase;
use globe_carousel::loader::{LoaderConfig, MapErrorKind, MapLoader, RetryPolicy};
use globe_carousel::{MapViewer, ViewerError};

fn config_from_ini(text: &str) -> ViewerConfig {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.ini");
    std::fs::write(&path, text).unwrap();
    ViewerConfig::load_from(&path).unwrap()
}

fn loader_for(config: &ViewerConfig, sdk: Arc<ScriptedSdk>) -> MapLoader {
    MapLoader::new(config.loader.clone(), sdk)
}

#[tokio::test(start_paused = true)]
async fn viewer_cycles_region_from_config_file() {
    let config = config_from_ini(&format!(
        "[cycling]\ninterval_ms = 1000\nidle_timeout_ms = 3000\nregion = oceania\n\n\
         [map]\napi_key = {}\nretry_base_delay_ms = 50\n",
        API_KEY
    ));
    assert_eq!(config.cycling.region, Some(Region::Oceania));

    let driver = RecordingDriver::new();
    let factory = SingleDriverFactory(Arc::clone(&driver));
    let viewer = MapViewer::start(&config, loader_for(&config, ScriptedSdk::new(&[])), &factory)
        .await
        .unwrap();

    assert_eq!(viewer.controller().phase(), CyclingPhase::Running);
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let shown = viewer.controller().state().current_location.unwrap();
    assert!(shown.code == "AU" || shown.code == "NZ", "{}", shown.code);
    assert_eq!(driver.pan_count(), 4);

    viewer.shutdown();
    assert_eq!(driver.element.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn interaction_pauses_until_idle_timeout() {
    let config = config_from_ini(&format!(
        "[cycling]\ninterval_ms = 1000\nidle_timeout_ms = 3000\n\n[map]\napi_key = {}\n",
        API_KEY
    ));
    let driver = RecordingDriver::new();
    let factory = SingleDriverFactory(Arc::clone(&driver));
    let viewer = MapViewer::start(&config, loader_for(&config, ScriptedSdk::new(&[])), &factory)
        .await
        .unwrap();
    let controller = viewer.controller();

    driver.element.press();
    assert_eq!(controller.phase(), CyclingPhase::RunningPaused);

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert_eq!(driver.pan_count(), 1);

    tokio::time::sleep(Duration::from_millis(1150)).await;
    assert_eq!(controller.phase(), CyclingPhase::Running);
    assert_eq!(driver.pan_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn surrounding_ui_can_hold_cycling() {
    let config = config_from_ini(&format!(
        "[cycling]\ninterval_ms = 1000\nauto_start = false\n\n[map]\napi_key = {}\n",
        API_KEY
    ));
    let driver = RecordingDriver::new();
    let factory = SingleDriverFactory(Arc::clone(&driver));
    let viewer = MapViewer::start(&config, loader_for(&config, ScriptedSdk::new(&[])), &factory)
        .await
        .unwrap();
    let controller = viewer.controller();
    assert_eq!(controller.phase(), CyclingPhase::Stopped);
    assert_eq!(driver.pan_count(), 0);

    controller.start();
    controller.set_timeout_prevented(true);
    driver.element.press();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(controller.phase(), CyclingPhase::RunningPaused);
    assert_eq!(driver.pan_count(), 1);

    controller.set_timeout_prevented(false);
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(controller.phase(), CyclingPhase::Running);
    assert_eq!(driver.pan_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn zoom_follows_pan_after_delay() {
    let config = config_from_ini(&format!("[map]\napi_key = {}\n", API_KEY));
    let driver = RecordingDriver::new();
    let factory = SingleDriverFactory(Arc::clone(&driver));
    let viewer = MapViewer::start(&config, loader_for(&config, ScriptedSdk::new(&[])), &factory)
        .await
        .unwrap();

    let target = viewer.controller().state().current_location.unwrap();
    assert_eq!(driver.pan_count(), 1);
    assert!(driver.zooms.lock().is_empty());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(driver.zooms.lock().as_slice(), &[target.zoom]);
}

#[tokio::test(start_paused = true)]
async fn retries_transient_failures_then_starts() {
    let config = ViewerConfig {
        loader: LoaderConfig::default()
            .with_api_key(API_KEY)
            .with_retry(RetryPolicy::linear(3, Duration::from_millis(100))),
        ..ViewerConfig::default()
    };
    let sdk = ScriptedSdk::new(&["network request failed", "script load error"]);
    let driver = RecordingDriver::new();
    let factory = SingleDriverFactory(Arc::clone(&driver));

    let viewer = MapViewer::start(&config, loader_for(&config, Arc::clone(&sdk)), &factory)
        .await
        .unwrap();
    assert_eq!(sdk.acquisitions.load(Ordering::SeqCst), 3);
    assert!(viewer.loader().is_loaded());
}

#[tokio::test(start_paused = true)]
async fn invalid_key_fails_without_acquisition() {
    let config = ViewerConfig {
        loader: LoaderConfig::default().with_api_key("short"),
        ..ViewerConfig::default()
    };
    let sdk = ScriptedSdk::new(&[]);
    let driver = RecordingDriver::new();
    let factory = SingleDriverFactory(Arc::clone(&driver));

    let err = MapViewer::start(&config, loader_for(&config, Arc::clone(&sdk)), &factory)
        .await
        .unwrap_err();
    match err {
        ViewerError::Load(e) => {
            assert_eq!(e.kind, MapErrorKind::CredentialInvalid);
            assert!(!e.retryable);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(sdk.acquisitions.load(Ordering::SeqCst), 0);
    assert_eq!(driver.pan_count(), 0);
}
