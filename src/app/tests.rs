use super::*;
use crate::config::{LinecountConfig, SinkKind, SourceKind};
use crate::display::{Display, NullSink, OverlayRenderer};
use crate::frame::FrameData;
use crate::input::{InputQueue, VirtualEvent};
use crate::params::{ParameterStore, COUNTING_LINE, MULTIPLIER};
use crate::source::{FrameSource, SyntheticSource};
use image::RgbImage;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn blank() -> RgbImage {
    SyntheticSource::blank_frame(WIDTH, HEIGHT)
}

fn with_boxes(boxes: &[(u32, u32, u32, u32)]) -> RgbImage {
    SyntheticSource::frame_with_boxes(WIDTH, HEIGHT, boxes)
}

/// Frame loop over scripted frames with the counting line at row 100
fn scripted_loop(dir: &TempDir, frames: Vec<RgbImage>) -> FrameLoop {
    let mut store = ParameterStore::with_defaults();
    store.set(COUNTING_LINE, 100.0).unwrap();

    let session = Session::new(store, dir.path().join("params.json"), Duration::from_millis(1200));
    let display = Display::new(
        OverlayRenderer::without_font((WIDTH, HEIGHT)),
        Box::new(NullSink),
    );
    FrameLoop::new(
        Box::new(SyntheticSource::scripted(WIDTH, HEIGHT, frames)),
        display,
        InputQueue::new(),
        session,
    )
}

fn run_all(frame_loop: &mut FrameLoop) -> ShutdownReason {
    frame_loop.run(&CancellationToken::new())
}

#[test]
fn test_identical_frames_never_count() {
    let dir = TempDir::new().unwrap();
    let frame = with_boxes(&[(100, 150, 20, 20)]);
    let mut frame_loop = scripted_loop(&dir, vec![frame.clone(), frame.clone(), frame]);

    assert_eq!(run_all(&mut frame_loop), ShutdownReason::EndOfStream);
    assert_eq!(frame_loop.session().count(), 0);
    assert_eq!(frame_loop.frames_processed(), 2);
}

#[test]
fn test_single_crossing_counted_once() {
    let dir = TempDir::new().unwrap();
    let crossed = with_boxes(&[(100, 150, 20, 20)]);
    let mut frame_loop = scripted_loop(
        &dir,
        vec![blank(), crossed.clone(), crossed.clone(), crossed],
    );

    assert_eq!(run_all(&mut frame_loop), ShutdownReason::EndOfStream);
    assert_eq!(frame_loop.session().count(), 1);
}

#[test]
fn test_region_above_line_not_counted() {
    let dir = TempDir::new().unwrap();
    let mut frame_loop = scripted_loop(&dir, vec![blank(), with_boxes(&[(100, 10, 20, 20)])]);

    run_all(&mut frame_loop);
    assert_eq!(frame_loop.session().count(), 0);
}

#[test]
fn test_distant_regions_both_count() {
    let dir = TempDir::new().unwrap();
    let mut frame_loop = scripted_loop(
        &dir,
        vec![blank(), with_boxes(&[(20, 150, 20, 20), (250, 150, 20, 20)])],
    );

    run_all(&mut frame_loop);
    assert_eq!(frame_loop.session().count(), 2);
}

#[test]
fn test_nearby_region_next_frame_is_duplicate() {
    let dir = TempDir::new().unwrap();
    // Second object appears one frame later, 20 px to the right of the first
    let mut frame_loop = scripted_loop(
        &dir,
        vec![
            blank(),
            with_boxes(&[(100, 150, 20, 20)]),
            with_boxes(&[(100, 150, 20, 20), (120, 200, 20, 20)]),
        ],
    );

    run_all(&mut frame_loop);
    assert_eq!(frame_loop.session().count(), 1);
}

#[test]
fn test_reset_event_zeroes_counter() {
    let dir = TempDir::new().unwrap();
    let crossed = with_boxes(&[(100, 150, 20, 20)]);
    let mut frame_loop = scripted_loop(&dir, vec![blank(), crossed.clone(), crossed]);
    let sender = frame_loop.input_sender();

    frame_loop.prime().unwrap();
    sender.push(VirtualEvent::ToggleEdit);
    sender.push(VirtualEvent::Reset);
    assert_eq!(frame_loop.iterate().unwrap(), LoopControl::Continue);

    // Counted during the iteration, then reset while draining input
    assert_eq!(frame_loop.session().count(), 0);
    assert!(frame_loop.session().panel_state().editing);
}

#[test]
fn test_quit_event_ends_loop() {
    let dir = TempDir::new().unwrap();
    let mut frame_loop = scripted_loop(&dir, vec![blank(), blank(), blank(), blank()]);
    frame_loop.input_sender().push(VirtualEvent::Quit);

    assert_eq!(run_all(&mut frame_loop), ShutdownReason::UserRequest);
    assert_eq!(frame_loop.frames_processed(), 1);
}

#[test]
fn test_cancellation_ends_loop() {
    let dir = TempDir::new().unwrap();
    let mut frame_loop = scripted_loop(&dir, vec![blank(), blank(), blank()]);
    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(frame_loop.run(&token), ShutdownReason::Cancelled);
    assert_eq!(frame_loop.frames_processed(), 0);
}

#[test]
fn test_empty_source_ends_during_prime() {
    let dir = TempDir::new().unwrap();
    let mut frame_loop = scripted_loop(&dir, Vec::new());
    assert_eq!(run_all(&mut frame_loop), ShutdownReason::EndOfStream);
}

#[test]
fn test_edits_apply_from_next_iteration() {
    let dir = TempDir::new().unwrap();
    let mut frame_loop = scripted_loop(&dir, vec![blank(), blank(), blank()]);
    let sender = frame_loop.input_sender();

    frame_loop.prime().unwrap();
    for event in [
        VirtualEvent::NavDown,
        VirtualEvent::ToggleEdit,
        VirtualEvent::NavDown,
    ] {
        sender.push(event);
    }
    frame_loop.iterate().unwrap();

    let thresholds = frame_loop.session().thresholds().unwrap();
    assert!((thresholds.multiplier - 1.4).abs() < 1e-9);
    assert!(
        (frame_loop.session().store().get_f64(MULTIPLIER).unwrap() - 1.4).abs() < 1e-9
    );
}

#[test]
fn test_save_event_writes_document() {
    let dir = TempDir::new().unwrap();
    let mut frame_loop = scripted_loop(&dir, vec![blank(), blank()]);
    frame_loop.input_sender().push(VirtualEvent::Save);

    frame_loop.prime().unwrap();
    frame_loop.iterate().unwrap();

    let saved = std::fs::read_to_string(dir.path().join("params.json")).unwrap();
    assert!(saved.contains("\"countingline\": 100"));
}

fn headless_config(dir: &TempDir) -> LinecountConfig {
    let mut config = LinecountConfig::default();
    config.source.kind = SourceKind::Synthetic;
    config.source.resolution = (160, 120);
    config.source.fps = 60;
    config.display.sink = SinkKind::None;
    config.input.keyboard = false;
    config.input.buttons = false;
    config.params.path = dir.path().join("params.json").display().to_string();
    config
}

#[tokio::test]
async fn test_orchestrator_lifecycle() {
    let dir = TempDir::new().unwrap();
    let mut orchestrator = LinecountOrchestrator::new(headless_config(&dir)).unwrap();

    orchestrator.initialize().await.unwrap();
    let states = orchestrator.component_states().await;
    assert_eq!(states.get("frame_loop"), Some(&ComponentState::Stopped));
    assert!(!states.contains_key("input"));

    orchestrator.start().await.unwrap();

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        token.cancel();
    });

    let exit_code = orchestrator.run().await.unwrap();
    assert_eq!(exit_code, 0);
    assert!(orchestrator.final_count().is_some());
    assert_eq!(
        orchestrator.component_state("frame_loop").await,
        Some(ComponentState::Stopped)
    );

    // The loop is consumed by the first run
    assert!(orchestrator.run().await.is_err());
}

/// Source whose frames run out in a panic instead of an error
struct PanickingSource;

impl FrameSource for PanickingSource {
    fn resolution(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn next_frame(&mut self) -> crate::error::Result<FrameData> {
        panic!("camera driver fault");
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

#[tokio::test]
async fn test_panicked_loop_still_releases_inputs() {
    let dir = TempDir::new().unwrap();
    let mut config = headless_config(&dir);
    config.input.buttons = true;
    config.input.button_device = dir.path().join("missing-event0").display().to_string();

    let mut orchestrator = LinecountOrchestrator::new(config).unwrap();
    let session = Session::new(
        ParameterStore::with_defaults(),
        dir.path().join("params.json"),
        Duration::from_millis(1200),
    );
    orchestrator.frame_loop = Some(FrameLoop::new(
        Box::new(PanickingSource),
        Display::new(OverlayRenderer::without_font((WIDTH, HEIGHT)), Box::new(NullSink)),
        InputQueue::new(),
        session,
    ));

    orchestrator.initialize().await.unwrap();
    orchestrator.start().await.unwrap();
    assert_eq!(
        orchestrator.component_state("input").await,
        Some(ComponentState::Running)
    );

    let exit_code = orchestrator.run().await.unwrap();
    assert_eq!(exit_code, 1);
    assert!(orchestrator.cancellation_token().is_cancelled());
    assert_eq!(
        orchestrator.component_state("input").await,
        Some(ComponentState::Stopped)
    );
    assert_eq!(
        orchestrator.component_state("frame_loop").await,
        Some(ComponentState::Failed)
    );
    assert_eq!(orchestrator.final_count(), None);
}

#[tokio::test]
async fn test_orchestrator_autoloads_params() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("params.json"), r#"{"delta": 40}"#).unwrap();

    let orchestrator = LinecountOrchestrator::new(headless_config(&dir)).unwrap();
    let frame_loop = orchestrator.frame_loop.as_ref().unwrap();
    assert_eq!(frame_loop.session().thresholds().unwrap().delta, 40);
}
