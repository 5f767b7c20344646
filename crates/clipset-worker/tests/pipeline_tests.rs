//! End-to-end checks of the non-tool pipeline path: manifest loading,
//! artifact naming, and the state-machine gates against a real filesystem.

use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

use clipset_worker::{
    load_manifest, ArtifactPaths, ClipOutcome, ClipProcessor, PipelineConfig, WorkerError,
};

fn write_manifest(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("clip_info.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn config(dir: &TempDir) -> PipelineConfig {
    let config = PipelineConfig::new(dir.path().join("in"), dir.path().join("out"), 2);
    std::fs::create_dir_all(&config.input_dir).unwrap();
    config.prepare().unwrap();
    config
}

#[test]
fn manifest_line_resolves_to_contracted_artifact_name() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), "cliqA,720,1280,30,90,100,50,600,400\n");
    let specs = load_manifest(&manifest).unwrap();
    assert_eq!(specs.len(), 1);

    let spec = &specs[0];
    assert_eq!(spec.frame_count(), 61);
    assert_eq!(spec.output_filename(), "cliqA_S30_E90_L100_T50_R600_B400.mp4");

    // Identity rescale at the reference resolution.
    let window = spec.crop.rescale(1280, 720, 1280, 720).unwrap();
    assert_eq!(
        (window.left, window.top, window.right, window.bottom),
        (100, 50, 600, 400)
    );
    // Half-resolution source halves every edge.
    let window = spec.crop.rescale(1280, 720, 640, 360).unwrap();
    assert_eq!(
        (window.left, window.top, window.right, window.bottom),
        (50, 25, 300, 200)
    );
}

#[test]
fn malformed_manifest_aborts_before_any_processing() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        dir.path(),
        "cliqA,720,1280,30,90,600,50,100,400\n", // left >= right
    );
    let err = load_manifest(&manifest).unwrap_err();
    assert!(matches!(err, WorkerError::MalformedRecord { line: 1, .. }));
    // Nothing was written anywhere.
    assert!(std::fs::read_dir(dir.path()).unwrap().count() == 1);
}

#[tokio::test]
async fn rerun_resolves_to_skip_without_tools() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let manifest = write_manifest(dir.path(), "cliqA,720,1280,30,90,100,50,600,400\n");
    let spec = load_manifest(&manifest).unwrap().remove(0);

    // Simulate a completed first run by placing the final artifact.
    let paths = ArtifactPaths::single_stage(&spec, &config);
    std::fs::write(paths.output(), b"produced").unwrap();

    // A second run must short-circuit on the idempotency gate; no ffmpeg
    // or ffprobe is present in this test, so reaching a tool would fail.
    let processor = ClipProcessor::new(config);
    let outcome = processor.process_single_stage(&spec).await.unwrap();
    assert_eq!(outcome, ClipOutcome::Skipped);
    assert_eq!(std::fs::read(paths.output()).unwrap(), b"produced");
}

#[tokio::test]
async fn two_stage_requires_sibling_artifact_first() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let manifest = write_manifest(dir.path(), "clip_ab12,720,1280,30,90,100,50,600,400\n");
    let spec = load_manifest(&manifest).unwrap().remove(0);

    // The fetched full source is present...
    std::fs::write(config.input_dir.join("clip_full_ab12.mp4"), b"src").unwrap();

    // ...but the cropped-video artifact is not: fail before any tool runs.
    let processor = ClipProcessor::new(config.clone());
    let err = processor.process_two_stage(&spec).await.unwrap_err();
    match err {
        WorkerError::MissingDependency(path) => {
            assert_eq!(
                path,
                config
                    .output_dir
                    .join("clip_ab12_S30_E90_L100_T50_R600_B400.mp4")
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_source_is_a_per_clip_failure() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let spec = load_manifest(&write_manifest(
        dir.path(),
        "cliqA,720,1280,30,90,100,50,600,400\n",
    ))
    .unwrap()
    .remove(0);

    let processor = ClipProcessor::new(config.clone());
    let err = processor.process_single_stage(&spec).await.unwrap_err();
    match err {
        WorkerError::MissingInput(path) => {
            assert_eq!(path, config.input_dir.join("cliqA.mp4"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
