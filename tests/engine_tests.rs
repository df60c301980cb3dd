//! Tests driving the process adapter against a stand-in ffmpeg script

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use splitx_cli::adapters::FfmpegProcessAdapter;
use splitx_cli::engine::{CutMode, CutRequest, TransformInvoker};
use splitx_cli::probe::DurationProbe;
use splitx_cli::*;

// Test utilities

/// Write an executable script that behaves like ffmpeg for the tests:
/// `-i <file>` alone prints a banner with a duration and exits 1, a cut
/// writes its last argument, and an output named `fail.mp4` exits 1.
fn fake_ffmpeg(dir: &Path) -> PathBuf {
    let script = dir.join("ffmpeg");
    std::fs::write(
        &script,
        r#"#!/bin/sh
if [ "$#" -eq 2 ] && [ "$1" = "-i" ]; then
  echo "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from '$2':" >&2
  echo "  Duration: 01:02:03.45, start: 0.000000, bitrate: 800 kb/s" >&2
  echo "At least one output file must be specified" >&2
  exit 1
fi
for last; do :; done
case "$last" in
  *fail.mp4)
    echo "Conversion failed!" >&2
    exit 1
    ;;
esac
echo "cut" > "$last"
exit 0
"#,
    )
    .unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    script
}

fn create_test_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"fake video data").unwrap();
    path
}

#[tokio::test]
async fn probe_reads_duration_despite_non_zero_exit() {
    let dir = TempDir::new().unwrap();
    let adapter = Arc::new(FfmpegProcessAdapter::new(fake_ffmpeg(dir.path())));
    let input = create_test_video(dir.path(), "clip.mp4");

    let duration = DurationProbe::new(adapter).probe(&input).await.unwrap();
    assert!((duration - 3723.45).abs() < 1e-9);
}

#[tokio::test]
async fn probe_of_missing_file_never_spawns() {
    let dir = TempDir::new().unwrap();
    // A binary that does not exist would fail with Transcode if spawned
    let adapter = Arc::new(FfmpegProcessAdapter::new(dir.path().join("no-such-ffmpeg")));

    let err = DurationProbe::new(adapter)
        .probe(&dir.path().join("missing.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, SplitXError::NotFound { .. }));
}

#[tokio::test]
async fn cut_writes_output_through_the_process() {
    let dir = TempDir::new().unwrap();
    let invoker = TransformInvoker::new(Arc::new(FfmpegProcessAdapter::new(fake_ffmpeg(dir.path()))));
    let input = create_test_video(dir.path(), "clip.mp4");
    let output = dir.path().join("clip_part1.mp4");

    let written = invoker
        .cut(&CutRequest {
            input,
            output: output.clone(),
            start: 0.0,
            end: 10.0,
            mode: CutMode::StreamCopy,
        })
        .await
        .unwrap();

    assert_eq!(written, output);
    assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "cut");
}

#[tokio::test]
async fn non_zero_exit_keeps_stderr() {
    let dir = TempDir::new().unwrap();
    let invoker = TransformInvoker::new(Arc::new(FfmpegProcessAdapter::new(fake_ffmpeg(dir.path()))));
    let input = create_test_video(dir.path(), "clip.mp4");

    let err = invoker
        .cut(&CutRequest {
            input,
            output: dir.path().join("fail.mp4"),
            start: 0.0,
            end: 10.0,
            mode: CutMode::Reencode,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "transcode");
    assert_eq!(err.detail(), "FFMPEG Error (exit status 1): Conversion failed!");
}

#[tokio::test]
async fn missing_binary_is_a_transcode_error() {
    let dir = TempDir::new().unwrap();
    let adapter = FfmpegProcessAdapter::new(dir.path().join("no-such-ffmpeg"));

    let err = adapter.run(&["-version".to_string()]).await.unwrap_err();
    assert!(matches!(err, SplitXError::Transcode { .. }));
}

#[tokio::test]
async fn split_batch_over_the_process_adapter() {
    let dir = TempDir::new().unwrap();
    let input = create_test_video(dir.path(), "clip.mp4");
    let batch = BatchInteractor::new(TransformInvoker::new(Arc::new(FfmpegProcessAdapter::new(
        fake_ffmpeg(dir.path()),
    ))));

    let report = batch
        .run(
            BatchRequest::new(
                vec![input],
                Operation::Split {
                    strategy: SizingStrategy::ByDuration(1800.0),
                    archive: ArchiveMode::Bundle,
                    cleanup: true,
                    precise: false,
                    naming_pattern: None,
                },
            ),
            &Reporter::silent(),
        )
        .await;

    assert!(report.all_succeeded());
    let splits = dir.path().join("clip_splits");
    assert_eq!(report.results[0].outputs, vec![splits.join("clip_bundle.zip")]);
    assert!(!splits.join("clip_part1.mp4").exists());
}
