use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::default(),
        frame_count: 1,
    }
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let dir = std::env::temp_dir().join("voyagemap_ffmpeg_unit");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.join("out.mp4")));
    let err = sink.begin(cfg(11, 10)).unwrap_err();
    assert_eq!(err.stage(), "validation");
    assert!(sink.process.is_none());
}

#[test]
fn end_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    assert!(sink.end().is_err());
}

#[test]
fn input_rate_is_rational() {
    let args = input_rate_args(Fps { num: 30000, den: 1001 });
    assert_eq!(args, ["-r".to_string(), "30000/1001".to_string()]);
}

#[test]
fn abort_keeps_existing_output() {
    let dir = std::env::temp_dir().join("voyagemap_ffmpeg_abort");
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("routes.mp4");
    std::fs::write(&out, b"previous export").unwrap();

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    let partial = sink.partial_path();
    assert_eq!(partial, dir.join("routes.mp4.partial.mp4"));
    std::fs::write(&partial, b"half written").unwrap();

    sink.abort();
    assert!(!partial.exists());
    assert_eq!(std::fs::read(&out).unwrap(), b"previous export");
}
