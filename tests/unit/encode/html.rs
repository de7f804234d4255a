use super::*;
use crate::animate::sequence::FrameSequence;
use crate::encode::sink::export_sequence;
use crate::foundation::core::Fps;
use crate::render::backend::FrameRGBA;

fn out_root(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit_html")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn sequence(n: usize) -> FrameSequence {
    let mut seq = FrameSequence::new();
    for i in 0..n {
        seq.push(
            GroupKey::Year(1791 + i as i32),
            format!("{}", 1791 + i),
            SceneStats {
                segments: i,
                points: 2 * i,
            },
            FrameRGBA {
                width: 3,
                height: 2,
                data: [10 * i as u8, 20, 30, 255].repeat(6),
                premultiplied: true,
            },
        );
    }
    seq
}

#[test]
fn writes_frames_manifest_and_player() {
    let out = out_root("ok").join("player");
    let mut sink = HtmlSink::new(HtmlSinkOpts::new(&out));
    export_sequence(&sequence(3), Fps::new(1, 1).unwrap(), &mut sink).unwrap();

    for i in 0..3 {
        assert!(out.join(format!("frames/frame_{i:04}.png")).exists());
    }
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("frames.json")).unwrap()).unwrap();
    assert_eq!(json["width"], 3);
    assert_eq!(json["frame_ms"], 1000.0);
    assert_eq!(json["frames"].as_array().unwrap().len(), 3);
    assert_eq!(json["frames"][1]["key"], 1792);
    assert_eq!(json["frames"][1]["title"], "1792");
    assert_eq!(json["frames"][2]["segments"], 2);
    assert_eq!(json["frames"][0]["fingerprint"].as_str().unwrap().len(), 16);

    let html = std::fs::read_to_string(out.join("index.html")).unwrap();
    assert!(html.contains("frames/frame_0002.png"));
    assert!(!html.contains("{{MANIFEST}}"));
    assert!(!sink.staging_path().unwrap().exists());
}

#[test]
fn png_frames_decode_to_straight_pixels() {
    let out = out_root("png").join("player");
    let mut sink = HtmlSink::new(HtmlSinkOpts::new(&out));
    export_sequence(&sequence(2), Fps::default(), &mut sink).unwrap();

    let img = image::open(out.join("frames/frame_0001.png")).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
}

#[test]
fn failed_export_leaves_nothing_behind() {
    let out = out_root("fail").join("player");
    let mut seq = sequence(2);
    seq.push(
        GroupKey::Year(1800),
        "1800".to_string(),
        SceneStats::default(),
        FrameRGBA {
            width: 3,
            height: 2,
            data: vec![0; 4],
            premultiplied: true,
        },
    );

    let mut sink = HtmlSink::new(HtmlSinkOpts::new(&out));
    let err = export_sequence(&seq, Fps::default(), &mut sink).unwrap_err();
    assert_eq!(err.stage(), "export");
    assert!(!out.exists());
    assert!(!sink.staging_path().unwrap().exists());
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let out = out_root("keep").join("player");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("marker"), b"x").unwrap();

    let mut opts = HtmlSinkOpts::new(&out);
    opts.overwrite = false;
    let err = export_sequence(&sequence(1), Fps::default(), &mut HtmlSink::new(opts)).unwrap_err();
    assert_eq!(err.stage(), "export");
    assert!(out.join("marker").exists());
}

#[test]
fn page_title_is_escaped() {
    let html = render_index_html("<Routes & Years>", "{}");
    assert!(html.contains("&lt;Routes &amp; Years&gt;"));
}
