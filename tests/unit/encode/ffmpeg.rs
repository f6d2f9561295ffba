use super::*;

fn cfg(width: u32, height: u32, fps: u32) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: PathBuf::from("out/post.mp4"),
        overwrite: true,
    }
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(cfg(0, 10, 30).validate().is_err());
    assert!(cfg(11, 10, 30).validate().is_err());
    assert!(cfg(10, 10, 0).validate().is_err());
    assert!(cfg(1080, 1920, 30).validate().is_ok());
}

#[test]
fn video_defaults_and_frame_count() {
    let v = VideoConfig::default();
    assert_eq!((v.duration_s, v.fps), (60, 30));
    assert_eq!(v.frame_count(), 1800);
    assert!(VideoConfig { duration_s: 0, fps: 30 }.validate().is_err());
    assert!(VideoConfig { duration_s: 1, fps: 0 }.validate().is_err());
}

#[test]
fn flatten_premul_over_black_produces_expected_rgb() {
    // Premultiplied red at 50% alpha.
    let src = vec![128u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_straight_over_white() {
    let src = vec![255u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [255, 255, 255, 255]).unwrap();
    assert_eq!(dst, vec![255, 255, 255, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 4], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn odd_frame_is_rejected_before_spawning() {
    let frame = FrameRGBA {
        width: 3,
        height: 2,
        data: vec![0; 3 * 2 * 4],
        premultiplied: true,
    };
    let out = std::env::temp_dir().join("postreel_odd_frame.mp4");
    let err = write_still_video(&frame, &out, &VideoConfig::default(), true).unwrap_err();
    assert!(matches!(err, PostreelError::Validation(_)), "{err}");
    assert!(!out.exists());
}

#[test]
fn still_video_is_written_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }

    let frame = FrameRGBA {
        width: 16,
        height: 16,
        data: [40u8, 80, 120, 255].repeat(16 * 16),
        premultiplied: true,
    };
    let out = std::env::temp_dir().join(format!("postreel_still_{}.mp4", std::process::id()));
    let video = VideoConfig {
        duration_s: 1,
        fps: 5,
    };
    write_still_video(&frame, &out, &video, true).unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);

    let err = write_still_video(&frame, &out, &video, false).unwrap_err();
    assert!(matches!(err, PostreelError::Validation(_)), "{err}");
    let _ = std::fs::remove_file(&out);
}
