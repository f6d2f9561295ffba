use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert_eq!(Canvas::new(1080, 1920).unwrap().rgba8_len(), 1080 * 1920 * 4);
}

#[test]
fn frame_pixel_lookup_is_bounds_checked() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
    assert_eq!(frame.pixel(0, 1), None);
}

#[test]
fn color_constants_are_opaque() {
    assert_eq!(Rgba8::BLACK.to_array(), [0, 0, 0, 255]);
    assert_eq!(Rgba8::WHITE.to_array(), [255, 255, 255, 255]);
}
