use pool_guide::guide::render::{Color, TRANSPARENCY_COLORKEY};
use pool_guide::guide::{render_guide, FrameBuffer, GuideModel, GuideStyle, Point, ScreenSize};

fn rendered_1080p() -> (GuideModel, GuideStyle, FrameBuffer) {
    let model = GuideModel::default_layout(ScreenSize::new(1920, 1080), 16.0);
    let style = GuideStyle::default();
    let mut frame = FrameBuffer::new(1920, 1080);
    assert!(render_guide(&model, &style, &mut frame));
    (model, style, frame)
}

#[test]
fn default_layout_frame_shows_every_element() {
    let (model, style, frame) = rendered_1080p();

    // ghost at the cue
    assert_eq!(frame.pixel(960, 540), Some(style.ghost.color));
    // guide line from the cue up to the top side pocket
    assert_eq!(frame.pixel(960, 300), Some(style.guide_line.color));
    // top side pocket mouth
    assert_eq!(frame.pixel(1000, 100), Some(style.mouth.color));

    for pocket in model.pockets() {
        let (x, y) = pocket.center.to_pixel();
        assert_eq!(frame.pixel(x as u32, y as u32), Some(style.marker.color));
    }

    assert_eq!(frame.pixel(0, 0), Some(TRANSPARENCY_COLORKEY));
    assert_eq!(frame.pixel(1919, 1079), Some(TRANSPARENCY_COLORKEY));
}

#[test]
fn moved_cue_leaves_no_trace_in_next_frame() {
    let (mut model, style, mut frame) = rendered_1080p();
    model.set_cue_position(Point::new(400.0, 700.0));
    assert!(render_guide(&model, &style, &mut frame));

    assert_eq!(frame.pixel(400, 700), Some(style.ghost.color));
    assert_eq!(frame.pixel(960, 540), Some(TRANSPARENCY_COLORKEY));
}

#[test]
fn bgra_copy_swaps_channels_for_device_bitmap() {
    let (_, style, frame) = rendered_1080p();
    let mut dib = vec![0u8; frame.rgba_pixels().len()];
    assert!(frame.copy_to_bgra(&mut dib));

    let idx = ((100 * 1920 + 1000) * 4) as usize;
    let Color { r, g, b, a } = style.mouth.color;
    assert_eq!(&dib[idx..idx + 4], &[b, g, r, a]);

    let mut short = vec![0u8; 16];
    assert!(!frame.copy_to_bgra(&mut short));
}

#[test]
fn empty_surface_is_not_drawn() {
    let model = GuideModel::default_layout(ScreenSize::new(1920, 1080), 16.0);
    let mut frame = FrameBuffer::default();
    assert!(!render_guide(&model, &GuideStyle::default(), &mut frame));
}
