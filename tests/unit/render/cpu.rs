use super::*;
use crate::assets::fonts::FontSet;
use crate::layout::directives::FontRole;

fn raster(list: &DrawList, resources: &Resources, scale: f64) -> FrameRGBA {
    let mut text = TextLayoutEngine::new(&FontSet::default());
    CpuRasterizer::new(&mut text, resources, Rgba8Premul::WHITE)
        .rasterize(list, scale)
        .unwrap()
}

fn list(images: Vec<DrawDirective>, content: Vec<DrawDirective>) -> DrawList {
    DrawList::from_parts(LogicalSize::PERSONAL_CHECK, images, content)
}

#[test]
fn empty_list_is_blank_paper_at_pixel_size() {
    let frame = raster(&list(vec![], vec![]), &Resources::default(), 1.0);
    assert_eq!((frame.width, frame.height), (576, 264));
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 576 * 264 * 4);
    assert!(frame.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));

    let frame2 = raster(&list(vec![], vec![]), &Resources::default(), 2.0);
    assert_eq!((frame2.width, frame2.height), (1152, 528));
}

#[test]
fn horizontal_rule_is_painted_in_device_pixels() {
    let rule = DrawDirective::Rule {
        from: Point::new(0.0, 10.0),
        to: Point::new(432.0, 10.0),
        width: 2.0,
        color: Rgba8Premul::BLACK,
    };
    let frame = raster(&list(vec![], vec![rule]), &Resources::default(), 1.0);
    // 10 pt == 13.33 px; a 2 pt rule covers rows 12..14.67.
    assert_eq!(frame.pixel(100, 13), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(100, 30), Some([255, 255, 255, 255]));
}

#[test]
fn frame_outline_leaves_interior_untouched() {
    let outline = DrawDirective::Frame {
        rect: Rect::new(30.0, 30.0, 150.0, 120.0),
        width: 3.0,
        color: Rgba8Premul::BLACK,
    };
    let frame = raster(&list(vec![], vec![outline]), &Resources::default(), 1.0);
    assert_eq!(frame.pixel(40, 40), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(120, 100), Some([255, 255, 255, 255]));
}

#[test]
fn background_image_is_scaled_into_its_rect() {
    let bg = PreparedImage {
        width: 2,
        height: 1,
        rgba8_premul: Arc::new(vec![255, 0, 0, 255, 0, 0, 255, 255]),
    };
    let resources = Resources {
        background: Some(bg),
        ..Resources::default()
    };
    let place = DrawDirective::Image {
        slot: ImageSlot::Background,
        rect: Rect::new(0.0, 0.0, 432.0, 216.0),
    };
    let frame = raster(&list(vec![place], vec![]), &resources, 1.0);
    let left = frame.pixel(10, 10).unwrap();
    let right = frame.pixel(565, 10).unwrap();
    assert!(left[0] > 200 && left[2] < 50, "{left:?}");
    assert!(right[2] > 200 && right[0] < 50, "{right:?}");
}

#[test]
fn missing_image_and_fonts_are_skipped() {
    let place = DrawDirective::Image {
        slot: ImageSlot::Logo,
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
    };
    let text = DrawDirective::Text(TextRun {
        text: "Memo".to_string(),
        origin: Point::new(20.0, 20.0),
        role: FontRole::Regular,
        size_pt: 10.0,
        align: TextAlign::Start,
        color: Rgba8Premul::BLACK,
    });
    let frame = raster(&list(vec![place], vec![text]), &Resources::default(), 1.0);
    assert!(frame.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
}

#[test]
fn undrawable_images_are_skipped() {
    let wide = PreparedImage {
        width: 70_000,
        height: 1,
        rgba8_premul: Arc::new(vec![0; 70_000 * 4]),
    };
    let short = PreparedImage {
        width: 4,
        height: 4,
        rgba8_premul: Arc::new(vec![0, 0, 0, 255]),
    };
    let resources = Resources {
        background: Some(wide),
        logo: Some(short),
        ..Resources::default()
    };
    let images = vec![
        DrawDirective::Image {
            slot: ImageSlot::Background,
            rect: Rect::new(0.0, 0.0, 432.0, 1.0),
        },
        DrawDirective::Image {
            slot: ImageSlot::Logo,
            rect: Rect::new(18.0, 14.0, 62.0, 50.0),
        },
    ];
    let rule = DrawDirective::Rule {
        from: Point::new(0.0, 100.0),
        to: Point::new(432.0, 100.0),
        width: 2.0,
        color: Rgba8Premul::BLACK,
    };
    let frame = raster(&list(images, vec![rule]), &resources, 1.0);
    assert_eq!(frame.pixel(10, 0), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(40, 40), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(100, 133), Some([0, 0, 0, 255]));
}

#[test]
fn rule_path_degenerate_is_none() {
    assert!(rule_path(Point::new(1.0, 1.0), Point::new(1.0, 1.0), 1.0).is_none());
    assert!(rule_path(Point::new(0.0, 0.0), Point::new(5.0, 0.0), 0.0).is_none());
}

#[test]
fn pixel_out_of_bounds_is_none() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![1, 2, 3, 4],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(0, 0), Some([1, 2, 3, 4]));
    assert_eq!(frame.pixel(1, 0), None);
}
