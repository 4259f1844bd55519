use std::io::Cursor;

use super::*;
use crate::assets::decode::PreparedImage;
use crate::assets::fonts::NoFonts;
use crate::document::model::{AddressDef, ImageSource};
use crate::foundation::error::CheckForgeError;
use crate::layout::directives::{DrawDirective, ImageSlot};
use crate::layout::engine::PAY_TO_LABEL;

struct SlowImages(Duration);

impl ImageLoader for SlowImages {
    fn load(&self, source: &ImageSource) -> CheckForgeResult<PreparedImage> {
        std::thread::sleep(self.0);
        match source {
            ImageSource::Url(u) => Err(CheckForgeError::resource_load(format!("offline: {u}"))),
            _ => Ok(PreparedImage {
                width: 4,
                height: 2,
                rgba8_premul: Arc::new(vec![200; 4 * 2 * 4]),
            }),
        }
    }
}

fn def() -> CheckDocumentDef {
    CheckDocumentDef {
        amount: "1234.56".to_string(),
        issue_date: "2026-03-14".to_string(),
        routing_number: "021000021".to_string(),
        account_number: "000123".to_string(),
        check_number: "1001".to_string(),
        memo: Some("Consulting".to_string()),
        sender_address: AddressDef::named("Acme Corp"),
        receiver_address: AddressDef::named("Jane Doe"),
        bank_address: AddressDef::named("First Bank"),
        ..CheckDocumentDef::default()
    }
}

fn renderer(delay: Duration) -> Renderer {
    Renderer::new(
        RendererOpts::default()
            .with_image_loader(Arc::new(SlowImages(delay)))
            .with_font_loader(Arc::new(NoFonts))
            .with_resource_timeout(Duration::from_secs(5)),
    )
}

#[test]
fn config_defaults_and_builders() {
    let c = RenderConfig::default();
    assert_eq!(c.scale, 1.0);
    assert!(!c.preview_mode);
    let c = c.with_scale(2.0).with_preview_mode(true);
    assert_eq!((c.scale, c.preview_mode), (2.0, true));
}

#[test]
fn render_paints_surface() {
    let surface = SharedSurface::new();
    let out = renderer(Duration::ZERO)
        .render(&def(), &RenderConfig::default(), &surface)
        .unwrap();
    assert!(matches!(out, RenderOutcome::Painted(c) if c.width == 576 && c.height == 264));
    let snap = surface.snapshot().unwrap().unwrap();
    // MICR line and rules are painted in black even without fonts.
    assert!(snap.data.chunks_exact(4).any(|px| px[0] < 64));
}

#[test]
fn invalid_scale_is_validation_error() {
    let surface = SharedSurface::new();
    let err = renderer(Duration::ZERO)
        .render(&def(), &RenderConfig::default().with_scale(0.0), &surface)
        .unwrap_err();
    assert_eq!(err.field(), Some("scale"));
    assert!(surface.snapshot().unwrap().is_none());
}

#[test]
fn format_error_leaves_previous_pixels() {
    let r = renderer(Duration::ZERO);
    let surface = SharedSurface::new();
    r.render(&def(), &RenderConfig::default(), &surface).unwrap();
    let before = surface.snapshot().unwrap().unwrap();

    let mut bad = def();
    bad.account_number = "12A34".to_string();
    let err = r
        .render(&bad, &RenderConfig::default().with_scale(2.0), &surface)
        .unwrap_err();
    assert!(matches!(err, CheckForgeError::Format(_)));
    assert_eq!(surface.snapshot().unwrap().unwrap(), before);
    assert_eq!(surface.paint_count().unwrap(), 1);
}

#[test]
fn draw_list_puts_images_first() {
    let mut d = def();
    d.background = Some("bg.png".to_string());
    d.logo = Some("logo.png".to_string());
    let list = renderer(Duration::ZERO)
        .draw_list(&d, &RenderConfig::default())
        .unwrap();
    let slots: Vec<_> = list.image_slots().collect();
    assert_eq!(slots, vec![ImageSlot::Background, ImageSlot::Logo]);
    assert!(matches!(list.directives()[0], DrawDirective::Image { .. }));
    assert!(matches!(list.directives()[1], DrawDirective::Image { .. }));
    assert!(list.find_text(PAY_TO_LABEL).is_some());
}

#[test]
fn unreachable_background_still_lays_out_all_text() {
    let r = renderer(Duration::ZERO);
    let plain = r.draw_list(&def(), &RenderConfig::default()).unwrap();

    let mut d = def();
    d.background = Some("https://example.invalid/bg.png".to_string());
    let with_bad_bg = r.draw_list(&d, &RenderConfig::default()).unwrap();
    assert_eq!(with_bad_bg.fingerprint(), plain.fingerprint());

    let surface = SharedSurface::new();
    assert!(matches!(
        r.render(&d, &RenderConfig::default(), &surface).unwrap(),
        RenderOutcome::Painted(_)
    ));
}

#[test]
fn slow_image_times_out_to_no_image() {
    let r = Renderer::new(
        RendererOpts::default()
            .with_image_loader(Arc::new(SlowImages(Duration::from_millis(400))))
            .with_font_loader(Arc::new(NoFonts))
            .with_resource_timeout(Duration::from_millis(20)),
    );
    let mut d = def();
    d.background = Some("bg.png".to_string());
    let list = r.draw_list(&d, &RenderConfig::default()).unwrap();
    assert_eq!(list.image_slots().count(), 0);
}

#[test]
fn newer_render_supersedes_pending_one() {
    let surface = SharedSurface::new();
    let slow = renderer(Duration::from_millis(300));
    let fast = renderer(Duration::ZERO);

    let mut slow_doc = def();
    slow_doc.background = Some("bg.png".to_string());
    let mut fast_doc = def();
    fast_doc.check_number = "2002".to_string();

    let bg_surface = surface.clone();
    let pending = std::thread::spawn(move || {
        slow.render(&slow_doc, &RenderConfig::default(), &bg_surface)
            .unwrap()
    });
    std::thread::sleep(Duration::from_millis(80));
    let fresh = fast
        .render(&fast_doc, &RenderConfig::default(), &surface)
        .unwrap();
    let stale = pending.join().unwrap();

    assert!(matches!(fresh, RenderOutcome::Painted(_)));
    assert_eq!(stale, RenderOutcome::Superseded);
    assert_eq!(surface.paint_count().unwrap(), 1);
}

#[test]
fn render_frame_matches_surface_pixels() {
    let r = renderer(Duration::ZERO);
    let frame = r.render_frame(&def(), &RenderConfig::default()).unwrap();
    let surface = SharedSurface::new();
    r.render(&def(), &RenderConfig::default(), &surface).unwrap();
    assert_eq!(surface.snapshot().unwrap().unwrap(), frame);
}

#[test]
fn png_fixture_loads_through_fs_loader() {
    let dir = std::env::temp_dir().join(format!("checkforge-pipeline-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let img = image::RgbaImage::from_pixel(8, 4, image::Rgba([0, 128, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("bg.png"), buf).unwrap();

    let r = Renderer::new(
        RendererOpts::default()
            .with_image_loader(Arc::new(FsImageLoader::new(&dir)))
            .with_font_loader(Arc::new(NoFonts)),
    );
    let mut d = def();
    d.background = Some("bg.png".to_string());
    let frame = r.render_frame(&d, &RenderConfig::default()).unwrap();
    // Background covers the top-left corner.
    let px = frame.pixel(2, 2).unwrap();
    assert!(px[0] < 30 && px[1] > 100 && px[2] < 30, "{px:?}");
    let _ = std::fs::remove_dir_all(&dir);
}
