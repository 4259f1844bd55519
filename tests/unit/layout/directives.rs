use super::*;

fn text(s: &str, x: f64) -> DrawDirective {
    DrawDirective::Text(TextRun {
        text: s.to_string(),
        origin: Point::new(x, 10.0),
        role: FontRole::Regular,
        size_pt: 9.0,
        align: TextAlign::Start,
        color: Rgba8Premul::BLACK,
    })
}

fn image(slot: ImageSlot) -> DrawDirective {
    DrawDirective::Image {
        slot,
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
    }
}

#[test]
fn images_lead_and_stray_content_images_are_dropped() {
    let list = DrawList::from_parts(
        LogicalSize::PERSONAL_CHECK,
        vec![image(ImageSlot::Background)],
        vec![text("a", 1.0), image(ImageSlot::Logo), text("b", 2.0)],
    );
    assert_eq!(list.len(), 3);
    assert_eq!(list.image_slots().collect::<Vec<_>>(), vec![ImageSlot::Background]);
    assert_eq!(list.text_runs().count(), 2);
    assert_eq!(list.find_text("b").unwrap().origin.x, 2.0);
    assert!(list.find_text("z").is_none());
}

#[test]
fn fingerprint_tracks_content_and_order() {
    let size = LogicalSize::PERSONAL_CHECK;
    let a = DrawList::from_parts(size, vec![], vec![text("a", 1.0), text("b", 2.0)]);
    let same = DrawList::from_parts(size, vec![], vec![text("a", 1.0), text("b", 2.0)]);
    let swapped = DrawList::from_parts(size, vec![], vec![text("b", 2.0), text("a", 1.0)]);
    let moved = DrawList::from_parts(size, vec![], vec![text("a", 1.5), text("b", 2.0)]);

    assert_eq!(a.fingerprint(), same.fingerprint());
    assert_ne!(a.fingerprint(), swapped.fingerprint());
    assert_ne!(a.fingerprint(), moved.fingerprint());
}

#[test]
fn empty_list() {
    let list = DrawList::from_parts(LogicalSize::PERSONAL_CHECK, vec![], vec![]);
    assert!(list.is_empty());
    assert_eq!(list.size(), LogicalSize::PERSONAL_CHECK);
}
