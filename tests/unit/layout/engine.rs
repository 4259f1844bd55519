use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;
use crate::format::micr::encode_micr;
use crate::layout::metrics::ApproxMetrics;

fn address(name: &str, lines: &[&str]) -> Address {
    Address {
        name: name.to_string(),
        lines: lines.iter().map(|l| l.to_string()).collect(),
    }
}

fn doc() -> CheckDocument {
    CheckDocument {
        amount: Decimal::new(123456, 2),
        issue_date: NaiveDate::from_ymd_opt(2025, 6, 25).unwrap(),
        routing_number: "121000248".to_string(),
        account_number: "000123456789".to_string(),
        check_number: "1001".to_string(),
        memo: Some("Consulting".to_string()),
        sender_address: address("Acme Corp", &["1 Main St", "Springfield, IL 62701"]),
        receiver_address: address("TechCorp Ltd", &[]),
        bank_address: address("Wells Fargo", &["San Francisco, CA"]),
        expire_days: None,
        background: None,
        logo: None,
    }
}

fn run(doc: &CheckDocument, preview: bool, logo_present: bool) -> Vec<DrawDirective> {
    let micr = encode_micr(&doc.routing_number, &doc.account_number, &doc.check_number).unwrap();
    let input = LayoutInput {
        doc,
        micr: &micr,
        size: LogicalSize::PERSONAL_CHECK,
        preview,
        logo_present,
    };
    layout_check(&input, &mut ApproxMetrics).unwrap()
}

fn texts(out: &[DrawDirective]) -> Vec<&TextRun> {
    out.iter()
        .filter_map(|d| match d {
            DrawDirective::Text(t) => Some(t),
            _ => None,
        })
        .collect()
}

fn find<'a>(out: &'a [DrawDirective], prefix: &str) -> &'a TextRun {
    texts(out)
        .into_iter()
        .find(|t| t.text.starts_with(prefix))
        .unwrap_or_else(|| panic!("no text run starting with '{prefix}'"))
}

#[test]
fn places_core_fields() {
    let out = run(&doc(), false, false);
    assert_eq!(find(&out, PAY_TO_LABEL).origin.x, 18.0);
    assert_eq!(find(&out, "TechCorp Ltd").role, FontRole::Regular);
    assert_eq!(find(&out, "06/25/2025").align, TextAlign::Start);

    let check_no = find(&out, "1001");
    assert_eq!(check_no.align, TextAlign::End);
    assert_eq!(check_no.origin.x, 414.0);

    let sender = find(&out, "Acme Corp");
    assert_eq!(sender.origin, Point::new(18.0, 14.0));
    assert_eq!(sender.role, FontRole::Bold);

    assert!(texts(&out).iter().all(|t| t.origin.x >= 0.0 && t.origin.x <= 432.0));
    assert!(out.iter().all(|d| !matches!(d, DrawDirective::Image { .. })));
}

#[test]
fn amount_words_are_padded_to_the_amount_box_edge() {
    let out = run(&doc(), false, false);
    let words = find(&out, "One thousand two hundred thirty-four and 56/100");
    assert!(words.text.ends_with('*'));

    let mut m = ApproxMetrics;
    let width = m.width(&words.text, words.role, words.size_pt);
    let box_right = 414.0;
    assert!(words.origin.x + width <= box_right + 1e-9);
    let star = m.width("*", words.role, words.size_pt);
    assert!(words.origin.x + width + star > box_right);
}

#[test]
fn numerals_are_right_aligned_and_star_padded() {
    let out = run(&doc(), false, false);
    let numerals = texts(&out)
        .into_iter()
        .find(|t| t.text.ends_with("1,234.56"))
        .unwrap();
    assert!(numerals.text.starts_with('*'));
    assert_eq!(numerals.align, TextAlign::End);
    assert_eq!(find(&out, "$").role, FontRole::Bold);
}

#[test]
fn empty_address_lines_collapse_upward() {
    let mut d = doc();
    d.sender_address = address("Acme Corp", &["Springfield, IL 62701"]);
    let out = run(&d, false, false);
    let name = find(&out, "Acme Corp");
    let line = find(&out, "Springfield");
    assert!((line.origin.y - (name.origin.y + name.size_pt * 1.2)).abs() < 1e-9);
}

#[test]
fn logo_moves_sender_block_right() {
    let without = run(&doc(), false, false);
    let with = run(&doc(), false, true);
    assert_eq!(find(&without, "Acme Corp").origin.x, 18.0);
    assert!(find(&with, "Acme Corp").origin.x >= logo_box().x1);
}

#[test]
fn overlong_payee_is_shrunk_then_truncated() {
    let mut d = doc();
    d.receiver_address.name = "Extraordinarily Long Payee Name Incorporated International Holdings Group of Companies".to_string();
    let out = run(&d, false, false);
    let payee = find(&out, "Extraordinarily");
    assert!(payee.size_pt < 10.0);
    assert!(payee.text.ends_with('\u{2026}'));

    let mut m = ApproxMetrics;
    let width = m.width(&payee.text, payee.role, payee.size_pt);
    let rule_end = 414.0 - 88.0 - 8.0;
    assert!(payee.origin.x + width <= rule_end + 1e-9);
}

#[test]
fn micr_line_sits_at_the_bottom_margin() {
    let out = run(&doc(), false, false);
    let micr = texts(&out)
        .into_iter()
        .find(|t| t.role == FontRole::Micr)
        .unwrap();
    assert_eq!(micr.text, "\u{2446}121000248\u{2446} 000123456789\u{2448} 1001");
    assert_eq!(micr.origin.y, 198.0 - 26.0);
    assert_eq!(micr.size_pt, 12.0);
}

#[test]
fn void_line_only_with_expiry() {
    let out = run(&doc(), false, false);
    assert!(texts(&out).iter().all(|t| !t.text.starts_with("Void after")));

    let mut d = doc();
    d.expire_days = Some(90);
    let out = run(&d, false, false);
    assert_eq!(find(&out, "Void after").text, "Void after 09/23/2025");
}

#[test]
fn memo_is_optional() {
    let mut d = doc();
    d.memo = None;
    let out = run(&d, false, false);
    assert_eq!(find(&out, MEMO_LABEL).text, MEMO_LABEL);
    assert!(texts(&out).iter().all(|t| t.text != "Consulting"));
}

#[test]
fn preview_adds_bleed_guide_and_crop_marks() {
    let plain = run(&doc(), false, false);
    let preview = run(&doc(), true, false);
    assert_eq!(preview.len(), plain.len() + 9);
    assert_eq!(&preview[..plain.len()], plain.as_slice());
    assert!(matches!(
        preview[plain.len()],
        DrawDirective::Frame { rect, .. } if rect == Rect::new(9.0, 9.0, 423.0, 189.0)
    ));
}

#[test]
fn layout_is_deterministic() {
    assert_eq!(run(&doc(), true, true), run(&doc(), true, true));
}

fn words_runs(out: &[DrawDirective]) -> Vec<&TextRun> {
    // Runs between the amount box bottom (y = 82) and the words rule (y = 103).
    texts(out)
        .into_iter()
        .filter(|t| t.role == FontRole::Regular && t.origin.y >= 82.0 && t.origin.y < 103.0)
        .filter(|t| t.origin.x == 18.0)
        .collect()
}

fn rejoin(runs: &[&TextRun]) -> String {
    runs.iter()
        .map(|t| t.text.trim_end_matches('*').trim_end())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn longest_amount_wraps_instead_of_failing() {
    let mut d = doc();
    d.amount = Decimal::new(77777777777777777, 2);
    let out = run(&d, false, false);
    let runs = words_runs(&out);
    assert!(runs.len() >= 2, "expected wrapped words, got {}", runs.len());
    assert_eq!(rejoin(&runs), amount_in_words(d.amount).unwrap());
    assert!(runs.last().unwrap().text.ends_with('*'));
    assert!(runs.iter().all(|t| t.size_pt >= 6.0));
}

#[test]
fn every_accepted_amount_lays_out_within_the_words_band() {
    let mut m = ApproxMetrics;
    for raw in [
        "0",
        "0.01",
        "1234.56",
        "777777777777.77",
        "373373373373373.73",
        "777777777777777.77",
        "999,999,999,999,999.99",
    ] {
        let mut d = doc();
        d.amount = crate::format::amount::parse_amount(raw).unwrap();
        let out = run(&d, false, false);

        let runs = words_runs(&out);
        assert_eq!(rejoin(&runs), amount_in_words(d.amount).unwrap(), "{raw}");
        for t in &runs {
            assert!(t.origin.x + m.width(&t.text, t.role, t.size_pt) <= 414.0 + 1e-9, "{raw}");
            assert!(t.origin.y + t.size_pt * 1.2 <= 103.0 + 1e-9, "{raw}");
        }

        let numerals = format_numerals(d.amount).unwrap();
        assert!(texts(&out).iter().any(|t| t.text.ends_with(&numerals)), "{raw}");
    }
}
