//! Check layout: maps document fields onto fixed positions, in points.
//!
//! Horizontal positions are anchored to the left or right trim edge and vertical positions to
//! the top or bottom edge, so the same policy holds for any logical check size.

use crate::document::model::{Address, CheckDocument};
use crate::format::amount::{amount_in_words, format_numerals};
use crate::format::micr::MicrLine;
use crate::foundation::core::{LogicalSize, Point, Rect, Rgba8Premul};
use crate::foundation::error::CheckForgeResult;
use crate::layout::directives::{DrawDirective, FontRole, TextAlign, TextRun};
use crate::layout::metrics::TextMeasure;

const MARGIN: f64 = 18.0;
const TOP: f64 = 14.0;
const LINE_HEIGHT: f64 = 1.2;
const RULE_PT: f64 = 0.6;
const SHRINK_STEP: f64 = 0.5;
const MIN_TEXT_PT: f64 = 5.0;
const MIN_WORDS_PT: f64 = 6.0;
const FILL: &str = "*";
const ELLIPSIS: char = '\u{2026}';

const INK: Rgba8Premul = Rgba8Premul::opaque(17, 17, 17);
const LABEL: Rgba8Premul = Rgba8Premul::opaque(85, 85, 85);
const BLEED_GUIDE: Rgba8Premul = Rgba8Premul::opaque(0, 160, 230);
const CROP_MARK: Rgba8Premul = Rgba8Premul::opaque(230, 0, 126);

/// Distance from the surface edge to the trim line drawn in preview mode (1/8 in).
pub const BLEED_PT: f64 = 9.0;
const CROP_MARK_LEN: f64 = 6.0;

/// Label printed before the payee name.
pub const PAY_TO_LABEL: &str = "PAY TO THE ORDER OF";
pub const MEMO_LABEL: &str = "Memo";
pub const DATE_LABEL: &str = "Date";
pub const SIGNATURE_LABEL: &str = "Authorized Signature";

/// Box the logo is fitted into.
pub fn logo_box() -> Rect {
    Rect::new(MARGIN, TOP, MARGIN + 44.0, TOP + 36.0)
}

/// Everything the layout needs besides the text measurer.
#[derive(Clone, Copy, Debug)]
pub struct LayoutInput<'a> {
    pub doc: &'a CheckDocument,
    pub micr: &'a MicrLine,
    pub size: LogicalSize,
    pub preview: bool,
    /// Whether a logo will be composited into [`logo_box`]; the sender block moves right of it.
    pub logo_present: bool,
}

/// Lay out all text, rules and guides of a check. Image placements are not included.
#[tracing::instrument(skip_all, fields(check = %input.doc.check_number, preview = input.preview))]
pub fn layout_check(
    input: &LayoutInput<'_>,
    measure: &mut dyn TextMeasure,
) -> CheckForgeResult<Vec<DrawDirective>> {
    let doc = input.doc;
    let w = input.size.width_pt;
    let h = input.size.height_pt;
    let right = w - MARGIN;
    let mut b = Builder {
        out: Vec::with_capacity(48),
        measure,
    };

    // Sender (top-left) and bank (top-center) blocks.
    let bank_x = w / 2.0 - 36.0;
    let sender_x = if input.logo_present {
        logo_box().x1 + 6.0
    } else {
        MARGIN
    };
    b.address_block(
        &doc.sender_address,
        Point::new(sender_x, TOP),
        (FontRole::Bold, 9.0),
        7.0,
        bank_x - 6.0 - sender_x,
    );
    let date_label_x = right - 114.0;
    b.address_block(
        &doc.bank_address,
        Point::new(bank_x, TOP),
        (FontRole::Bold, 8.0),
        6.5,
        date_label_x - 6.0 - bank_x,
    );

    // Check number and date (top-right).
    b.text(
        &doc.check_number,
        Point::new(right, TOP),
        FontRole::Bold,
        10.0,
        TextAlign::End,
        INK,
    );
    let date_rule_y = TOP + 35.0;
    b.text(
        DATE_LABEL,
        Point::new(date_label_x, date_rule_y - 9.0),
        FontRole::Regular,
        7.0,
        TextAlign::Start,
        LABEL,
    );
    b.fitted_text(
        &doc.issue_date.format("%m/%d/%Y").to_string(),
        Point::new(right - 90.0, date_rule_y - 12.0),
        FontRole::Regular,
        9.0,
        88.0,
        TextAlign::Start,
    );
    b.rule(right - 92.0, date_rule_y, right, date_rule_y);
    if let Some(void) = doc.void_after() {
        b.text(
            &format!("Void after {}", void.format("%m/%d/%Y")),
            Point::new(right, date_rule_y + 3.0),
            FontRole::Regular,
            6.0,
            TextAlign::End,
            LABEL,
        );
    }

    // Payee line and amount box.
    let payee_rule_y = TOP + 66.0;
    let box_rect = Rect::new(right - 88.0, payee_rule_y - 16.0, right, payee_rule_y + 2.0);
    b.text(
        PAY_TO_LABEL,
        Point::new(MARGIN, payee_rule_y - 8.0),
        FontRole::Regular,
        6.5,
        TextAlign::Start,
        LABEL,
    );
    let payee_x = MARGIN + 76.0;
    let payee_end = box_rect.x0 - 8.0;
    b.fitted_text(
        doc.payee(),
        Point::new(payee_x, payee_rule_y - 13.0),
        FontRole::Regular,
        10.0,
        payee_end - payee_x,
        TextAlign::Start,
    );
    b.rule(payee_x - 2.0, payee_rule_y, payee_end, payee_rule_y);

    b.frame(box_rect);
    let dollar_x = box_rect.x0 + 3.0;
    let text_y = box_rect.y0 + 3.0;
    b.text(
        "$",
        Point::new(dollar_x, text_y),
        FontRole::Bold,
        10.0,
        TextAlign::Start,
        INK,
    );
    let numerals = format_numerals(doc.amount)?;
    let numerals_start = dollar_x + b.measure.width("$", FontRole::Bold, 10.0) + 2.0;
    let numerals_end = box_rect.x1 - 3.0;
    let size = b.shrink_to(
        &numerals,
        FontRole::Bold,
        (10.0, MIN_TEXT_PT),
        numerals_end - numerals_start,
    );
    let padded = b.fill_before(&numerals, FontRole::Bold, size, numerals_end - numerals_start);
    b.text(
        &padded,
        Point::new(numerals_end, text_y),
        FontRole::Bold,
        size,
        TextAlign::End,
        INK,
    );

    // Amount in words between the amount box and the words rule, the last line padded to the
    // amount box's right edge.
    let words_rule_y = payee_rule_y + 23.0;
    let words = amount_in_words(doc.amount)?;
    let (size, lines) = b.amount_words(
        &words,
        (9.0, MIN_WORDS_PT),
        box_rect.x1 - MARGIN,
        words_rule_y - box_rect.y1 - 1.5,
    );
    let line_advance = size * LINE_HEIGHT;
    let first_y = words_rule_y - 1.5 - line_advance * lines.len() as f64;
    for (i, line) in lines.iter().enumerate() {
        b.text(
            line,
            Point::new(MARGIN, first_y + line_advance * i as f64),
            FontRole::Regular,
            size,
            TextAlign::Start,
            INK,
        );
    }
    b.rule(MARGIN, words_rule_y, box_rect.x1, words_rule_y);

    // Receiver mailing block, only when there is an address to print.
    if !doc.receiver_address.lines.is_empty() {
        b.address_block(
            &doc.receiver_address,
            Point::new(MARGIN + 22.0, words_rule_y + 5.0),
            (FontRole::Regular, 7.5),
            7.0,
            w / 2.0 - MARGIN - 22.0,
        );
    }

    // Memo (bottom-left) and signature (bottom-right).
    let sig_rule_y = h - 38.0;
    let memo_value_x = MARGIN + 26.0;
    let memo_end = w / 2.0 - 16.0;
    b.text(
        MEMO_LABEL,
        Point::new(MARGIN, sig_rule_y - 10.0),
        FontRole::Regular,
        7.0,
        TextAlign::Start,
        LABEL,
    );
    if let Some(memo) = &doc.memo {
        b.fitted_text(
            memo,
            Point::new(memo_value_x, sig_rule_y - 12.0),
            FontRole::Regular,
            8.0,
            memo_end - memo_value_x,
            TextAlign::Start,
        );
    }
    b.rule(memo_value_x - 2.0, sig_rule_y, memo_end, sig_rule_y);

    let sig_x0 = w - 182.0;
    b.rule(sig_x0, sig_rule_y, right, sig_rule_y);
    b.text(
        SIGNATURE_LABEL,
        Point::new((sig_x0 + right) / 2.0, sig_rule_y + 3.0),
        FontRole::Regular,
        6.0,
        TextAlign::Center,
        LABEL,
    );

    // MICR band.
    b.text(
        &input.micr.to_string(),
        Point::new(MARGIN * 2.0, h - 26.0),
        FontRole::Micr,
        12.0,
        TextAlign::Start,
        INK,
    );

    if input.preview {
        b.preview_guides(input.size);
    }

    Ok(b.out)
}

struct Builder<'m> {
    out: Vec<DrawDirective>,
    measure: &'m mut dyn TextMeasure,
}

impl Builder<'_> {
    fn text(
        &mut self,
        text: &str,
        origin: Point,
        role: FontRole,
        size_pt: f64,
        align: TextAlign,
        color: Rgba8Premul,
    ) {
        if text.is_empty() {
            return;
        }
        self.out.push(DrawDirective::Text(TextRun {
            text: text.to_string(),
            origin,
            role,
            size_pt,
            align,
            color,
        }));
    }

    fn rule(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.out.push(DrawDirective::Rule {
            from: Point::new(x0, y0),
            to: Point::new(x1, y1),
            width: RULE_PT,
            color: INK,
        });
    }

    fn frame(&mut self, rect: Rect) {
        self.out.push(DrawDirective::Frame {
            rect,
            width: 0.8,
            color: INK,
        });
    }

    /// Shrink, then truncate with an ellipsis, until `text` fits `max_width`.
    fn fitted_text(
        &mut self,
        text: &str,
        origin: Point,
        role: FontRole,
        size_pt: f64,
        max_width: f64,
        align: TextAlign,
    ) {
        let (fitted, size) = self.fit(text, role, size_pt, max_width);
        self.text(&fitted, origin, role, size, align, INK);
    }

    fn fit(&mut self, text: &str, role: FontRole, size_pt: f64, max_width: f64) -> (String, f64) {
        let floor = (size_pt * 0.7).max(MIN_TEXT_PT);
        let mut size = size_pt;
        while self.measure.width(text, role, size) > max_width && size - SHRINK_STEP >= floor {
            size -= SHRINK_STEP;
        }
        if self.measure.width(text, role, size) <= max_width {
            return (text.to_string(), size);
        }

        let mut chars: Vec<char> = text.chars().collect();
        while chars.pop().is_some() {
            let mut candidate: String = chars.iter().collect::<String>().trim_end().to_string();
            candidate.push(ELLIPSIS);
            if self.measure.width(&candidate, role, size) <= max_width {
                return (candidate, size);
            }
        }
        (String::new(), size)
    }

    /// Largest size within `sizes = (preferred, minimum)` at which `text` fits `avail`, or the
    /// minimum when it never does.
    fn shrink_to(&mut self, text: &str, role: FontRole, sizes: (f64, f64), avail: f64) -> f64 {
        let (mut size, min) = sizes;
        while self.measure.width(text, role, size) > avail && size - SHRINK_STEP >= min {
            size -= SHRINK_STEP;
        }
        size
    }

    fn fill_count(&mut self, fixed: &str, role: FontRole, size: f64, avail: f64) -> usize {
        let fill_w = self.measure.width(FILL, role, size);
        if fill_w <= 0.0 {
            return 0;
        }
        let free = avail - self.measure.width(fixed, role, size);
        (free / fill_w).floor().max(0.0) as usize
    }

    /// `text` followed by fill characters up to `avail`.
    fn fill_after(&mut self, text: &str, role: FontRole, size: f64, avail: f64) -> String {
        let base = format!("{text} ");
        let mut n = self.fill_count(&base, role, size, avail);
        while n > 0 {
            let candidate = format!("{base}{}", FILL.repeat(n));
            if self.measure.width(&candidate, role, size) <= avail {
                return candidate;
            }
            n -= 1;
        }
        text.to_string()
    }

    /// Fill characters followed by `text`, right-aligned into `avail`.
    fn fill_before(&mut self, text: &str, role: FontRole, size: f64, avail: f64) -> String {
        let mut n = self.fill_count(text, role, size, avail);
        while n > 0 {
            let candidate = format!("{}{text}", FILL.repeat(n));
            if self.measure.width(&candidate, role, size) <= avail {
                return candidate;
            }
            n -= 1;
        }
        text.to_string()
    }

    /// Lay out the legal amount in `avail` width and `band` height.
    ///
    /// One line is preferred, shrinking down to the minimum size. Longer amounts wrap at word
    /// boundaries, shrinking until every line fits the band; at the minimum size the wrapped
    /// lines are kept as they are. Words are never dropped or truncated.
    fn amount_words(
        &mut self,
        words: &str,
        sizes: (f64, f64),
        avail: f64,
        band: f64,
    ) -> (f64, Vec<String>) {
        let role = FontRole::Regular;
        let (preferred, min) = sizes;
        let size = self.shrink_to(words, role, sizes, avail);
        if self.measure.width(words, role, size) <= avail {
            let filled = self.fill_after(words, role, size, avail);
            return (size, vec![filled]);
        }

        let mut size = preferred;
        let mut lines = self.wrap(words, role, size, avail);
        while lines.len() as f64 * size * LINE_HEIGHT > band && size - SHRINK_STEP >= min {
            size -= SHRINK_STEP;
            lines = self.wrap(words, role, size, avail);
        }
        if let Some(last) = lines.pop() {
            lines.push(self.fill_after(&last, role, size, avail));
        }
        (size, lines)
    }

    /// Greedy word wrap; a single word wider than `avail` gets a line of its own.
    fn wrap(&mut self, text: &str, role: FontRole, size: f64, avail: f64) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if self.measure.width(&candidate, role, size) <= avail {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }

    /// Name line plus non-empty address lines, stacked without gaps.
    fn address_block(
        &mut self,
        address: &Address,
        origin: Point,
        name_style: (FontRole, f64),
        line_pt: f64,
        max_width: f64,
    ) {
        let (name_role, name_pt) = name_style;
        let (name, size) = self.fit(&address.name, name_role, name_pt, max_width);
        self.text(&name, origin, name_role, size, TextAlign::Start, INK);
        let mut y = origin.y + size * LINE_HEIGHT;
        for line in &address.lines {
            let (fitted, size) = self.fit(line, FontRole::Regular, line_pt, max_width);
            self.text(
                &fitted,
                Point::new(origin.x, y),
                FontRole::Regular,
                size,
                TextAlign::Start,
                INK,
            );
            y += size * LINE_HEIGHT;
        }
    }

    fn preview_guides(&mut self, size: LogicalSize) {
        let (w, h) = (size.width_pt, size.height_pt);
        let trim = Rect::new(BLEED_PT, BLEED_PT, w - BLEED_PT, h - BLEED_PT);
        self.out.push(DrawDirective::Frame {
            rect: trim,
            width: 0.5,
            color: BLEED_GUIDE,
        });

        let mark = |from: Point, to: Point| DrawDirective::Rule {
            from,
            to,
            width: 0.5,
            color: CROP_MARK,
        };
        for (x, edge_x, dx) in [(trim.x0, 0.0, 1.0), (trim.x1, w, -1.0)] {
            for (y, edge_y, dy) in [(trim.y0, 0.0, 1.0), (trim.y1, h, -1.0)] {
                self.out.push(mark(
                    Point::new(edge_x, y),
                    Point::new(edge_x + dx * CROP_MARK_LEN, y),
                ));
                self.out.push(mark(
                    Point::new(x, edge_y),
                    Point::new(x, edge_y + dy * CROP_MARK_LEN),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
