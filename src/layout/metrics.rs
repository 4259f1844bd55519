use crate::layout::directives::FontRole;

/// Measures the advance width of a single line of text, in points.
pub trait TextMeasure {
    fn width(&mut self, text: &str, role: FontRole, size_pt: f64) -> f64;
}

/// Deterministic width estimate used when no font data is available.
///
/// Proportional roles use per-class em factors close to a Helvetica-like face; the MICR role is
/// monospaced at the E-13B pitch of 0.125 in for a 12 pt line.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxMetrics;

impl ApproxMetrics {
    fn em_factor(c: char, role: FontRole) -> f64 {
        if role == FontRole::Micr {
            return 0.75;
        }
        let base = match c {
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | '\'' | '|' | '!' | ':' | ';' => 0.28,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '-' | '/' => 0.34,
            '*' => 0.39,
            'm' | 'w' => 0.83,
            'M' | 'W' | '@' => 0.87,
            '0'..='9' | '$' => 0.56,
            c if c.is_ascii_uppercase() => 0.67,
            c if c.is_ascii_lowercase() => 0.52,
            _ => 0.6,
        };
        if role == FontRole::Bold {
            base * 1.06
        } else {
            base
        }
    }
}

impl TextMeasure for ApproxMetrics {
    fn width(&mut self, text: &str, role: FontRole, size_pt: f64) -> f64 {
        text.chars()
            .map(|c| Self::em_factor(c, role))
            .sum::<f64>()
            * size_pt
    }
}
