//! Exact-decimal amount parsing and formatting.
//!
//! All arithmetic goes through [`rust_decimal::Decimal`]; binary floating point never touches an
//! amount, so `0.1 + 0.2` prints as `0.30`.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::foundation::error::{CheckForgeError, CheckForgeResult};

/// Amounts must stay strictly below one quadrillion.
pub const MAX_AMOUNT_EXCLUSIVE: u64 = 1_000_000_000_000_000;

const ONES: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(&str, u64); 4] = [
    ("trillion", 1_000_000_000_000),
    ("billion", 1_000_000_000),
    ("million", 1_000_000),
    ("thousand", 1_000),
];

/// Parse a user-entered amount.
///
/// - surrounding whitespace, one leading `$` and `,` thousands separators are accepted
/// - the empty string is zero
/// - more than two fractional digits are rounded half-up to cents
pub fn parse_amount(raw: &str) -> CheckForgeResult<Decimal> {
    let s = raw.trim();
    let s = s.strip_prefix('$').map(str::trim_start).unwrap_or(s);
    if s.is_empty() {
        return Ok(Decimal::ZERO);
    }

    if let Some(dot) = s.find('.')
        && s[dot..].contains(',')
    {
        return Err(CheckForgeError::validation(
            "amount",
            format!("'{raw}' has a group separator after the decimal point"),
        ));
    }
    let int_part = s.split_once('.').map_or(s, |(int, _)| int);
    if int_part.contains(',') && !well_grouped(int_part) {
        return Err(CheckForgeError::validation(
            "amount",
            format!("'{raw}' has misplaced group separators"),
        ));
    }
    let cleaned: String = s.chars().filter(|&c| c != ',').collect();
    if cleaned.contains(['e', 'E']) {
        return Err(CheckForgeError::validation(
            "amount",
            format!("'{raw}' must not use exponent notation"),
        ));
    }

    let d = Decimal::from_str(&cleaned).map_err(|_| {
        CheckForgeError::validation("amount", format!("'{raw}' is not a valid decimal number"))
    })?;
    if d < Decimal::ZERO {
        return Err(CheckForgeError::validation(
            "amount",
            format!("'{raw}' must be non-negative"),
        ));
    }
    if d.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded >= Decimal::from(MAX_AMOUNT_EXCLUSIVE) {
        return Err(CheckForgeError::validation(
            "amount",
            format!("'{raw}' exceeds the largest printable amount"),
        ));
    }
    Ok(rounded)
}

/// `1,234,567`: a leading group of one to three digits, then groups of exactly three.
fn well_grouped(int_part: &str) -> bool {
    let mut groups = int_part.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    lead_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Split a validated amount into whole dollars and cents.
pub fn split_cents(amount: Decimal) -> CheckForgeResult<(u64, u8)> {
    if amount < Decimal::ZERO {
        return Err(CheckForgeError::format("amount must be non-negative"));
    }
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let whole = rounded.trunc();
    let cents = ((rounded - whole) * Decimal::ONE_HUNDRED)
        .to_u8()
        .ok_or_else(|| CheckForgeError::format("cents out of range"))?;
    let whole = whole
        .to_u64()
        .filter(|&w| w < MAX_AMOUNT_EXCLUSIVE)
        .ok_or_else(|| CheckForgeError::format(format!("amount {amount} is too large")))?;
    Ok((whole, cents))
}

/// `1234.5` -> `1,234.50`.
pub fn format_numerals(amount: Decimal) -> CheckForgeResult<String> {
    let (whole, cents) = split_cents(amount)?;
    Ok(format!("{}.{cents:02}", group_thousands(whole)))
}

fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234.56` -> `One thousand two hundred thirty-four and 56/100`.
pub fn amount_in_words(amount: Decimal) -> CheckForgeResult<String> {
    let (whole, cents) = split_cents(amount)?;
    let words = integer_words(whole);
    Ok(format!("{} and {cents:02}/100", capitalize_first(&words)))
}

fn integer_words(mut n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut parts = Vec::<String>::new();
    for (name, scale) in SCALES {
        if n >= scale {
            parts.push(format!("{} {name}", below_thousand(n / scale)));
            n %= scale;
        }
    }
    if n > 0 {
        parts.push(below_thousand(n));
    }
    parts.join(" ")
}

fn below_thousand(n: u64) -> String {
    debug_assert!(n < 1000);
    let hundreds = n / 100;
    let rest = n % 100;
    let mut out = String::new();
    if hundreds > 0 {
        out.push_str(ONES[hundreds as usize]);
        out.push_str(" hundred");
    }
    if rest > 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        if rest < 20 {
            out.push_str(ONES[rest as usize]);
        } else {
            out.push_str(TENS[(rest / 10) as usize]);
            if rest % 10 > 0 {
                out.push('-');
                out.push_str(ONES[(rest % 10) as usize]);
            }
        }
    }
    out
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse the output of [`amount_in_words`] back into an amount.
pub fn amount_from_words(text: &str) -> CheckForgeResult<Decimal> {
    let lower = text.trim().to_ascii_lowercase();
    let (words, cents) = lower
        .rsplit_once(" and ")
        .ok_or_else(|| CheckForgeError::format(format!("'{text}' has no cents clause")))?;
    let cents = cents
        .strip_suffix("/100")
        .and_then(|c| c.parse::<u8>().ok())
        .filter(|&c| c < 100)
        .ok_or_else(|| CheckForgeError::format(format!("'{text}' has malformed cents")))?;

    let overflow = || CheckForgeError::format(format!("'{text}' is out of range"));
    let mut total = 0u64;
    let mut current = 0u64;
    for tok in words.split(|c: char| c.is_whitespace() || c == '-') {
        if tok.is_empty() {
            continue;
        }
        current = if let Some(v) = ONES.iter().position(|w| *w == tok) {
            current.checked_add(v as u64)
        } else if let Some(v) = TENS.iter().position(|w| !w.is_empty() && *w == tok) {
            current.checked_add(10 * v as u64)
        } else if tok == "hundred" {
            current.checked_mul(100)
        } else if let Some((_, scale)) = SCALES.iter().find(|(w, _)| *w == tok) {
            total = current
                .checked_mul(*scale)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(overflow)?;
            Some(0)
        } else {
            return Err(CheckForgeError::format(format!(
                "unknown number word '{tok}' in '{text}'"
            )));
        }
        .ok_or_else(overflow)?;
    }

    let whole = total
        .checked_add(current)
        .filter(|&w| w < MAX_AMOUNT_EXCLUSIVE)
        .ok_or_else(overflow)?;
    Ok(Decimal::from(whole) + Decimal::new(i64::from(cents), 2))
}

#[cfg(test)]
#[path = "../../tests/unit/format/amount.rs"]
mod tests;
