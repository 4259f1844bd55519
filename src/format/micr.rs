//! MICR E-13B line encoding.

use std::fmt;

use crate::foundation::error::{CheckForgeError, CheckForgeResult};

/// E-13B transit symbol (brackets the routing number).
pub const TRANSIT: char = '\u{2446}';
/// E-13B amount symbol.
pub const AMOUNT: char = '\u{2447}';
/// E-13B on-us symbol (terminates the account number).
pub const ON_US: char = '\u{2448}';
/// E-13B dash symbol.
pub const DASH: char = '\u{2449}';

/// Machine-readable line printed at the bottom of a check.
///
/// Always derived from the current document fields; never stored on the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MicrLine {
    routing: String,
    account: String,
    check: String,
}

impl MicrLine {
    pub fn routing(&self) -> &str {
        &self.routing
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn check(&self) -> &str {
        &self.check
    }

    /// The same line using the letter codes most MICR fonts map the symbols to
    /// (`A` transit, `B` amount, `C` on-us, `D` dash).
    pub fn to_font_text(&self) -> String {
        symbols_to_letters(&self.to_string())
    }

    /// ABA 3-7-1 checksum of the routing number.
    pub fn routing_checksum_ok(&self) -> bool {
        routing_checksum_ok(&self.routing)
    }
}

impl fmt::Display for MicrLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TRANSIT}{}{TRANSIT} {}{ON_US} {}",
            self.routing, self.account, self.check
        )
    }
}

/// Build the MICR line: transit-delimited routing, on-us-delimited account, then check number.
pub fn encode_micr(routing: &str, account: &str, check: &str) -> CheckForgeResult<MicrLine> {
    if routing.len() != 9 || !all_digits(routing) {
        return Err(CheckForgeError::format(format!(
            "routing number '{routing}' must be exactly 9 digits"
        )));
    }
    if account.is_empty() || !all_digits(account) {
        return Err(CheckForgeError::format(format!(
            "account number '{account}' must be a non-empty string of digits"
        )));
    }
    if check.is_empty() || !all_digits(check) {
        return Err(CheckForgeError::format(format!(
            "check number '{check}' must be a non-empty string of digits"
        )));
    }

    let line = MicrLine {
        routing: routing.to_string(),
        account: account.to_string(),
        check: check.to_string(),
    };
    if !line.routing_checksum_ok() {
        tracing::warn!(routing, "routing number fails the ABA checksum");
    }
    Ok(line)
}

pub fn routing_checksum_ok(routing: &str) -> bool {
    if routing.len() != 9 || !all_digits(routing) {
        return false;
    }
    const WEIGHTS: [u32; 3] = [3, 7, 1];
    let sum: u32 = routing
        .bytes()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * WEIGHTS[i % 3])
        .sum();
    sum % 10 == 0
}

/// Replace E-13B symbols with their MICR-font letter codes; other characters pass through.
pub fn symbols_to_letters(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            TRANSIT => 'A',
            AMOUNT => 'B',
            ON_US => 'C',
            DASH => 'D',
            other => other,
        })
        .collect()
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "../../tests/unit/format/micr.rs"]
mod tests;
