use chrono::NaiveDate;

use crate::document::model::{CheckDocumentDef, ISSUE_DATE_FORMAT};
use crate::format::amount::{parse_amount, split_cents};
use crate::foundation::error::{CheckForgeError, CheckForgeResult};

/// What a transcript asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentAction {
    #[default]
    Check,
    Invoice,
    Expense,
    Query,
}

/// Structured result of parsing a spoken or typed command.
///
/// Every field is optional; [`Intent::apply_to`] only overwrites what was recognized.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(default)]
    pub action: IntentAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
}

impl Intent {
    /// Copy recognized fields into a check draft. Payee becomes the receiver name and bank the
    /// bank name.
    pub fn apply_to(&self, draft: &mut CheckDocumentDef) {
        if let Some(v) = &self.check_number {
            draft.check_number = v.clone();
        }
        if let Some(v) = &self.amount {
            draft.amount = v.clone();
        }
        if let Some(v) = &self.payee {
            draft.receiver_address.name = v.clone();
        }
        if let Some(v) = &self.issue_date {
            draft.issue_date = v.clone();
        }
        if let Some(v) = &self.memo {
            draft.memo = Some(v.clone());
        }
        if let Some(v) = &self.bank {
            draft.bank_address.name = v.clone();
        }
    }
}

/// Turns a transcript into an [`Intent`].
pub trait IntentParser: Send + Sync {
    fn parse(&self, transcript: &str) -> CheckForgeResult<Intent>;
}

/// Parser that ignores its input and returns a fixed check intent dated `today`.
#[derive(Clone, Copy, Debug)]
pub struct MockIntentParser {
    today: NaiveDate,
}

impl Default for MockIntentParser {
    fn default() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }
}

impl MockIntentParser {
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl IntentParser for MockIntentParser {
    fn parse(&self, _transcript: &str) -> CheckForgeResult<Intent> {
        Ok(Intent {
            action: IntentAction::Check,
            check_number: Some("10022".to_string()),
            amount: Some("4200.00".to_string()),
            payee: Some("FutureTech Inc".to_string()),
            issue_date: Some(self.today.format(ISSUE_DATE_FORMAT).to_string()),
            memo: Some("AI Deployment".to_string()),
            bank: Some("Wells Fargo".to_string()),
        })
    }
}

/// Rule-based parser for phrases like
/// `"Create a check for $1500 to TechCorp for consulting services"`.
///
/// Recognizes `$`-prefixed amounts, `to <payee>`, `for <memo>`, `#<number>` check numbers and
/// the action keywords `check`, `invoice`, `expense`.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordIntentParser;

const STOP_WORDS: &[&str] = &["for", "memo", "on", "dated", "from"];

impl IntentParser for KeywordIntentParser {
    fn parse(&self, transcript: &str) -> CheckForgeResult<Intent> {
        let words: Vec<&str> = transcript.split_whitespace().collect();
        if words.is_empty() {
            return Err(CheckForgeError::validation("transcript", "must not be empty"));
        }
        let lower: Vec<String> = words
            .iter()
            .map(|w| trim_punct(w).to_ascii_lowercase())
            .collect();

        let action = if lower.iter().any(|w| w == "check" || w == "cheque") {
            IntentAction::Check
        } else if lower.iter().any(|w| w == "invoice") {
            IntentAction::Invoice
        } else if lower.iter().any(|w| w == "expense") {
            IntentAction::Expense
        } else {
            IntentAction::Query
        };

        let amount = words
            .iter()
            .find(|w| w.starts_with('$'))
            .map(|w| normalize_amount(trim_punct(w)))
            .transpose()?;

        let check_number = words
            .iter()
            .filter_map(|w| trim_punct(w).strip_prefix('#'))
            .find(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .map(str::to_string);

        let to_idx = lower.iter().position(|w| w == "to");
        let payee = to_idx.and_then(|i| phrase_after(&words, &lower, i));

        let memo_idx = lower.iter().enumerate().position(|(i, w)| {
            w == "for"
                && to_idx.is_none_or(|t| i > t)
                && words.get(i + 1).is_some_and(|next| !next.starts_with('$'))
        });
        let memo = memo_idx.and_then(|i| phrase_after(&words, &lower, i));

        Ok(Intent {
            action,
            check_number,
            amount,
            payee,
            issue_date: None,
            memo,
            bank: None,
        })
    }
}

/// Words after `start` up to the next stop word, joined by spaces.
fn phrase_after(words: &[&str], lower: &[String], start: usize) -> Option<String> {
    let end = (start + 1..words.len())
        .find(|&i| STOP_WORDS.contains(&lower[i].as_str()))
        .unwrap_or(words.len());
    let phrase = words[start + 1..end].join(" ");
    let phrase = trim_punct(&phrase);
    (!phrase.is_empty()).then(|| phrase.to_string())
}

fn trim_punct(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, ',' | '.' | '!' | '?' | ';' | ':' | '"' | '\''))
}

fn normalize_amount(raw: &str) -> CheckForgeResult<String> {
    let (whole, cents) = split_cents(parse_amount(raw)?)?;
    Ok(format!("{whole}.{cents:02}"))
}

#[cfg(test)]
#[path = "../../tests/unit/intent/parser.rs"]
mod tests;
