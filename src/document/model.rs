use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::format::amount::parse_amount;
use crate::format::micr::{MicrLine, encode_micr};
use crate::foundation::error::{CheckForgeError, CheckForgeResult};

/// Date format accepted at the JSON boundary.
pub const ISSUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Postal block as entered in the check form.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddressDef {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
}

impl AddressDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// `expireDays` arrives either as a JSON number or as the form's text value.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ExpireDaysDef {
    Days(u32),
    Text(String),
}

/// JSON-facing check payload, field names match the check form / API payload.
///
/// Nothing is checked at this level; [`CheckDocumentDef::validate`] produces a [`CheckDocument`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDocumentDef {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub issue_date: String,
    #[serde(default)]
    pub routing_number: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub check_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default)]
    pub sender_address: AddressDef,
    #[serde(default)]
    pub receiver_address: AddressDef,
    #[serde(default)]
    pub bank_address: AddressDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_days: Option<ExpireDaysDef>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "bg")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl CheckDocumentDef {
    /// Parse a check payload from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CheckForgeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| CheckForgeError::serde(format!("parse check JSON: {e}")))
    }

    /// Parse a check payload from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CheckForgeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open check JSON '{}'", path.display()))
            .map_err(CheckForgeError::from)?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate every field and build the immutable per-render document.
    pub fn validate(&self) -> CheckForgeResult<CheckDocument> {
        let amount = parse_amount(&self.amount)?;

        let issue_date = NaiveDate::parse_from_str(self.issue_date.trim(), ISSUE_DATE_FORMAT)
            .map_err(|e| {
                CheckForgeError::validation(
                    "issueDate",
                    format!("'{}' is not a YYYY-MM-DD date: {e}", self.issue_date),
                )
            })?;

        let routing_number = self.routing_number.trim().to_string();
        if routing_number.len() != 9 || !routing_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CheckForgeError::validation(
                "routingNumber",
                format!("'{}' must be exactly 9 digits", self.routing_number),
            ));
        }

        let sender_address = Address::from_def(&self.sender_address, "senderAddress.name")?;
        let receiver_address = Address::from_def(&self.receiver_address, "receiverAddress.name")?;
        let bank_address = Address::from_def(&self.bank_address, "bankAddress.name")?;

        let expire_days = match &self.expire_days {
            None => None,
            Some(ExpireDaysDef::Days(d)) => Some(*d),
            Some(ExpireDaysDef::Text(t)) if t.trim().is_empty() => None,
            Some(ExpireDaysDef::Text(t)) => Some(t.trim().parse::<u32>().map_err(|_| {
                CheckForgeError::validation(
                    "expireDays",
                    format!("'{t}' is not a non-negative whole number of days"),
                )
            })?),
        };

        Ok(CheckDocument {
            amount,
            issue_date,
            routing_number,
            account_number: self.account_number.trim().to_string(),
            check_number: self.check_number.trim().to_string(),
            memo: non_empty(self.memo.as_deref()),
            sender_address,
            receiver_address,
            bank_address,
            expire_days,
            background: non_empty(self.background.as_deref()).map(|s| ImageSource::parse(&s)),
            logo: non_empty(self.logo.as_deref()).map(|s| ImageSource::parse(&s)),
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Validated postal block. Empty optional lines are already dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    pub lines: Vec<String>,
}

impl Address {
    fn from_def(def: &AddressDef, field: &str) -> CheckForgeResult<Self> {
        let name = def.name.trim();
        if name.is_empty() {
            return Err(CheckForgeError::validation(field, "must not be empty"));
        }
        let lines = [&def.line1, &def.line2, &def.line3]
            .into_iter()
            .filter_map(|l| non_empty(l.as_deref()))
            .collect();
        Ok(Self {
            name: name.to_string(),
            lines,
        })
    }
}

/// Reference to an optional image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Path relative to the loader's assets root.
    Path(String),
    /// Remote location.
    Url(String),
    /// Already-encoded image bytes (PNG, JPEG, SVG, ...).
    Bytes(Arc<Vec<u8>>),
}

impl ImageSource {
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(s.to_string())
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.clone(),
            Self::Url(u) => u.clone(),
            Self::Bytes(b) => format!("<{} inline bytes>", b.len()),
        }
    }
}

/// Immutable, validated check data for a single render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckDocument {
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    pub routing_number: String,
    pub account_number: String,
    pub check_number: String,
    pub memo: Option<String>,
    pub sender_address: Address,
    pub receiver_address: Address,
    pub bank_address: Address,
    pub expire_days: Option<u32>,
    pub background: Option<ImageSource>,
    pub logo: Option<ImageSource>,
}

impl CheckDocument {
    pub fn payee(&self) -> &str {
        &self.receiver_address.name
    }

    /// Fresh MICR line from the current field values.
    pub fn micr_line(&self) -> CheckForgeResult<MicrLine> {
        encode_micr(
            &self.routing_number,
            &self.account_number,
            &self.check_number,
        )
    }

    /// Date after which the check is void, if an expiry was set.
    pub fn void_after(&self) -> Option<NaiveDate> {
        let days = self.expire_days?;
        self.issue_date.checked_add_days(Days::new(u64::from(days)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
