//! Declarative per-field validation and sanitization
//!
//! Rules run in order against a mutable field bag. Sanitization mutates the
//! bag in place so downstream code always reads cleaned values, whatever the
//! validation outcome. Failures are collected, never short-circuited, so the
//! form can show every error at once.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;

/// Submitted form fields, keyed by field name in form order
pub type FieldBag = IndexMap<&'static str, String>;

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Predicate applied after sanitization
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// No predicate, sanitize only
    None,
    /// Value must be non-empty after trimming
    NonEmpty,
    /// Empty passes; anything else must parse as an ISO-8601 date
    OptionalIsoDate,
}

/// One declarative rule: which field, how to clean it, what must hold
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub trim: bool,
    pub escape: bool,
    pub check: Check,
    pub message: &'static str,
}

/// Rules for the copy create/update form, in form order
pub const COPY_FORM_RULES: &[FieldRule] = &[
    FieldRule {
        field: "book",
        trim: true,
        escape: true,
        check: Check::NonEmpty,
        message: "Book must be specified",
    },
    FieldRule {
        field: "imprint",
        trim: true,
        escape: true,
        check: Check::NonEmpty,
        message: "Imprint must be specified",
    },
    // Enumeration membership is enforced by the store's CHECK constraint,
    // not here.
    FieldRule {
        field: "status",
        trim: false,
        escape: true,
        check: Check::None,
        message: "",
    },
    FieldRule {
        field: "due_back",
        trim: false,
        escape: false,
        check: Check::OptionalIsoDate,
        message: "Invalid date",
    },
];

/// Run the rules over the bag, sanitizing in place and collecting failures
pub fn run(rules: &[FieldRule], bag: &mut FieldBag) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for rule in rules {
        let value = bag.entry(rule.field).or_default();

        if rule.trim {
            *value = value.trim().to_string();
        }
        if rule.escape {
            *value = escape(value);
        }

        let passed = match rule.check {
            Check::None => true,
            Check::NonEmpty => !value.is_empty(),
            Check::OptionalIsoDate => value.is_empty() || parse_iso_date(value).is_some(),
        };

        if !passed {
            errors.push(FieldError {
                field: rule.field,
                message: rule.message,
            });
        }
    }

    errors
}

/// Escape markup-significant characters in untrusted input
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse an ISO-8601 value: a plain date (midnight UTC) or an RFC 3339
/// datetime
pub fn parse_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Utc
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single();
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
