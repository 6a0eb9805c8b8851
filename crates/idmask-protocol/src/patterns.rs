//! Pattern-based PII detection over OCR'd words.
//!
//! Used for documents with no dedicated detection model: the caller supplies
//! recognized words with their boxes, and every word matching an identifier
//! pattern becomes a region. Recognition itself happens elsewhere.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::normalize::{PiiRegion, Rectangle};

/// Identifier kinds recognized from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Aadhaar,
    Pan,
    Phone,
    Email,
    DrivingLicense,
    Passport,
    CreditCard,
    DateOfBirth,
    Pincode,
    BankAccount,
    Ifsc,
}

impl PatternKind {
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::Aadhaar => "aadhaar",
            PatternKind::Pan => "pan",
            PatternKind::Phone => "phone",
            PatternKind::Email => "email",
            PatternKind::DrivingLicense => "drivingLicense",
            PatternKind::Passport => "passport",
            PatternKind::CreditCard => "creditCard",
            PatternKind::DateOfBirth => "dateOfBirth",
            PatternKind::Pincode => "pincode",
            PatternKind::BankAccount => "bankAccount",
            PatternKind::Ifsc => "ifsc",
        }
    }
}

/// Word box as reported by an OCR engine (`x0,y0` top-left, `x1,y1` bottom-right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl WordBox {
    /// Whether the box lies entirely inside `rect`, edges included.
    pub fn is_within(&self, rect: &Rectangle) -> bool {
        let right = u64::from(rect.left) + u64::from(rect.width);
        let bottom = u64::from(rect.top) + u64::from(rect.height);
        self.x0 >= rect.left
            && u64::from(self.x1) <= right
            && self.y0 >= rect.top
            && u64::from(self.y1) <= bottom
    }
}

/// One recognized word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub bbox: WordBox,
}

// Compiled regex patterns (compiled once, reused).
static AADHAAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").unwrap());
static PAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{5}[0-9]{4}[A-Z]").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\+91[\s-]?)?[789]\d{9}").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());
static DL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]{2}[0-9]{2}[A-Z0-9]{11,13}").unwrap());
static PASSPORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][0-9]{7}").unwrap());
static CC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").unwrap());
static DOB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:0[1-9]|[12]\d|3[01])[-/](?:0[1-9]|1[012])[-/]\d{4}\b").unwrap()
});
static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{6}\b").unwrap());
static BANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{9,18}\b").unwrap());
static IFSC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{4}[0-9]{7}").unwrap());

/// Scanner over a fixed, ordered pattern set.
pub struct PatternScanner {
    patterns: Vec<(PatternKind, &'static Regex)>,
}

impl PatternScanner {
    pub fn new() -> Self {
        Self {
            patterns: vec![
                (PatternKind::Aadhaar, &AADHAAR_RE),
                (PatternKind::Pan, &PAN_RE),
                (PatternKind::Phone, &PHONE_RE),
                (PatternKind::Email, &EMAIL_RE),
                (PatternKind::DrivingLicense, &DL_RE),
                (PatternKind::Passport, &PASSPORT_RE),
                (PatternKind::CreditCard, &CC_RE),
                (PatternKind::DateOfBirth, &DOB_RE),
                (PatternKind::Pincode, &PINCODE_RE),
                (PatternKind::BankAccount, &BANK_RE),
                (PatternKind::Ifsc, &IFSC_RE),
            ],
        }
    }

    /// All `(kind, matched text)` pairs in a string, in pattern order.
    pub fn matches<'t>(&self, text: &'t str) -> Vec<(PatternKind, &'t str)> {
        let mut found = Vec::new();
        for (kind, regex) in &self.patterns {
            for m in regex.find_iter(text) {
                found.push((*kind, m.as_str()));
            }
        }
        found
    }

    /// One region per match, located at the matching word's box.
    ///
    /// Overlapping kinds (an aadhaar number is also a plausible account
    /// number) each produce a region.
    pub fn scan_words(&self, words: &[OcrWord]) -> Vec<PiiRegion> {
        let mut regions = Vec::new();
        for word in words {
            if word.text.is_empty() {
                continue;
            }
            let location = Rectangle::new(
                word.bbox.x0,
                word.bbox.y0,
                word.bbox.x1.abs_diff(word.bbox.x0),
                word.bbox.y1.abs_diff(word.bbox.y0),
            );
            for (kind, value) in self.matches(&word.text) {
                regions.push(PiiRegion {
                    pattern: kind.label().to_string(),
                    text: value.to_string(),
                    location,
                });
            }
        }
        regions
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-256 of an identifier with all whitespace removed.
pub fn identifier_fingerprint(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::encode(Sha256::digest(compact.as_bytes()))
}
