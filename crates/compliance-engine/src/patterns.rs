//! Regex patterns and keyword tables shared by segmentation and tagging

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Numeric label followed by a capitalized title, e.g. "1.2.3. Umumiy qoidalar"
    pub static ref SECTION_HEADER: Regex =
        Regex::new(r"^\s*[0-9]+\.(?:[0-9]+\.)*\s+[A-ZА-ЯЁЎҚҒҲ]").unwrap();

    /// Leading numeric label, captured without surrounding whitespace
    pub static ref SECTION_NUMBER: Regex =
        Regex::new(r"^\s*([0-9]+\.(?:[0-9]+\.)*)").unwrap();

    /// Uppercase first letter in either script
    pub static ref LEADING_CAPITAL: Regex = Regex::new(r"^[A-ZА-ЯЁЎҚҒҲ]").unwrap();

    /// A line holding nothing but a page number
    pub static ref PAGE_NUMBER_LINE: Regex = Regex::new(r"^\s*[0-9]+\s*$").unwrap();
}

/// Interest rate wording
pub const INTEREST_RATE_KEYWORDS: &[&str] =
    &["процентная ставка", "foiz stavkasi", "фоиз ставкаси"];

/// Collateral / pledge wording
pub const COLLATERAL_KEYWORDS: &[&str] = &["залог", "garov", "гаров"];

/// Client-rights disclosures the bank must include
pub const MANDATORY_DISCLOSURE_KEYWORDS: &[&str] =
    &["клиент имеет право", "mijoz huquqi", "мижоз ҳуқуқи"];

/// Options ticked on the client's behalf
pub const PRE_SELECTED_KEYWORDS: &[&str] = &[
    "по умолчанию",
    "avtomatik tanlangan",
    "автоматик танланган",
    "☑",
    "✓",
];

/// State-language requirement
pub const LANGUAGE_REQUIREMENT_KEYWORDS: &[&str] =
    &["государственный язык", "davlat tili", "давлат тили"];

/// Default hotspot categories in reporting order
pub const DEFAULT_HOTSPOTS: &[(&str, &[&str])] = &[
    ("interest_rate", INTEREST_RATE_KEYWORDS),
    ("collateral", COLLATERAL_KEYWORDS),
    ("mandatory_disclosure", MANDATORY_DISCLOSURE_KEYWORDS),
    ("pre_selected", PRE_SELECTED_KEYWORDS),
    ("language_requirement", LANGUAGE_REQUIREMENT_KEYWORDS),
];

/// Length of the leading whitespace run of an untrimmed line, in characters
pub fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// First `max_chars` characters of `text`, with "..." appended when truncated
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
