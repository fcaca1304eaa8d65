// Numeric extraction utilities for discrepancy detection
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::QuantityKind;

const DAY_UNITS: &str = r"(?:календар|kalendar|ish|иш)?\s*(?:kun|кун|day)";
const PERCENT_UNITS: &str = r"(?:%|процент|foiz|фоиз)";
const MONTH_UNITS: &str = r"(?:oy|ой|месяц|month)";
const YEAR_UNITS: &str = r"(?:yil|йил|год|year)";

lazy_static! {
    static ref DAYS_PATTERN: Regex = Regex::new(&format!(r"([0-9]+)\s*{}", DAY_UNITS)).unwrap();
    static ref PERCENT_PATTERN: Regex =
        Regex::new(&format!(r"([0-9]+(?:\.[0-9]+)?)\s*{}", PERCENT_UNITS)).unwrap();
    static ref MONTHS_PATTERN: Regex =
        Regex::new(&format!(r"([0-9]+)\s*{}", MONTH_UNITS)).unwrap();
    static ref YEARS_PATTERN: Regex = Regex::new(&format!(r"([0-9]+)\s*{}", YEAR_UNITS)).unwrap();
}

fn units(kind: QuantityKind) -> &'static str {
    match kind {
        QuantityKind::Days => DAY_UNITS,
        QuantityKind::Percent => PERCENT_UNITS,
        QuantityKind::Months => MONTH_UNITS,
        QuantityKind::Years => YEAR_UNITS,
    }
}

fn pattern(kind: QuantityKind) -> &'static Regex {
    match kind {
        QuantityKind::Days => &DAYS_PATTERN,
        QuantityKind::Percent => &PERCENT_PATTERN,
        QuantityKind::Months => &MONTHS_PATTERN,
        QuantityKind::Years => &YEARS_PATTERN,
    }
}

/// Every number in `text` directly followed by a unit word of `kind`, in order
pub fn extract_quantities(text: &str, kind: QuantityKind) -> Vec<f64> {
    let text_lower = text.to_lowercase();
    pattern(kind)
        .captures_iter(&text_lower)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Render a value the way discrepancy descriptions carry it ("90.0", "12.5")
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Locate the phrase around `value` in `text`: the number, its unit word and
/// everything up to the next `.` or `;`
///
/// "90.0" also matches a bare "90" in the source text.
pub fn find_phrase_with_value(text: &str, kind: QuantityKind, value: &str) -> Option<String> {
    let mut candidates = vec![value.to_string()];
    if let Some(integer) = value.strip_suffix(".0") {
        candidates.push(integer.to_string());
    }

    candidates.iter().find_map(|candidate| {
        let pattern = format!(r"(?i)\b{}\s*{}[^.;]*", regex::escape(candidate), units(kind));
        let re = Regex::new(&pattern).ok()?;
        re.find(text).map(|m| m.as_str().trim().to_string())
    })
}
