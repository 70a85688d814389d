use crate::models::{SalaryPeriod, SalaryRange};
use regex::Regex;
use std::sync::OnceLock;

fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(lakhs?|k|m|l)?\b").expect("Invalid regex")
    })
}

/// Extracts a structured range from free-text salary strings such as
/// `"$80,000–$120,000 a year"`, `"80K–120K"` or `"₹10L - 15L"`.
#[must_use]
pub fn parse_salary(text: &str) -> Option<SalaryRange> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let amounts: Vec<(f64, Option<f64>)> = amount_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let value: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
            let multiplier = caps.get(2).map(|m| unit_multiplier(m.as_str()));
            Some((value, multiplier))
        })
        .take(2)
        .collect();

    let (min, max) = match amounts.as_slice() {
        [] => return None,
        [(value, unit)] => {
            let single = value * unit.unwrap_or(1.0);
            (single, single)
        }
        [(low, low_unit), (high, high_unit), ..] => {
            // "80-120K" carries the unit on the upper bound only
            let low_unit = low_unit.or(*high_unit).unwrap_or(1.0);
            let high_unit = high_unit.unwrap_or(1.0);
            (low * low_unit, high * high_unit)
        }
    };

    #[allow(clippy::cast_possible_truncation)]
    let (min, max) = (min.round() as i64, max.round() as i64);
    let (min, max) = if min > max { (max, min) } else { (min, max) };

    Some(SalaryRange {
        min,
        max,
        currency: detect_currency(text).to_string(),
        period: detect_period(text),
    })
}

fn unit_multiplier(unit: &str) -> f64 {
    match unit.to_lowercase().as_str() {
        "k" => 1_000.0,
        "m" => 1_000_000.0,
        "l" | "lakh" | "lakhs" => 100_000.0,
        _ => 1.0,
    }
}

fn detect_currency(text: &str) -> &'static str {
    let upper = text.to_uppercase();

    if text.contains('₹') || upper.contains("INR") || upper.contains("LAKH") {
        "INR"
    } else if text.contains('£') || upper.contains("GBP") {
        "GBP"
    } else if text.contains('€') || upper.contains("EUR") {
        "EUR"
    } else {
        "USD"
    }
}

fn detect_period(text: &str) -> SalaryPeriod {
    let lower = text.to_lowercase();

    if lower.contains("hour") || lower.contains("/hr") {
        SalaryPeriod::Hour
    } else if lower.contains("day") {
        SalaryPeriod::Day
    } else if lower.contains("week") {
        SalaryPeriod::Week
    } else if lower.contains("month") {
        SalaryPeriod::Month
    } else {
        SalaryPeriod::Year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annual_range() {
        let range = parse_salary("$80,000–$120,000 a year").unwrap();
        assert_eq!(range.min, 80_000);
        assert_eq!(range.max, 120_000);
        assert_eq!(range.currency, "USD");
        assert_eq!(range.period, SalaryPeriod::Year);
    }

    #[test]
    fn test_parse_shorthand_units() {
        let range = parse_salary("80K–120K a year").unwrap();
        assert_eq!((range.min, range.max), (80_000, 120_000));

        let range = parse_salary("80-120k").unwrap();
        assert_eq!((range.min, range.max), (80_000, 120_000));

        let range = parse_salary("₹10L - 15L").unwrap();
        assert_eq!((range.min, range.max), (1_000_000, 1_500_000));
        assert_eq!(range.currency, "INR");
    }

    #[test]
    fn test_parse_single_value() {
        let range = parse_salary("$45 an hour").unwrap();
        assert_eq!((range.min, range.max), (45, 45));
        assert_eq!(range.period, SalaryPeriod::Hour);

        let range = parse_salary("£50k").unwrap();
        assert_eq!((range.min, range.max), (50_000, 50_000));
        assert_eq!(range.currency, "GBP");
    }

    #[test]
    fn test_parse_monthly() {
        let range = parse_salary("€3,500 - €4,200 per month").unwrap();
        assert_eq!((range.min, range.max), (3_500, 4_200));
        assert_eq!(range.currency, "EUR");
        assert_eq!(range.period, SalaryPeriod::Month);
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(parse_salary(""), None);
        assert_eq!(parse_salary("Competitive"), None);
    }
}
