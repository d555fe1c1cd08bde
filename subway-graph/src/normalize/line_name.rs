//! Canonical line-label and station-name normalization.
//!
//! Raw line labels arrive as "2호선", "02호선", "line2", a bare "2", or a
//! region-qualified form like "부산 1호선". Normalization is deterministic
//! and idempotent: feeding a canonical label back in returns it unchanged.

use std::sync::LazyLock;

use regex::Regex;

static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([1-9])호선").unwrap());
static BARE_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([1-9])$").unwrap());
static LINE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^line([1-9])$").unwrap());
static GENERIC_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"수도권전철|도시철도|지하철").unwrap());

/// Known metro regions, in match-priority order, with the operator/region
/// name fragments that identify them.
const REGION_MARKERS: &[(&str, &[&str])] = &[
    ("서울", &["서울교통공사", "서울메트로", "서울시", "서울"]),
    ("인천", &["인천교통공사", "인천"]),
    ("부산", &["부산교통공사", "부산"]),
    ("대구", &["대구교통공사", "대구"]),
    ("광주", &["광주교통공사", "광주"]),
    ("대전", &["대전교통공사", "대전"]),
];

/// Named light-rail and commuter lines whose labels are kept, minus the
/// generic network qualifiers.
const NAMED_LINES: &[&str] = &[
    "경의중앙",
    "경춘",
    "수인분당",
    "서해",
    "신림",
    "우이신설",
    "김포골드",
    "공항철도",
    "의정부경전철",
    "에버라인",
    "용인경전철",
];

/// Operator/region context used to disambiguate bare numeric lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext<'a> {
    pub operator: &'a str,
    pub region: &'a str,
}

/// Infer the metro region from the raw label plus operator/region context.
///
/// Returns `None` when no known fragment matches.
pub fn infer_region(raw_line: &str, operator: &str, region: &str) -> Option<&'static str> {
    let joined: String = format!("{raw_line} {operator} {region}")
        .split_whitespace()
        .collect();

    for (name, markers) in REGION_MARKERS {
        if markers.iter().any(|marker| joined.contains(marker)) {
            return Some(name);
        }
    }
    None
}

/// Canonicalize a raw line label.
pub fn normalize_line_name(value: &str, ctx: &LineContext) -> String {
    let raw: String = value.split_whitespace().collect();
    if raw.is_empty() {
        return String::new();
    }

    // Sinbundang must be tested before the plain Bundang substring,
    // since "신분당선" contains "분당".
    if raw.contains("신분당") {
        return "신분당선".to_string();
    }
    if raw.contains("수인분당") || raw.contains("분당") {
        return "분당선".to_string();
    }

    if NAMED_LINES.iter().any(|name| raw.contains(name)) {
        return GENERIC_QUALIFIER.replace_all(&raw, "").into_owned();
    }

    let digit = NUMBERED_LINE
        .captures(&raw)
        .or_else(|| BARE_DIGIT.captures(&raw))
        .or_else(|| LINE_WORD.captures(&raw))
        .map(|caps| caps[1].to_string());

    if let Some(digit) = digit {
        return match infer_region(&raw, ctx.operator, ctx.region) {
            Some(region) if region != "서울" => format!("{region}{digit}호선"),
            _ => format!("{digit}호선"),
        };
    }

    raw
}

/// Normalize a station display name: remove whitespace and the trailing
/// "역" suffix.
pub fn normalize_station_name(value: &str) -> String {
    let name: String = value.split_whitespace().collect();
    name.strip_suffix("역").unwrap_or(&name).to_string()
}

/// Parse an order value (sequence number or cumulative distance) as a
/// finite number. Comma thousands separators are tolerated; anything
/// non-numeric, including the empty string, is `None`.
pub fn parse_order(value: &str) -> Option<f64> {
    let cleaned = value.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
