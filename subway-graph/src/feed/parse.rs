//! Multi-format feed payload parsing.
//!
//! Format selection honors the content-type hint first, then sniffs the
//! leading character. JSON payloads wrap the row array at unpredictable
//! depths, so a bounded depth-first search locates the first array of
//! objects. XML payloads are the open-data portal style: repeated
//! `<row>`/`<item>` blocks with flat field tags.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::error::ParseError;
use crate::normalize::RawRecord;

/// Depth bound for the JSON row-array search, against pathological payloads.
const MAX_JSON_DEPTH: usize = 32;

static XML_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z0-9_가-힣]+)>").unwrap());

/// The wire format of a feed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Json,
    Xml,
    Csv,
}

/// Choose a parse strategy: content-type hint first, then leading-character
/// sniffing, defaulting to CSV.
pub fn classify(text: &str, content_type: &str) -> FeedFormat {
    let hint = content_type.to_ascii_lowercase();
    if hint.contains("json") {
        return FeedFormat::Json;
    }
    if hint.contains("xml") {
        return FeedFormat::Xml;
    }
    if hint.contains("csv") {
        return FeedFormat::Csv;
    }

    match text.trim_start().chars().next() {
        Some('{') | Some('[') => FeedFormat::Json,
        Some('<') => FeedFormat::Xml,
        _ => FeedFormat::Csv,
    }
}

/// Parse a feed payload into records. An empty result means "no rows";
/// callers decide whether that is fatal.
pub fn parse_rows(text: &str, content_type: &str) -> Result<Vec<RawRecord>, ParseError> {
    let text = text.trim_start_matches('\u{feff}').trim();

    match classify(text, content_type) {
        FeedFormat::Json => parse_json_rows(text),
        FeedFormat::Xml => Ok(parse_xml_rows(text)),
        FeedFormat::Csv => parse_csv_rows(text),
    }
}

fn parse_json_rows(text: &str) -> Result<Vec<RawRecord>, ParseError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError {
        format: "JSON",
        message: e.to_string(),
    })?;

    let Some(rows) = find_row_array(&value, 0) else {
        return Ok(Vec::new());
    };

    Ok(rows.iter().filter_map(record_from_object).collect())
}

/// Depth-first search for the first non-empty array whose first element is
/// an object.
fn find_row_array(value: &Value, depth: usize) -> Option<&Vec<Value>> {
    if depth > MAX_JSON_DEPTH {
        return None;
    }

    match value {
        Value::Array(items) => {
            if matches!(items.first(), Some(Value::Object(_))) {
                return Some(items);
            }
            items.iter().find_map(|item| find_row_array(item, depth + 1))
        }
        Value::Object(map) => map.values().find_map(|v| find_row_array(v, depth + 1)),
        _ => None,
    }
}

fn record_from_object(value: &Value) -> Option<RawRecord> {
    let map = value.as_object()?;

    let mut record = RawRecord::new();
    for (key, value) in map {
        record.insert(key, scalar_string(value));
    }
    (!record.is_empty()).then_some(record)
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        composite => composite.to_string(),
    }
}

fn parse_xml_rows(text: &str) -> Vec<RawRecord> {
    // Tag matching is case-insensitive; the ASCII lowercase copy keeps
    // byte offsets aligned with the original text.
    let lower = text.to_ascii_lowercase();

    let mut records = Vec::new();
    let mut cursor = 0;
    while let Some((block, next)) = next_row_block(&lower, text, cursor) {
        let record = record_from_xml_block(block);
        if !record.is_empty() {
            records.push(record);
        }
        cursor = next;
    }
    records
}

/// Find the next `<row>`/`<item>` block at or after `from`. Returns the
/// block's inner text and the offset just past its closing tag.
fn next_row_block<'a>(lower: &str, text: &'a str, from: usize) -> Option<(&'a str, usize)> {
    let mut earliest: Option<(usize, &'static str)> = None;
    for tag in ["row", "item"] {
        let open = format!("<{tag}>");
        if let Some(pos) = lower[from..].find(&open) {
            let pos = from + pos;
            if earliest.is_none_or(|(best, _)| pos < best) {
                earliest = Some((pos, tag));
            }
        }
    }

    let (open_pos, tag) = earliest?;
    let content_start = open_pos + tag.len() + 2;
    let close = format!("</{tag}>");
    let close_pos = content_start + lower[content_start..].find(&close)?;

    Some((&text[content_start..close_pos], close_pos + close.len()))
}

fn record_from_xml_block(block: &str) -> RawRecord {
    let mut record = RawRecord::new();
    let mut cursor = 0;

    while let Some(caps) = XML_OPEN_TAG.captures(&block[cursor..]) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let value_start = cursor + whole.end();
        let name = tag.as_str();

        let close = format!("</{name}>");
        match block[value_start..].find(&close) {
            Some(rel) => {
                let value_end = value_start + rel;
                record.insert(name, decode_xml_text(&block[value_start..value_end]));
                cursor = value_end + close.len();
            }
            // Unterminated field tag: skip past the opening tag.
            None => cursor = value_start,
        }
    }

    record
}

fn decode_xml_text(value: &str) -> String {
    value
        .replace("<![CDATA[", "")
        .replace("]]>", "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

fn parse_csv_rows(text: &str) -> Result<Vec<RawRecord>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ParseError {
            format: "CSV",
            message: e.to_string(),
        })?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| ParseError {
            format: "CSV",
            message: e.to_string(),
        })?;

        let mut record = RawRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            record.insert(header, row.get(idx).unwrap_or("").to_string());
        }
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::STATION_FIELDS;

    #[test]
    fn classify_honors_content_type_hint_first() {
        assert_eq!(classify("<rows/>", "application/json"), FeedFormat::Json);
        assert_eq!(classify("{}", "text/xml"), FeedFormat::Xml);
        assert_eq!(classify("{}", "text/csv; charset=utf-8"), FeedFormat::Csv);
    }

    #[test]
    fn classify_sniffs_leading_character() {
        assert_eq!(classify("{\"a\": 1}", ""), FeedFormat::Json);
        assert_eq!(classify("  [1, 2]", ""), FeedFormat::Json);
        assert_eq!(classify("<response>", ""), FeedFormat::Xml);
        assert_eq!(classify("a,b,c", ""), FeedFormat::Csv);
    }

    #[test]
    fn json_rows_found_at_nested_depth() {
        let payload = r#"{
            "response": {
                "header": {"code": "00"},
                "body": {
                    "items": {
                        "item": [
                            {"station_nm": "강남", "line": "2호선"},
                            {"station_nm": "역삼", "line": "2호선"}
                        ]
                    }
                }
            }
        }"#;

        let rows = parse_rows(payload, "application/json").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pick(STATION_FIELDS), "강남");
    }

    #[test]
    fn json_first_array_of_objects_wins() {
        let payload = r#"{"meta": [1, 2], "rows": [{"a": "x"}], "later": [{"b": "y"}]}"#;
        let rows = parse_rows(payload, "application/json").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pick(&["a"]), "x");
    }

    #[test]
    fn json_scalars_are_stringified() {
        let payload = r#"[{"ord": 3, "open": true, "note": null}]"#;
        let rows = parse_rows(payload, "application/json").unwrap();
        assert_eq!(rows[0].pick(&["ord"]), "3");
        assert_eq!(rows[0].pick(&["open"]), "true");
        assert_eq!(rows[0].pick(&["note"]), "");
    }

    #[test]
    fn json_without_rows_is_empty_not_error() {
        let payload = r#"{"RESULT": {"CODE": "INFO-200", "MESSAGE": "no data"}}"#;
        assert!(parse_rows(payload, "application/json").unwrap().is_empty());
    }

    #[test]
    fn corrupt_json_is_a_parse_error() {
        let err = parse_rows("{not json", "application/json").unwrap_err();
        assert_eq!(err.format, "JSON");
    }

    #[test]
    fn xml_rows_with_cdata_and_entities() {
        let payload = "<response>\
            <row><station_nm><![CDATA[강남]]></station_nm><line>2호선</line></row>\
            <row><station_nm>A &amp; B</station_nm><line>&lt;2&gt;</line></row>\
        </response>";

        let rows = parse_rows(payload, "text/xml").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pick(STATION_FIELDS), "강남");
        assert_eq!(rows[1].pick(STATION_FIELDS), "A & B");
        assert_eq!(rows[1].pick(&["line"]), "<2>");
    }

    #[test]
    fn xml_item_blocks_and_mixed_case_tags() {
        let payload = "<Items><ITEM><stn_nm>사당</stn_nm></ITEM><item><stn_nm>교대</stn_nm></item></Items>";
        let rows = parse_rows(payload, "application/xml").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pick(STATION_FIELDS), "사당");
        assert_eq!(rows[1].pick(STATION_FIELDS), "교대");
    }

    #[test]
    fn xml_without_blocks_is_empty() {
        assert!(parse_rows("<response><code>00</code></response>", "text/xml")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn csv_with_quoted_fields_and_bom() {
        let payload = "\u{feff}station_nm,line,note\n강남,2호선,\"has, comma\"\n역삼,2호선,\"quoted \"\"inner\"\"\"\n";

        let rows = parse_rows(payload, "text/csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pick(STATION_FIELDS), "강남");
        assert_eq!(rows[0].pick(&["note"]), "has, comma");
        assert_eq!(rows[1].pick(&["note"]), "quoted \"inner\"");
    }

    #[test]
    fn csv_header_only_is_empty() {
        assert!(parse_rows("station_nm,line", "text/csv").unwrap().is_empty());
    }
}
