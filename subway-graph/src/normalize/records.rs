//! Building normalized line records from parsed feed rows.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::fields::{
    FROM_STATION_FIELDS, LINE_FIELDS, NEXT_STATION_FIELDS, OPERATOR_FIELDS, ORDER_FIELDS,
    RawRecord, REGION_FIELDS, STATION_FIELDS, TO_STATION_FIELDS,
};
use super::line_name::{LineContext, normalize_line_name, normalize_station_name, parse_order};

/// One normalized observation: a station on a line, optionally with the
/// next station along the line and/or an ordering value.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub line: String,
    pub station: String,
    pub next_station: String,
    pub order: Option<f64>,
}

/// Normalize rows from the station-registry feed. Rows without a usable
/// line and station are dropped.
pub fn station_records(rows: &[RawRecord]) -> Vec<LineRecord> {
    rows.iter()
        .filter_map(|row| {
            let operator = row.pick(OPERATOR_FIELDS);
            let region = row.pick(REGION_FIELDS);
            let ctx = LineContext {
                operator: &operator,
                region: &region,
            };

            let line = normalize_line_name(&row.pick(LINE_FIELDS), &ctx);
            let station = normalize_station_name(&row.pick(STATION_FIELDS));
            let next_station = normalize_station_name(&row.pick(NEXT_STATION_FIELDS));
            let order = parse_order(&row.pick(ORDER_FIELDS));

            (!line.is_empty() && !station.is_empty()).then_some(LineRecord {
                line,
                station,
                next_station,
                order,
            })
        })
        .collect()
}

/// Normalize rows from the distance/sequence feed.
///
/// Two recovery heuristics apply on top of [`station_records`]:
/// records carrying only from/to pairs are re-read as
/// station/next-station (an approximation, not a guaranteed mapping),
/// and a missing line is adopted from the station registry when the
/// station belongs to exactly one known line.
pub fn distance_records(rows: &[RawRecord], registry: &[LineRecord]) -> Vec<LineRecord> {
    let mut lines_by_station: HashMap<&str, HashSet<&str>> = HashMap::new();
    for record in registry {
        lines_by_station
            .entry(record.station.as_str())
            .or_default()
            .insert(record.line.as_str());
    }

    let mut records = Vec::new();
    for row in rows {
        let operator = row.pick(OPERATOR_FIELDS);
        let region = row.pick(REGION_FIELDS);
        let ctx = LineContext {
            operator: &operator,
            region: &region,
        };

        let mut line = normalize_line_name(&row.pick(LINE_FIELDS), &ctx);
        let mut station = normalize_station_name(&row.pick(STATION_FIELDS));
        let mut next_station = normalize_station_name(&row.pick(NEXT_STATION_FIELDS));
        let order = parse_order(&row.pick(ORDER_FIELDS));

        if station.is_empty() {
            station = normalize_station_name(&row.pick(FROM_STATION_FIELDS));
            if next_station.is_empty() {
                next_station = normalize_station_name(&row.pick(TO_STATION_FIELDS));
            }
            if !station.is_empty() {
                debug!(station = %station, "treating from/to pair as station/next-station");
            }
        }

        if line.is_empty() && !station.is_empty() {
            if let Some(lines) = lines_by_station.get(station.as_str()) {
                if lines.len() == 1 {
                    if let Some(only) = lines.iter().next() {
                        line = (*only).to_string();
                    }
                }
            }
        }

        if line.is_empty() || station.is_empty() {
            continue;
        }

        records.push(LineRecord {
            line,
            station,
            next_station,
            order,
        });
    }

    records
}
