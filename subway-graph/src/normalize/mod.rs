//! Feed record normalization.
//!
//! Upstream providers disagree on everything: field names, line labels,
//! whether a station is "강남" or "강남역 ". This module resolves raw
//! key/value records into canonical (line, station, next-station, order)
//! tuples that the topology and graph layers can trust.

mod fields;
mod line_name;
mod records;

pub use fields::{
    FROM_STATION_FIELDS, LINE_FIELDS, NEXT_STATION_FIELDS, OPERATOR_FIELDS, ORDER_FIELDS,
    RawRecord, REGION_FIELDS, STATION_FIELDS, TO_STATION_FIELDS, normalize_key,
};
pub use line_name::{
    LineContext, infer_region, normalize_line_name, normalize_station_name, parse_order,
};
pub use records::{LineRecord, distance_records, station_records};
