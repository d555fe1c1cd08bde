//! Semantic field resolution over heterogeneous feed records.
//!
//! Each semantic role (line, station, ...) has a fixed, ordered candidate
//! list of field names observed across providers, including the Korean
//! open-data spellings. Keys are matched case-insensitively after stripping
//! everything that is not a letter, digit, or Hangul syllable, so
//! `STATN_NM`, `statn-nm`, and `statnnm` all resolve the same way.

use std::collections::HashMap;

/// Candidate field names for the line label.
pub const LINE_FIELDS: &[&str] = &[
    "line",
    "line_nm",
    "line_num",
    "line_no",
    "linecode",
    "line_name",
    "sbwy_rout_ln_nm",
    "route",
    "route_nm",
    "ln_cd",
    "호선",
    "호선명",
    "노선",
    "노선명",
];

/// Candidate field names for the station name.
pub const STATION_FIELDS: &[&str] = &[
    "station",
    "station_nm",
    "station_name",
    "stn_nm",
    "statn_nm",
    "from_station",
    "from_stn",
    "source_station",
    "start_station",
    "fr_station",
    "fr_stn",
    "stin_nm",
    "sbwy_stns_nm",
    "역명",
    "전철역명",
    "지하철역명",
];

/// Candidate field names for the next station along the line.
pub const NEXT_STATION_FIELDS: &[&str] = &[
    "next_station",
    "next_station_nm",
    "next_station_name",
    "to_station",
    "to_stn",
    "target_station",
    "end_station",
    "dest_station",
    "arrive_station",
    "next_stn_nm",
    "tbg_station",
    "to_statn_nm",
    "도착역",
    "다음역",
];

/// Candidate field names for the ordering value (sequence number or
/// cumulative distance).
pub const ORDER_FIELDS: &[&str] = &[
    "station_order",
    "ord",
    "seq",
    "idx",
    "sort",
    "rank",
    "acml_dist",
    "acml_dstn",
    "distance_sum",
    "누계거리",
    "순번",
    "역순번",
];

/// Candidate field names for the origin of an edge-style record.
pub const FROM_STATION_FIELDS: &[&str] = &[
    "from_station",
    "from_stn",
    "source_station",
    "start_station",
    "fr_station",
    "fr_stn",
    "fr_statn_nm",
    "출발역",
];

/// Candidate field names for the destination of an edge-style record.
pub const TO_STATION_FIELDS: &[&str] = &[
    "to_station",
    "to_stn",
    "target_station",
    "end_station",
    "tbg_station",
    "to_statn_nm",
    "도착역",
];

/// Candidate field names for the operating agency.
pub const OPERATOR_FIELDS: &[&str] = &[
    "operator",
    "operator_nm",
    "corp",
    "corp_nm",
    "railway_company",
    "company",
    "관리기관",
    "운영기관",
    "운영사",
    "철도운영기관",
];

/// Candidate field names for the region/city.
pub const REGION_FIELDS: &[&str] = &[
    "city", "region", "area", "sido", "sigungu", "loc", "location", "지역", "권역", "시도",
];

/// Normalize a field key for candidate matching: lowercase, keeping only
/// ASCII alphanumerics and Hangul syllables.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || ('가'..='힣').contains(c))
        .collect()
}

/// One parsed feed row: a mapping from normalized field key to raw value.
///
/// When two raw keys normalize to the same key, the later one wins
/// (matching how the providers' own duplicated columns behave).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from raw key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert(key.as_ref(), value);
        }
        record
    }

    /// Insert a raw key/value pair, normalizing the key.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(normalize_key(key), value.into());
    }

    /// Resolve the first candidate whose value is non-empty after trimming.
    /// Returns an empty string when no candidate matches.
    pub fn pick(&self, candidates: &[&str]) -> String {
        for candidate in candidates {
            if let Some(value) = self.fields.get(&normalize_key(candidate)) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
        String::new()
    }

    /// Normalized keys present in this record, for diagnostics.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
