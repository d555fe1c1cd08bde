//! Graph model, assembly, persistence, and validation.
//!
//! A station appears once per line it serves ("station instance"); one
//! JSON file per line grouping holds that line's instances. The files
//! are the sole contract with the query-serving side, which unions them
//! back into a single in-memory graph.

mod assemble;
mod model;
mod store;
mod validate;

pub use assemble::{
    LineGrouping, TransferIndex, assemble_line_groupings, build_line_adjacency, line_file_name,
    line_suffix, link_same_name_transfers, partition_by_line, station_id,
};
pub use model::{NameIndex, StationInstance, SubwayGraph};
pub use store::{GraphStore, StoreError};
pub use validate::{MANAGED_LINE_FILES, ValidationReport, validate};
