//! Annotation objects, their pixel geometry and the interactive drawing engine.

mod engine;
pub mod geometry;
mod history;
mod object;
mod persistence;

pub use engine::{DrawingConfig, DrawingEngine, DrawingState};
pub use geometry::{DrawingGeometry, geometry, handle_at, hit_distance, hit_test};
pub use history::{DEFAULT_HISTORY_LIMIT, DrawingHistory, DrawingSet};
pub use object::{
    ActiveTool, DrawingId, DrawingObject, DrawingStyle, DrawingTool, FIBONACCI_RATIOS,
    fibonacci_levels,
};
pub use persistence::{
    DRAWINGS_JSON_SCHEMA_V1, DrawingsJsonContractV1, drawings_from_json_compat_str,
    drawings_to_json_contract_v1_pretty,
};
