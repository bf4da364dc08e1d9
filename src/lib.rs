pub mod errors;
pub mod excel;
pub mod import_batch;
pub mod import_ts;
pub mod io_config;
pub mod json_store;
pub mod memory_store;
pub mod model_structure;
pub mod modify;
pub mod parameter_value;
pub mod store;
pub mod symbols;
pub mod time_index;

use chrono::NaiveDateTime;

pub type TimeStamp = NaiveDateTime;
pub type TimeLine = Vec<TimeStamp>;

/// Name of the implicit alternative every parameter value falls back to.
pub const BASE_ALTERNATIVE: &str = "Base";
