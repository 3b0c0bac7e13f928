// Zone geometry persistence
// One text line, 24 comma-separated numbers, written atomically

pub mod error;
pub mod format;
pub mod manager;

pub use error::GeometryError;
pub use format::{decode_zone_set, encode_zone_set, FIELD_DELIMITER, TOKEN_COUNT};
pub use manager::GeometryStore;
