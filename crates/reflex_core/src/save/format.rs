use super::error::GeometryError;
use crate::geometry::{Rect, ZoneSet, ZONE_COUNT};

pub const FIELD_DELIMITER: char = ',';

/// Four corner coordinates per zone.
pub const TOKEN_COUNT: usize = ZONE_COUNT * 4;

/// Serialize all zones in fixed order, one decimal per value, no trailing newline.
pub fn encode_zone_set(zones: &ZoneSet) -> String {
    let mut tokens = Vec::with_capacity(TOKEN_COUNT);
    for (_, rect) in zones.iter() {
        tokens.extend(rect.coords().iter().map(|v| format!("{v:.1}")));
    }
    tokens.join(",")
}

/// Parse a settings record. Only the first line is considered; any deviation
/// from exactly 24 numeric tokens is rejected without returning partial data.
pub fn decode_zone_set(record: &str) -> Result<ZoneSet, GeometryError> {
    let line = record.lines().next().map(str::trim).unwrap_or_default();
    if line.is_empty() {
        return Err(GeometryError::Empty);
    }

    let tokens: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
    if tokens.len() != TOKEN_COUNT {
        return Err(GeometryError::TokenCount { found: tokens.len(), expected: TOKEN_COUNT });
    }

    let mut values = [0.0f32; TOKEN_COUNT];
    for (index, token) in tokens.iter().enumerate() {
        values[index] = token
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GeometryError::InvalidNumber { index, token: token.to_string() })?;
    }

    let mut zones = [Rect::default(); ZONE_COUNT];
    for (zone, chunk) in zones.iter_mut().zip(values.chunks_exact(4)) {
        *zone = Rect::from_coords([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(ZoneSet::new(zones))
}
