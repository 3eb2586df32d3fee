//! Encoded polyline decoding.
//!
//! The format stores each coordinate as the signed delta from the previous
//! one, scaled by 1e5 and zig-zag encoded, split into 5-bit chunks, each
//! chunk offset by 63 into printable ASCII.  A chunk below `0x20` ends a
//! value.

use evac_core::GeoPoint;

use crate::{TransitError, TransitResult};

const PRECISION: f64 = 1e5;

/// Seven 5-bit chunks hold any delta between two valid coordinates.
const MAX_SHIFT: u32 = 35;

/// Largest absolute latitude / longitude in fixed-point units.
const MAX_LAT: i64 = 90 * 100_000;
const MAX_LON: i64 = 180 * 100_000;

/// Decode an encoded polyline into `(lat, lon)` points.
///
/// ```
/// use evac_transit::decode_polyline;
///
/// let pts = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(pts.len(), 3);
/// assert!((pts[0].lat - 38.5).abs() < 1e-9);
/// assert!((pts[2].lon - -126.453).abs() < 1e-9);
/// ```
///
/// # Errors
///
/// [`TransitError::TruncatedPolyline`] if the input ends inside a value or
/// after a latitude with no longitude; [`TransitError::InvalidPolyline`]
/// for bytes outside the encoding alphabet;
/// [`TransitError::PolylineOutOfRange`] for a value wider than seven chunks
/// or a running coordinate outside ±90° / ±180°.
pub fn decode_polyline(encoded: &str) -> TransitResult<Vec<GeoPoint>> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let (mut lat, mut lon) = (0i64, 0i64);

    while index < bytes.len() {
        lat = accumulate(lat, next_value(bytes, &mut index)?, MAX_LAT, index)?;
        if index >= bytes.len() {
            return Err(TransitError::TruncatedPolyline(index));
        }
        lon = accumulate(lon, next_value(bytes, &mut index)?, MAX_LON, index)?;
        points.push(GeoPoint::new(lat as f64 / PRECISION, lon as f64 / PRECISION));
    }
    Ok(points)
}

fn accumulate(total: i64, delta: i64, limit: i64, offset: usize) -> TransitResult<i64> {
    total
        .checked_add(delta)
        .filter(|v| v.abs() <= limit)
        .ok_or(TransitError::PolylineOutOfRange(offset))
}

/// Read one zig-zag encoded value starting at `*index`.
fn next_value(bytes: &[u8], index: &mut usize) -> TransitResult<i64> {
    let mut result: i64 = 0;
    let mut shift = 0u32;
    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(TransitError::TruncatedPolyline(*index));
        };
        if !(63..=126).contains(&byte) {
            return Err(TransitError::InvalidPolyline { ch: byte as char, offset: *index });
        }
        if shift >= MAX_SHIFT {
            return Err(TransitError::PolylineOutOfRange(*index));
        }
        *index += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}
