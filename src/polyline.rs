//! Encoded polyline codec
//!
//! Bidirectional conversion between the compact ASCII polyline format used
//! by the directions provider and a sequence of [`Coordinate`] pairs.
//!
//! Each coordinate is stored as a pair of deltas against the previous point
//! at 1e-5 degree precision. A delta is zig-zag sign-coded, then split into
//! 5-bit groups emitted little-endian; every group is biased by 63 into the
//! printable range and the 0x20 bit marks continuation.

use thiserror::Error;

use crate::geo::Coordinate;

/// Degrees per encoded unit
const PRECISION: f64 = 1e5;

/// Errors raised while decoding an encoded polyline
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    /// The input ended in the middle of a continuation sequence
    #[error("Polyline truncated at byte offset {offset}")]
    Truncated {
        /// Byte offset where more input was expected
        offset: usize,
    },

    /// A byte outside the 63..=126 polyline alphabet
    #[error("Invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidByte {
        /// Byte offset of the offending character
        offset: usize,
        /// The offending byte
        byte: u8,
    },

    /// A continuation sequence longer than any encodable value
    #[error("Polyline value starting at byte offset {offset} is too long")]
    Overlong {
        /// Byte offset where the value started
        offset: usize,
    },
}

/// Decode an encoded polyline into coordinates
///
/// An empty input decodes to an empty sequence. Truncated or malformed
/// input is a typed error; the decoder never reads past the input boundary.
///
/// # Errors
///
/// Returns [`PolylineError`] if the input is truncated mid-value or
/// contains bytes outside the polyline alphabet.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::new();
    let mut cursor = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while cursor < bytes.len() {
        lat += read_delta(bytes, &mut cursor)?;
        lng += read_delta(bytes, &mut cursor)?;
        coordinates.push(Coordinate {
            lat: lat as f64 / PRECISION,
            lng: lng as f64 / PRECISION,
        });
    }

    Ok(coordinates)
}

/// Encode coordinates into the compact polyline form
///
/// Input is rounded to 1e-5 degree precision; [`decode`] of the result
/// yields the rounded sequence exactly.
#[must_use]
pub fn encode(coordinates: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for coordinate in coordinates {
        let lat = scale(coordinate.lat);
        let lng = scale(coordinate.lng);
        write_delta(lat - prev_lat, &mut out);
        write_delta(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

/// Read one zig-zag coded delta, advancing the cursor
fn read_delta(bytes: &[u8], cursor: &mut usize) -> Result<i64, PolylineError> {
    let start = *cursor;
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*cursor) else {
            return Err(PolylineError::Truncated { offset: *cursor });
        };
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte {
                offset: *cursor,
                byte,
            });
        }
        if shift >= u64::BITS {
            return Err(PolylineError::Overlong { offset: start });
        }
        *cursor += 1;

        let group = u64::from(byte - 63);
        value |= (group & 0x1f) << shift;
        shift += 5;

        if group & 0x20 == 0 {
            break;
        }
    }

    let value = value as i64;
    Ok(if value & 1 == 1 {
        !(value >> 1)
    } else {
        value >> 1
    })
}

/// Append one zig-zag coded delta
fn write_delta(delta: i64, out: &mut String) {
    let mut value = ((delta << 1) ^ (delta >> 63)) as u64;
    loop {
        let mut group = (value & 0x1f) as u8;
        value >>= 5;
        if value != 0 {
            group |= 0x20;
        }
        out.push(char::from(group + 63));
        if value == 0 {
            break;
        }
    }
}

/// Round decimal degrees to encoded units
fn scale(degrees: f64) -> i64 {
    (degrees * PRECISION).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    // Reference vector from the provider's algorithm documentation
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    #[test]
    fn test_decode_reference_vector() {
        let points = decode(REFERENCE).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], coord(38.5, -120.2));
        assert_eq!(points[1], coord(40.7, -120.95));
        assert_eq!(points[2], coord(43.252, -126.453));
    }

    #[test]
    fn test_encode_reference_vector() {
        let points = [
            coord(38.5, -120.2),
            coord(40.7, -120.95),
            coord(43.252, -126.453),
        ];
        assert_eq!(encode(&points), REFERENCE);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode("").unwrap(), Vec::new());
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_single_point() {
        let encoded = encode(&[coord(17.385, 78.4867)]);
        let points = decode(&encoded).unwrap();
        assert_eq!(points, vec![coord(17.385, 78.4867)]);
    }

    #[test]
    fn test_round_trip() {
        let points = vec![
            coord(17.385, 78.4867),
            coord(17.38512, 78.48705),
            coord(17.38499, 78.48921),
            coord(-33.86882, 151.20929),
            coord(0.0, 0.0),
        ];
        let decoded = decode(&encode(&points)).unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn test_round_trip_negative_deltas() {
        let points = vec![coord(10.0, 10.0), coord(9.99999, 9.99998), coord(-5.5, -5.5)];
        assert_eq!(decode(&encode(&points)).unwrap(), points);
    }

    #[test]
    fn test_decode_truncated() {
        // Drop the final byte so the last value never terminates
        let mut encoded = REFERENCE.to_string();
        encoded.pop();
        let err = decode(&encoded).unwrap_err();
        assert!(matches!(err, PolylineError::Truncated { .. }));
    }

    #[test]
    fn test_decode_truncated_mid_pair() {
        // A lone latitude value with no longitude following it
        let encoded = encode(&[coord(38.5, -120.2)]);
        let lat_only = &encoded[..encoded.len() / 2];
        let err = decode(lat_only).unwrap_err();
        assert!(matches!(
            err,
            PolylineError::Truncated { .. } | PolylineError::InvalidByte { .. }
        ));
    }

    #[test]
    fn test_decode_invalid_byte() {
        let err = decode("_p~iF\u{1}").unwrap_err();
        assert!(matches!(err, PolylineError::InvalidByte { byte: 0x01, .. }));
    }

    #[test]
    fn test_decode_overlong_value() {
        // 14 continuation groups exceed the 64-bit accumulator
        let overlong: String = std::iter::repeat_n('~', 14).collect();
        let err = decode(&overlong).unwrap_err();
        assert_eq!(err, PolylineError::Overlong { offset: 0 });
    }

    #[test]
    fn test_error_display_offsets() {
        let err = PolylineError::Truncated { offset: 7 };
        assert!(err.to_string().contains('7'));
    }
}
