//! Encoded polyline codec (Google polyline algorithm, precision 1e-5).
//!
//! Coordinates are delta-encoded, zig-zag sign-folded, and emitted in
//! 5-bit chunks offset by 63. This matches what the routing backend
//! returns with `geometries=polyline`.

/// Decode an encoded polyline into (lat, lng) pairs.
pub fn decode(encoded: &str) -> Vec<(f64, f64)> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let (delta_lat, next) = match decode_value(bytes, index) {
            Some(v) => v,
            None => break,
        };
        index = next;
        lat += delta_lat;

        let (delta_lng, next) = match decode_value(bytes, index) {
            Some(v) => v,
            None => break,
        };
        index = next;
        lng += delta_lng;

        points.push((lat as f64 / 1e5, lng as f64 / 1e5));
    }

    points
}

fn decode_value(bytes: &[u8], mut index: usize) -> Option<(i64, usize)> {
    let mut shift = 0u32;
    let mut result: i64 = 0;

    loop {
        let b = (*bytes.get(index)? as i64) - 63;
        index += 1;
        result |= (b & 0x1f) << shift;
        shift += 5;
        if b < 0x20 {
            break;
        }
    }

    let value = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Some((value, index))
}

/// Encode (lat, lng) pairs into a polyline string.
pub fn encode(points: &[(f64, f64)]) -> String {
    let mut result = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for &(lat, lng) in points {
        let lat_e5 = (lat * 1e5).round() as i64;
        let lng_e5 = (lng * 1e5).round() as i64;

        encode_value(lat_e5 - prev_lat, &mut result);
        encode_value(lng_e5 - prev_lng, &mut result);

        prev_lat = lat_e5;
        prev_lng = lng_e5;
    }

    result
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push((((0x20 | (v & 0x1f)) + 63) as u8) as char);
        v >>= 5;
    }
    out.push(((v + 63) as u8) as char);
}

/// Merge consecutive polyline segments into one, dropping the first point
/// of each subsequent segment (it duplicates the previous segment's last).
pub fn combine(polylines: &[String]) -> String {
    if polylines.is_empty() {
        return String::new();
    }
    if polylines.len() == 1 {
        return polylines[0].clone();
    }

    let mut all_points: Vec<(f64, f64)> = Vec::new();
    for polyline in polylines {
        let mut points = decode(polyline);
        if !all_points.is_empty() && !points.is_empty() {
            points.remove(0);
        }
        all_points.extend(points);
    }

    encode(&all_points)
}
