//! Geodetic unit conversions: DMS → decimal degrees, lat/lon → UTM, and
//! GPS week/time-of-week → UTC.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use crate::error::DecodeError;

/// Constant GPS→UTC leap-second offset. The source system uses a fixed
/// 16 s correction instead of a historical leap-second table; downstream
/// consumers depend on the resulting timestamps, so it stays fixed.
pub const GPS_LEAP_SECONDS: i64 = 16;

const SECONDS_PER_WEEK: i64 = 604_800;

/// Degrees/minutes/seconds to signed decimal degrees. The sign flips for
/// the western and southern hemispheres.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, reference: &str) -> f64 {
    let dd = degrees + minutes / 60.0 + seconds / 3600.0;
    if matches!(reference.trim(), "W" | "S") {
        -dd
    } else {
        dd
    }
}

/// Converts an EXIF-style coordinate tuple: either 3 plain numbers or 6
/// numbers forming 3 numerator/denominator pairs. Any other element
/// count is a hard error.
pub fn convert_latlon(parts: &[f64], reference: &str) -> Result<f64, DecodeError> {
    match parts.len() {
        3 => Ok(dms_to_decimal(parts[0], parts[1], parts[2], reference)),
        6 => Ok(dms_to_decimal(
            ratio(parts[0], parts[1]),
            ratio(parts[2], parts[3]),
            ratio(parts[4], parts[5]),
            reference,
        )),
        n => Err(DecodeError::InvalidCoordinateFormat(n)),
    }
}

// zero denominators leave the numerator unconverted, like evaldiv
fn ratio(num: f64, den: f64) -> f64 {
    if den != 0.0 {
        num / den
    } else {
        num
    }
}

/// UTM coordinates of one geodetic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmCoords {
    pub easting: f64,
    pub northing: f64,
    pub zone_number: u8,
    pub zone_letter: char,
}

/// Projects WGS84 lat/lon to UTM. `None` outside the latitude band of
/// the projection (beyond 84°N/80°S).
pub fn to_utm(latitude: f64, longitude: f64) -> Option<UtmCoords> {
    if !(-80.0..=84.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    let zone_number = utm::lat_lon_to_zone_number(latitude, longitude);
    let zone_letter = utm::lat_to_zone_letter(latitude)?;
    let (northing, easting, _meridian_convergence) =
        utm::to_utm_wgs84(latitude, longitude, zone_number);
    Some(UtmCoords {
        easting,
        northing,
        zone_number,
        zone_letter,
    })
}

/// UTC timestamp from a GPS week number and millisecond-of-week, with
/// the constant leap-second correction.
pub fn utc_from_gps(gps_week: u16, time_of_week_ms: u32) -> Option<DateTime<Utc>> {
    let epoch = Utc.with_ymd_and_hms(1980, 1, 6, 0, 0, 0).single()?;
    let seconds =
        gps_week as i64 * SECONDS_PER_WEEK + time_of_week_ms as i64 / 1000 - GPS_LEAP_SECONDS;
    Some(epoch + Duration::seconds(seconds))
}

/// `"%Y-%m-%d %H:%M:%S"`, or the `T`-separated variant used for GPX-style
/// consumers.
pub fn format_gps_time(time: &DateTime<Utc>, gpx_style: bool) -> String {
    if gpx_style {
        time.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Renders the packed FFF timestamp triple (unix seconds, milliseconds,
/// timezone minutes west of UTC) in the local offset it was taken in.
/// Whole-second stamps carry no fractional part.
pub fn isotimestr(secs: u32, millis: u32, tz_minutes: i16) -> Option<String> {
    let offset = FixedOffset::east_opt(-(tz_minutes as i32) * 60)?;
    let time = offset.timestamp_opt(secs as i64, 0).single()? + Duration::milliseconds(millis as i64);
    let rendered = if millis == 0 {
        time.format("%Y-%m-%d %H:%M:%S%:z")
    } else {
        time.format("%Y-%m-%d %H:%M:%S%.6f%:z")
    };
    Some(rendered.to_string())
}
