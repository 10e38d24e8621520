//! Timezone offsets for format parameters.
//!
//! Generated code carries timezones as a fixed offset in minutes, measured
//! from the zone to GMT (the sign convention of the host platform's
//! `TimeZone.createTimeZone`). Ids are parsed at generation time:
//!
//! | Id | Raw offset |
//! |----|------------|
//! | `America/New_York`, `EST`, `Europe/Paris` | standard offset of the tz database zone, without DST |
//! | `Z`, `UT` | `0` |
//! | `GMT+02:00`, `UTC-5`, `+05:30` | as written |

use beanmap_core::Diagnostics;
use chrono::{FixedOffset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use std::str::FromStr;

const HOUR_SECONDS: i32 = 3600;

/// Offset from GMT of `zone` in milliseconds, `None` for unknown ids.
pub fn raw_offset_millis(zone: &str) -> Option<i64> {
    let zone = zone.trim();
    if let Ok(tz) = Tz::from_str(zone) {
        let offset = tz.offset_from_utc_datetime(&Utc::now().naive_utc());
        return Some(offset.base_utc_offset().num_milliseconds());
    }
    let offset = match zone {
        "UT" | "Z" => FixedOffset::east_opt(0)?,
        _ => {
            let signed = ["GMT", "UTC", "UT"]
                .iter()
                .find_map(|prefix| zone.strip_prefix(prefix))
                .unwrap_or(zone);
            parse_signed_offset(signed)?
        }
    };
    Some(i64::from(offset.local_minus_utc()) * 1000)
}

fn parse_signed_offset(s: &str) -> Option<FixedOffset> {
    if let Ok(offset) = FixedOffset::from_str(s) {
        return Some(offset);
    }
    let (sign, digits) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => return None,
    };
    if !digits.is_ascii() {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * HOUR_SECONDS + minutes * 60))
}

/// Convert a raw offset from GMT in milliseconds into minutes from the zone to GMT.
///
/// # Examples
///
/// ```
/// use beanmap_codegen::timezone::gmt_offset_minutes;
///
/// assert_eq!(gmt_offset_minutes(-18_000_000), 300);
/// assert_eq!(gmt_offset_minutes(3_600_000), -60);
/// ```
pub fn gmt_offset_minutes(raw_offset_millis: i64) -> i32 {
    let minutes = raw_offset_millis / 1000 / 60 * -1;
    i32::try_from(minutes).unwrap_or(0)
}

/// Minutes-to-GMT offset of `zone`, falling back to GMT with a warning for unknown ids.
pub fn zone_offset_minutes(zone: &str, diagnostics: &mut Diagnostics) -> i32 {
    match raw_offset_millis(zone) {
        Some(raw) => gmt_offset_minutes(raw),
        None => {
            diagnostics.warn(format!(
                "Unknown timezone '{zone}', falling back to GMT"
            ));
            0
        }
    }
}
