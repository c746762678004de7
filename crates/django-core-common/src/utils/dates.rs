//! Time zone conversion and lenient date parsing.
//!
//! A [`Zone`] is either a fixed offset (`UTC`, abbreviations such as `CDT`,
//! numeric offsets such as `+05:30` or `-0600`) or an IANA name such as
//! `US/Central`. IANA zones follow their daylight saving rules, so the offset
//! depends on the instant being converted.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};

const HOUR: i32 = 3600;

const ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("EST", -5 * HOUR),
    ("EDT", -4 * HOUR),
    ("CST", -6 * HOUR),
    ("CDT", -5 * HOUR),
    ("MST", -7 * HOUR),
    ("MDT", -6 * HOUR),
    ("PST", -8 * HOUR),
    ("PDT", -7 * HOUR),
    ("AKST", -9 * HOUR),
    ("AKDT", -8 * HOUR),
    ("HST", -10 * HOUR),
    ("BST", HOUR),
    ("CET", HOUR),
    ("CEST", 2 * HOUR),
    ("IST", 5 * HOUR + 1800),
    ("JST", 9 * HOUR),
    ("AEST", 10 * HOUR),
];

/// A resolved time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Same offset all year.
    Fixed(FixedOffset),
    /// IANA zone from the tz database.
    Named(Tz),
}

impl Zone {
    /// Offset in effect at the UTC instant `utc`.
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Self::Fixed(offset) => *offset,
            Self::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
        }
    }

    /// The UTC instant `utc` seen in this zone.
    pub fn wall_clock(&self, utc: &NaiveDateTime) -> DateTime<FixedOffset> {
        Utc.from_utc_datetime(utc).with_timezone(&self.offset_at(utc))
    }

    /// Interprets a wall clock time in this zone.
    ///
    /// A time repeated by a daylight saving change resolves to its earlier
    /// instant; a time skipped by one is `None`.
    pub fn localize(&self, local: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Fixed(offset) => offset.from_local_datetime(local).single(),
            Self::Named(tz) => tz.from_local_datetime(local).earliest().map(|dt| {
                let offset = dt.offset().fix();
                dt.with_timezone(&offset)
            }),
        }
    }
}

/// A datetime that is either naive or carries its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TzDateTime {
    /// Offset information was dropped.
    Naive(NaiveDateTime),
    /// The datetime in its zone.
    Aware(DateTime<FixedOffset>),
}

impl TzDateTime {
    fn build(dt: DateTime<FixedOffset>, ignoretz: bool) -> Self {
        if ignoretz {
            Self::Naive(dt.naive_local())
        } else {
            Self::Aware(dt)
        }
    }

    /// Wall clock time, ignoring any offset.
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            Self::Naive(dt) => *dt,
            Self::Aware(dt) => dt.naive_local(),
        }
    }

    /// The aware datetime, if an offset is known.
    pub fn aware(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Naive(_) => None,
            Self::Aware(dt) => Some(*dt),
        }
    }
}

/// Resolves an abbreviation, IANA zone name or numeric offset.
///
/// ```
/// use chrono::NaiveDate;
/// use django_core_common::utils::dates::parse_timezone;
///
/// let winter = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let summer = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let central = parse_timezone("US/Central").unwrap();
/// assert_eq!(central.offset_at(&winter).local_minus_utc(), -6 * 3600);
/// assert_eq!(central.offset_at(&summer).local_minus_utc(), -5 * 3600);
/// assert_eq!(parse_timezone("+05:30").unwrap().offset_at(&winter).local_minus_utc(), 19_800);
/// assert!(parse_timezone("Mars/Olympus").is_err());
/// ```
pub fn parse_timezone(tz: &str) -> CoreResult<Zone> {
    let tz = tz.trim();
    let fixed = ABBREVIATIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(tz))
        .map(|(_, secs)| *secs);
    if let Some(offset) = fixed.and_then(FixedOffset::east_opt) {
        return Ok(Zone::Fixed(offset));
    }
    if let Ok(named) = tz.parse::<Tz>() {
        return Ok(Zone::Named(named));
    }
    parse_numeric_offset(tz)
        .and_then(FixedOffset::east_opt)
        .map(Zone::Fixed)
        .ok_or_else(|| CoreError::BadRequest(format!("Unknown time zone '{tz}'")))
}

fn parse_numeric_offset(tz: &str) -> Option<i32> {
    let tz = tz
        .strip_prefix("UTC")
        .or_else(|| tz.strip_prefix("GMT"))
        .unwrap_or(tz);
    let (sign, rest) = match tz.chars().next()? {
        '+' => (1, &tz[1..]),
        '-' => (-1, &tz[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>().ok()?, 0)
    } else {
        let split = digits.len() - 2;
        (
            digits[..split].parse::<i32>().ok()?,
            digits[split..].parse::<i32>().ok()?,
        )
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * HOUR + minutes * 60))
}

/// Current time in `tz`.
pub fn now_by_tz(tz: &str, ignoretz: bool) -> CoreResult<TzDateTime> {
    let zone = parse_timezone(tz)?;
    Ok(TzDateTime::build(zone.wall_clock(&Utc::now().naive_utc()), ignoretz))
}

/// Interprets a naive wall clock time in `tz` and converts it to UTC.
///
/// ```
/// use chrono::NaiveDate;
/// use django_core_common::utils::dates::tz_to_utc;
///
/// let local = NaiveDate::from_ymd_opt(2011, 11, 25).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let utc = tz_to_utc(local, "US/Central", true).unwrap().naive();
/// assert_eq!(utc.to_string(), "2011-11-25 15:00:00");
/// ```
pub fn tz_to_utc(dt: NaiveDateTime, tz: &str, ignoretz: bool) -> CoreResult<TzDateTime> {
    let local = parse_timezone(tz)?
        .localize(&dt)
        .ok_or_else(|| CoreError::BadRequest(format!("Local time {dt} does not exist in '{tz}'")))?;
    let utc = local.with_timezone(&Utc.fix());
    Ok(TzDateTime::build(utc, ignoretz))
}

/// Converts a naive UTC time into the wall clock time of `tz`.
pub fn utc_to_tz(dt: NaiveDateTime, tz: &str, ignoretz: bool) -> CoreResult<TzDateTime> {
    let local = parse_timezone(tz)?.wall_clock(&dt);
    Ok(TzDateTime::build(local, ignoretz))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
];

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a datetime string leniently. Returns `None` when nothing matches.
///
/// Accepts RFC 3339, ISO-like and US `MM/DD/YYYY` forms, optionally followed
/// by a zone abbreviation or numeric offset. With `ignoretz` the offset is
/// parsed but dropped; without it, a zone-less string still yields a naive
/// value.
///
/// ```
/// use django_core_common::utils::dates::parse_datetime;
///
/// let dt = parse_datetime("12/30/2011 13:45:12 CDT", false).unwrap();
/// assert_eq!(dt.aware().unwrap().to_rfc3339(), "2011-12-30T13:45:12-05:00");
/// assert!(parse_datetime("hello world", true).is_none());
/// ```
pub fn parse_datetime(s: &str, ignoretz: bool) -> Option<TzDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(TzDateTime::build(dt, ignoretz));
    }
    if let Some(naive) = parse_naive(s) {
        return Some(TzDateTime::Naive(naive));
    }

    let (rest, zone) = s.rsplit_once(char::is_whitespace)?;
    let zone = parse_timezone(zone).ok()?;
    let naive = parse_naive(rest.trim())?;
    let aware = zone.localize(&naive)?;
    Some(TzDateTime::build(aware, ignoretz))
}

/// Parses the date part of a datetime string.
///
/// ```
/// use chrono::NaiveDate;
/// use django_core_common::utils::dates::parse_date;
///
/// let expected = NaiveDate::from_ymd_opt(2015, 12, 31);
/// assert_eq!(parse_date("2015-12-31"), expected);
/// assert_eq!(parse_date("12/31/2015"), expected);
/// ```
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_datetime(s, true).map(|dt| dt.naive().date())
}

/// Converts a hexadecimal unix timestamp (with or without `0x`) to UTC.
pub fn hex_timestamp_to_datetime(hex: &str) -> CoreResult<NaiveDateTime> {
    let digits = hex
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    let seconds = i64::from_str_radix(digits, 16)
        .map_err(|e| CoreError::BadRequest(format!("Invalid hex timestamp '{hex}': {e}")))?;
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| CoreError::BadRequest(format!("Timestamp out of range: {hex}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn fixed(tz: &str) -> i32 {
        match parse_timezone(tz).unwrap() {
            Zone::Fixed(offset) => offset.local_minus_utc(),
            Zone::Named(named) => panic!("{tz} resolved to {named:?}"),
        }
    }

    #[test]
    fn test_parse_timezone_forms() {
        assert_eq!(fixed("utc"), 0);
        assert_eq!(fixed("CDT"), -5 * HOUR);
        assert_eq!(fixed("-0600"), -6 * HOUR);
        assert_eq!(fixed("UTC+2"), 2 * HOUR);
        assert_eq!(
            parse_timezone("America/Chicago").unwrap(),
            Zone::Named(Tz::America__Chicago)
        );
        assert!(parse_timezone("+25:00").is_err());
        assert!(parse_timezone("").is_err());
    }

    #[test]
    fn test_tz_to_utc() {
        let result = tz_to_utc(dt(2011, 11, 25, 9, 0, 0), "US/Central", false).unwrap();
        let aware = result.aware().unwrap();
        assert_eq!(aware.offset().local_minus_utc(), 0);
        assert_eq!(aware.naive_local(), dt(2011, 11, 25, 15, 0, 0));
    }

    #[test]
    fn test_tz_to_utc_in_summer() {
        let result = tz_to_utc(dt(2024, 7, 1, 9, 0, 0), "US/Central", true).unwrap();
        assert_eq!(result.naive(), dt(2024, 7, 1, 14, 0, 0));
        let berlin = tz_to_utc(dt(2024, 7, 1, 9, 0, 0), "Europe/Berlin", true).unwrap();
        assert_eq!(berlin.naive(), dt(2024, 7, 1, 7, 0, 0));
    }

    #[test]
    fn test_tz_to_utc_across_transitions() {
        // 02:30 does not exist on the spring-forward day.
        assert!(tz_to_utc(dt(2024, 3, 10, 2, 30, 0), "US/Central", true).is_err());
        // 01:30 happens twice on the fall-back day; the first one is CDT.
        let repeated = tz_to_utc(dt(2024, 11, 3, 1, 30, 0), "US/Central", true).unwrap();
        assert_eq!(repeated.naive(), dt(2024, 11, 3, 6, 30, 0));
    }

    #[test]
    fn test_utc_to_tz() {
        let naive = utc_to_tz(dt(2011, 11, 25, 9, 0, 0), "US/Central", true).unwrap();
        assert_eq!(naive, TzDateTime::Naive(dt(2011, 11, 25, 3, 0, 0)));

        let aware = utc_to_tz(dt(2011, 11, 25, 9, 0, 0), "US/Central", false).unwrap();
        assert_eq!(
            aware.aware().unwrap().to_rfc3339(),
            "2011-11-25T03:00:00-06:00"
        );

        let summer = utc_to_tz(dt(2024, 7, 1, 14, 0, 0), "America/Chicago", false).unwrap();
        assert_eq!(
            summer.aware().unwrap().to_rfc3339(),
            "2024-07-01T09:00:00-05:00"
        );
    }

    #[test]
    fn test_now_by_tz() {
        let naive = now_by_tz("US/Pacific", true).unwrap();
        assert!(naive.aware().is_none());
        let aware = now_by_tz("US/Pacific", false).unwrap().aware().unwrap();
        let offset = aware.offset().local_minus_utc();
        assert!(offset == -8 * HOUR || offset == -7 * HOUR);
        let fixed = now_by_tz("PST", false).unwrap().aware().unwrap();
        assert_eq!(fixed.offset().local_minus_utc(), -8 * HOUR);
        assert!(now_by_tz("Nowhere/Special", true).is_err());
    }

    #[test]
    fn test_parse_datetime_variants() {
        assert_eq!(
            parse_datetime("2011-12-30 13:45:12 CDT", true),
            Some(TzDateTime::Naive(dt(2011, 12, 30, 13, 45, 12)))
        );
        assert_eq!(
            parse_datetime("2011-12-30T13:45:12Z", true).unwrap().naive(),
            dt(2011, 12, 30, 13, 45, 12)
        );
        assert_eq!(
            parse_datetime("2011-12-30", false),
            Some(TzDateTime::Naive(dt(2011, 12, 30, 0, 0, 0)))
        );
        assert_eq!(parse_datetime("   ", true), None);
        assert_eq!(parse_datetime("2011-12-30 13:45:12 XYZ", true), None);
    }

    #[test]
    fn test_parse_date_bad_input() {
        assert_eq!(parse_date("hello world"), None);
        assert_eq!(parse_date("13/45/2011"), None);
    }

    #[test]
    fn test_hex_timestamp_to_datetime() {
        let expected = dt(2015, 6, 25, 8, 34, 1);
        assert_eq!(hex_timestamp_to_datetime("558BBCF9").unwrap(), expected);
        assert_eq!(hex_timestamp_to_datetime("0x558BBCF9").unwrap(), expected);
        assert!(hex_timestamp_to_datetime("zz").is_err());
    }
}
