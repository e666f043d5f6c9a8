//! Display locale for instants shown in documents.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayLocale {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en-US")]
    EnUs,
}

impl FromStr for DisplayLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "zh-cn" | "zh" => Ok(DisplayLocale::ZhCn),
            "en-us" | "en" => Ok(DisplayLocale::EnUs),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

impl fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayLocale::ZhCn => f.write_str("zh-CN"),
            DisplayLocale::EnUs => f.write_str("en-US"),
        }
    }
}

/// Locale plus the fixed offset instants are shown at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub locale: DisplayLocale,
    pub offset: FixedOffset,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::china()
    }
}

impl DisplaySettings {
    /// zh-CN at UTC+08:00.
    pub fn china() -> Self {
        Self {
            locale: DisplayLocale::ZhCn,
            offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(utc),
        }
    }

    pub fn utc(locale: DisplayLocale) -> Self {
        Self {
            locale,
            offset: utc(),
        }
    }

    /// Offsets outside +-24h fall back to UTC.
    pub fn with_offset_minutes(locale: DisplayLocale, minutes: i32) -> Self {
        Self {
            locale,
            offset: FixedOffset::east_opt(minutes * 60).unwrap_or_else(utc),
        }
    }

    /// `2024/3/5 14:03:09` (zh-CN) or `3/5/2024, 2:03:09 PM` (en-US).
    pub fn format_instant(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.offset);
        match self.locale {
            DisplayLocale::ZhCn => local.format("%Y/%-m/%-d %H:%M:%S").to_string(),
            DisplayLocale::EnUs => local.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        }
    }

    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.offset);
        match self.locale {
            DisplayLocale::ZhCn => local.format("%Y/%-m/%-d").to_string(),
            DisplayLocale::EnUs => local.format("%-m/%-d/%Y").to_string(),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_like_browser_locales() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 6, 3, 9).unwrap();
        assert_eq!(DisplaySettings::china().format_instant(at), "2024/3/5 14:03:09");
        assert_eq!(
            DisplaySettings::utc(DisplayLocale::EnUs).format_instant(at),
            "3/5/2024, 6:03:09 AM"
        );
        assert_eq!(DisplaySettings::china().format_date(at), "2024/3/5");
    }

    #[test]
    fn offset_crosses_midnight() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 20, 0, 0).unwrap();
        assert_eq!(DisplaySettings::china().format_date(at), "2024/3/6");
    }

    #[test]
    fn parses_locale_names() {
        assert_eq!("zh_CN".parse::<DisplayLocale>().unwrap(), DisplayLocale::ZhCn);
        assert_eq!("en-us".parse::<DisplayLocale>().unwrap(), DisplayLocale::EnUs);
        assert!("fr".parse::<DisplayLocale>().is_err());
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let settings = DisplaySettings::with_offset_minutes(DisplayLocale::ZhCn, 100_000);
        assert_eq!(settings.offset.local_minus_utc(), 0);
    }
}
