//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone};

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    // Convert Moment.js format to chrono format
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format a date with the `MMM`/`MMMM` month token replaced by a
/// localized month name before conversion
///
/// # Examples
/// ```ignore
/// format_date_localized(&date, "DD MMM YYYY", &months) // -> "15 mar 2021"
/// ```
pub fn format_date_localized<Tz: TimeZone>(
    date: &DateTime<Tz>,
    format: &str,
    months: &[String],
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut format = format.to_string();
    if months.len() == 12 {
        let month = &months[date.month0() as usize];
        format = format.replace("MMMM", month).replace("MMM", month);
    }
    format_date(date, &format)
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Process from longest to shortest patterns within each category
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month (uppercase M)
        ("MMMM", "%B"), // Full month name
        ("MMM", "%b"),  // Abbreviated month name
        ("MM", "%m"),   // Two-digit month
        // Day of month
        ("DDDD", "%j"), // Day of year
        ("DD", "%d"),   // Two-digit day
        // Hour 24h
        ("HH", "%H"),
        // Hour 12h
        ("hh", "%I"),
        // Minute (lowercase m after we've processed MM)
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
        // Timezone
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
