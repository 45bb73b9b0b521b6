//! Pure string/date formatting rules for the printable report.
//!
//! Every helper degrades instead of failing: missing data renders as "N/A",
//! unparseable times pass through unchanged, unparseable URLs become an
//! inline "Invalid URL" marker.

use chrono::{Datelike, NaiveDate};
use url::Url;

pub const NOT_AVAILABLE: &str = "N/A";

/// Default a missing/blank field to "N/A".
pub fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Default a missing or zero count to "N/A".
pub fn count_or_na(value: Option<u32>) -> String {
    match value {
        Some(n) if n > 0 => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Convert a 24-hour "HH:MM" string to 12-hour "HH:MM AM/PM".
///
/// Hour 0 displays as 12. Missing/blank input renders "N/A"; input that does
/// not parse as a time is returned unchanged.
pub fn format_time_12h(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };

    let Some((hour, minute)) = parse_hhmm(raw) else {
        return raw.to_string();
    };

    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour:02}:{minute:02} {meridiem}")
}

fn parse_hhmm(raw: &str) -> Option<(u32, u32)> {
    let (h, m) = raw.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

/// Turn a snake_case tag into display form: underscores become spaces and
/// the first letter is upper-cased ("guest_lecture" → "Guest lecture").
pub fn title_case_slug(slug: &str) -> String {
    let spaced = slug.trim().replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Render a list of snake_case tags, or "N/A" when empty.
pub fn format_slug_list(slugs: &[String]) -> String {
    let items: Vec<String> = slugs
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| title_case_slug(s))
        .collect();
    if items.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        items.join(", ")
    }
}

/// Derive a human-readable platform name from a URL: the first host label
/// before the first dot, with a leading "www." stripped and the first letter
/// capitalized. Anything unparseable becomes "Invalid URL".
pub fn platform_from_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw.trim()) else {
        return "Invalid URL".to_string();
    };
    let Some(host) = url.host_str() else {
        return "Invalid URL".to_string();
    };

    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or(host);
    if label.is_empty() {
        return "Invalid URL".to_string();
    }

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Invalid URL".to_string(),
    }
}

/// Academic year containing `today`. The year runs June–May, so June 2025
/// through May 2026 is "2025-2026".
pub fn academic_year(today: NaiveDate) -> String {
    let year = today.year();
    if today.month() >= 6 {
        format!("{}-{}", year, year + 1)
    } else {
        format!("{}-{}", year - 1, year)
    }
}

/// Reformat a department written as "Name (Degree)" into "(Degree)-Name".
/// A department with no trailing parenthesized degree passes through
/// unchanged.
pub fn reformat_department(department: &str) -> String {
    let dept = department.trim();
    if dept.ends_with(')') {
        if let Some(open) = dept.rfind('(') {
            let degree = &dept[open..];
            let name = dept[..open].trim_end();
            if !name.is_empty() {
                return format!("{degree}-{name}");
            }
        }
    }
    dept.to_string()
}

/// Reference code printed in the report header:
/// `{academic year}/{reformatted department}/{unique code}`.
pub fn reference_code(
    department: Option<&str>,
    unique_code: Option<&str>,
    today: NaiveDate,
) -> String {
    let dept = match department.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => reformat_department(d),
        None => NOT_AVAILABLE.to_string(),
    };
    format!(
        "{}/{}/{}",
        academic_year(today),
        dept,
        or_na(unique_code)
    )
}
