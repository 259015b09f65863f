//! Time related utils.

use chrono::Utc;

/// The timestamp type used across licsign.
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a timestamp the way HTTP `Date` headers expect it.
///
/// ## Example
///
/// `Mon, 15 Aug 2022 16:50:12 +0000`
pub fn format_rfc2822(t: DateTime) -> String {
    t.to_rfc2822()
}

/// Parse a RFC 2822 formatted string into a timestamp.
pub fn parse_rfc2822(s: &str) -> crate::Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc2822(s)
        .map_err(|e| crate::Error::unexpected("parse rfc2822 time failed").with_source(e))?;
    Ok(t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rfc2822() {
        let t = parse_rfc2822("Mon, 15 Aug 2022 16:50:12 +0000").unwrap();
        assert_eq!(format_rfc2822(t), "Mon, 15 Aug 2022 16:50:12 +0000");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_rfc2822("not a date").is_err());
    }
}
