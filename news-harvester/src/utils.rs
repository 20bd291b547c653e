/// Text processing utilities
pub mod text {
    /// First `max_chars` characters of `text`, never splitting a code point
    pub fn prefix_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => &text[..byte_index],
            None => text,
        }
    }

    /// Trimmed text, or `None` when nothing is left
    pub fn non_empty(text: Option<&str>) -> Option<String> {
        text.map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Parses an article link into its canonical absolute form.
    /// Only http(s) URLs with a host are accepted.
    pub fn normalize_article_url(raw: &str) -> Option<String> {
        let parsed = Url::parse(raw.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        parsed.host_str()?;
        Some(parsed.to_string())
    }
}

/// Time utilities
pub mod time {
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

    /// Resolve an optional query window: `end` defaults to `now`, `start` to 24 hours before `end`
    pub fn default_window(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = end.unwrap_or(now);
        let start = start.unwrap_or(end - Duration::hours(24));
        (start, end)
    }

    /// Parse a provider timestamp into UTC.
    ///
    /// Accepts RFC 3339 (`2024-01-15T10:30:00Z`, offsets), RFC 2822, zone-less
    /// date-times (read as UTC) and bare dates (midnight UTC).
    pub fn parse_provider_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// `YYYY-MM-DDTHH:MM:SS` in UTC, without zone designator
    pub fn format_second_precision(dt: &DateTime<Utc>) -> String {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// `YYYY-MM-DD` in UTC
    pub fn format_day(dt: &DateTime<Utc>) -> String {
        dt.format("%Y-%m-%d").to_string()
    }
}
