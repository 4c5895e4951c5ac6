/// Track domain type
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One uploaded audio file with display metadata.
///
/// `filename` is the opaque server identifier and is always what the API is
/// called with. It usually carries a numeric user-id prefix (`"<id>_<name>"`)
/// that is only stripped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique server filename
    pub filename: String,

    /// Name of the file as uploaded by the user
    #[serde(default)]
    pub original_name: String,

    /// Upload timestamp, if the server reported one
    #[serde(default, deserialize_with = "deserialize_upload_date")]
    pub upload_date: Option<DateTime<Utc>>,
}

impl Track {
    /// Build a track from a bare server filename.
    ///
    /// Used for servers that list plain names instead of records.
    pub fn from_filename(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let original_name = display_name(&filename).to_string();
        Self {
            filename,
            original_name,
            upload_date: None,
        }
    }

    /// Name shown to the user.
    ///
    /// Prefers the original upload name and falls back to the filename with
    /// its user-id prefix removed.
    pub fn display_name(&self) -> &str {
        if self.original_name.is_empty() {
            display_name(&self.filename)
        } else {
            &self.original_name
        }
    }
}

/// Strip a leading `<digits>_` user-id prefix from a server filename.
///
/// ```
/// assert_eq!(simo_core::display_name("42_song.mp3"), "song.mp3");
/// assert_eq!(simo_core::display_name("song.mp3"), "song.mp3");
/// assert_eq!(simo_core::display_name("_song.mp3"), "_song.mp3");
/// ```
pub fn display_name(filename: &str) -> &str {
    let digits = filename.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && filename.as_bytes().get(digits) == Some(&b'_') {
        &filename[digits + 1..]
    } else {
        filename
    }
}

/// Accepts RFC 3339 strings, naive ISO timestamps (assumed UTC) and unix
/// seconds.
fn deserialize_upload_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Seconds(i64),
        Fractional(f64),
    }

    let raw: Option<RawDate> = Option::deserialize(deserializer)?;
    let parsed = match raw {
        None => None,
        Some(RawDate::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            }),
        Some(RawDate::Seconds(secs)) => Utc.timestamp_opt(secs, 0).single(),
        Some(RawDate::Fractional(secs)) => {
            Utc.timestamp_millis_opt((secs * 1000.0) as i64).single()
        }
    };
    Ok(parsed)
}
