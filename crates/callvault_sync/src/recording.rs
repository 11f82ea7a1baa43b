//! Recording listing types.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Largest page the provider serves.
pub const MAX_PAGE_SIZE: u32 = 300;

/// Inclusive range of recording dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub from: NaiveDate,
    /// Last day included
    pub to: NaiveDate,
}

impl DateRange {
    /// Create a range from explicit dates.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The `days` days up to and including `today`.
    pub fn last_days(days: i64, today: NaiveDate) -> Self {
        Self {
            from: today - Duration::days(days),
            to: today,
        }
    }

    /// The last 30 days, the window a sync covers when none is given.
    pub fn default_window() -> Self {
        Self::last_days(30, Utc::now().date_naive())
    }
}

/// One page request against the recordings listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Dates to list
    pub range: DateRange,
    /// Recordings per page
    pub page_size: u32,
    /// Cursor from the previous page
    pub next_page_token: Option<String>,
}

impl PageQuery {
    /// The first page of `range`.
    pub fn first(range: DateRange) -> Self {
        Self {
            range,
            page_size: MAX_PAGE_SIZE,
            next_page_token: None,
        }
    }

    /// The page after this one.
    pub fn next(&self, token: impl Into<String>) -> Self {
        Self {
            next_page_token: Some(token.into()),
            ..self.clone()
        }
    }

    /// Query string parameters.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("from", self.range.from.format("%Y-%m-%d").to_string()),
            ("to", self.range.to.format("%Y-%m-%d").to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(token) = &self.next_page_token {
            pairs.push(("next_page_token", token.clone()));
        }
        pairs
    }
}

/// A file belonging to a cloud recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingFile {
    /// File identifier
    pub id: String,
    /// `MP4`, `M4A`, `TRANSCRIPT`, `CHAT`, ...
    pub file_type: String,
    /// `shared_screen_with_speaker_view`, `audio_transcript`, ...
    #[serde(default)]
    pub recording_type: String,
    /// Size in bytes
    #[serde(default)]
    pub file_size: u64,
    /// Processing status
    #[serde(default)]
    pub status: String,
    /// Authenticated download link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl RecordingFile {
    /// Whether this file is a transcript.
    pub fn is_transcript(&self) -> bool {
        self.file_type == "TRANSCRIPT" || self.recording_type == "audio_transcript"
    }
}

/// A recorded meeting as the provider lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Unique per occurrence; meeting ids repeat for personal rooms
    pub uuid: String,
    /// Meeting id
    pub id: u64,
    /// Meeting host
    #[serde(default)]
    pub host_email: String,
    /// Meeting title
    #[serde(default)]
    pub topic: String,
    /// Start of the meeting
    pub start_time: DateTime<Utc>,
    /// Length in minutes
    #[serde(default)]
    pub duration: u32,
    /// Files produced by the recording
    #[serde(default)]
    pub recording_files: Vec<RecordingFile>,
}

impl Recording {
    /// Whether any file is a transcript.
    pub fn has_transcript(&self) -> bool {
        self.recording_files.iter().any(RecordingFile::is_transcript)
    }

    /// Start time plus duration.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration))
    }
}

/// One page of the recordings listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingsPage {
    /// Total recordings across all pages
    #[serde(default)]
    pub total_records: u32,
    /// Cursor for the next page; absent or empty on the last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    /// Recordings on this page
    #[serde(default)]
    pub meetings: Vec<Recording>,
}

impl RecordingsPage {
    /// Cursor for the following page, if there is one.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// A recording reduced to what the meeting picker shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSummary {
    /// Recording uuid
    pub recording_id: String,
    /// Provider meeting id
    pub meeting_id: u64,
    /// Meeting title
    pub title: String,
    /// Meeting host
    pub host_email: String,
    /// Start of the meeting
    pub start_time: DateTime<Utc>,
    /// Start plus duration
    pub end_time: DateTime<Utc>,
    /// Length in minutes
    pub duration: u32,
    /// Whether a transcript is available
    pub has_transcript: bool,
    /// Whether the recording was imported already
    pub synced: bool,
}

impl MeetingSummary {
    /// Summarise a recording.
    pub fn from_recording(recording: &Recording, synced: bool) -> Self {
        Self {
            recording_id: recording.uuid.clone(),
            meeting_id: recording.id,
            title: recording.topic.clone(),
            host_email: recording.host_email.clone(),
            start_time: recording.start_time,
            end_time: recording.end_time(),
            duration: recording.duration,
            has_transcript: recording.has_transcript(),
            synced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(json: &str) -> Recording {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_end_time_adds_duration_minutes() {
        let recording = recording(
            r#"{"uuid":"abc==","id":42,"topic":"Standup","start_time":"2025-03-01T09:00:00Z","duration":45}"#,
        );
        assert_eq!(
            recording.end_time().to_rfc3339(),
            "2025-03-01T09:45:00+00:00"
        );
    }

    #[test]
    fn test_transcript_detection() {
        let recording = recording(
            r#"{"uuid":"abc==","id":42,"start_time":"2025-03-01T09:00:00Z",
                "recording_files":[
                  {"id":"f1","file_type":"MP4","recording_type":"shared_screen"},
                  {"id":"f2","file_type":"M4A","recording_type":"audio_transcript"}
                ]}"#,
        );
        assert!(recording.has_transcript());

        let summary = MeetingSummary::from_recording(&recording, true);
        assert_eq!(summary.recording_id, "abc==");
        assert!(summary.has_transcript);
        assert!(summary.synced);
    }

    #[test]
    fn test_empty_token_ends_pagination() {
        let page: RecordingsPage =
            serde_json::from_str(r#"{"next_page_token":"","meetings":[]}"#).unwrap();
        assert_eq!(page.next_token(), None);
    }

    #[test]
    fn test_query_pairs_include_cursor() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );
        let query = PageQuery::first(range).next("cursor-2");

        assert_eq!(
            query.query_pairs(),
            vec![
                ("from", "2025-01-01".to_string()),
                ("to", "2025-01-31".to_string()),
                ("page_size", "300".to_string()),
                ("next_page_token", "cursor-2".to_string()),
            ]
        );
    }
}
