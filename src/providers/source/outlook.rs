//! Outlook for Mac local database source.
//!
//! Reads sent mail and calendar events straight from the profile's
//! `Outlook.sqlite`, opened read-only so a running Outlook is never blocked.
//! Event subjects and descriptions live in per-event data files next to the
//! database and are read from their `SUMMARY:` / `DESCRIPTION:` lines.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::{RecordSource, Result, SourceError, Window};
use crate::domain::{EventRecord, MessageRecord, Recipient};

const PROFILES_DIR: &str =
    "Library/Group Containers/UBF8T346G9.Office/Outlook/Outlook 15 Profiles";

/// Event data files larger than this are skipped.
const MAX_EVENT_FILE_BYTES: u64 = 512 * 1024;

const SENT_MAIL_QUERY: &str = "
    SELECT Message_NormalizedSubject, Message_Preview, Message_RecipientList
    FROM Mail
    WHERE Message_IsOutgoingMessage = 1
      AND Message_Sent = 1
      AND Message_TimeSent >= ?1
      AND Message_TimeSent < ?2
    ORDER BY Message_TimeSent DESC";

const EVENTS_QUERY: &str = "
    SELECT PathToDataFile
    FROM CalendarEvents
    WHERE Calendar_StartDateUTC >= ?1
      AND Calendar_StartDateUTC < ?2
    ORDER BY Calendar_StartDateUTC DESC";

/// Outlook for Mac record source.
#[derive(Debug, Clone)]
pub struct OutlookLocalSource {
    db_path: PathBuf,
}

impl OutlookLocalSource {
    /// Locates the database of a named profile under the user's home directory.
    pub fn for_profile(profile: &str) -> Result<Self> {
        let home = directories::BaseDirs::new()
            .ok_or_else(|| SourceError::NotFound("home directory".to_string()))?;
        let db_path = home
            .home_dir()
            .join(PROFILES_DIR)
            .join(profile)
            .join("Data")
            .join("Outlook.sqlite");
        Self::with_database(db_path)
    }

    /// Uses an explicit database path.
    pub fn with_database(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if !db_path.exists() {
            return Err(SourceError::NotFound(format!(
                "Outlook database not found at {}",
                db_path.display()
            )));
        }
        Ok(Self { db_path })
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Directory that event data file paths are relative to.
    fn profile_dir(&self) -> PathBuf {
        self.db_path
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Runs `f` against a read-only connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            f(&conn)
        })
        .await
        .map_err(|e| SourceError::Internal(e.to_string()))?
    }
}

#[async_trait]
impl RecordSource for OutlookLocalSource {
    fn name(&self) -> &str {
        "outlook-local"
    }

    async fn calendar_events(&self, window: &Window) -> Result<Vec<EventRecord>> {
        let (start, end) = (window.start.timestamp(), window.end.timestamp());
        let profile_dir = self.profile_dir();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(EVENTS_QUERY)?;
            let paths = stmt
                .query_map(params![start, end], |row| row.get::<_, Option<String>>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(paths
                .into_iter()
                .map(|path| match path {
                    Some(path) => read_event_file(&profile_dir.join(path)),
                    None => EventRecord::default(),
                })
                .collect())
        })
        .await
    }

    async fn sent_messages(&self, window: &Window) -> Result<Vec<MessageRecord>> {
        let (start, end) = (window.start.timestamp(), window.end.timestamp());

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(SENT_MAIL_QUERY)?;
            let rows = stmt.query_map(params![start, end], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?;

            let mut messages = Vec::new();
            for row in rows {
                let (subject, preview, recipients) = row?;
                messages.push(MessageRecord {
                    subject: subject.unwrap_or_default(),
                    body_preview: preview.unwrap_or_default(),
                    to: address_pattern()
                        .find_iter(recipients.as_deref().unwrap_or_default())
                        .map(|m| Recipient::new(m.as_str()))
                        .collect(),
                    cc: Vec::new(),
                });
            }
            Ok(messages)
        })
        .await
    }

    async fn user_address(&self) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let address = conn
                .query_row(
                    "SELECT Account_EmailAddress FROM AccountsMail LIMIT 1",
                    [],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()?;
            Ok(address.flatten())
        })
        .await
    }
}

fn address_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+").unwrap())
}

/// Reads subject and description from an event data file.
///
/// Unreadable or oversized files yield an empty event.
fn read_event_file(path: &Path) -> EventRecord {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() <= MAX_EVENT_FILE_BYTES => {}
        Ok(_) => {
            tracing::debug!(path = %path.display(), "event data file too large, skipped");
            return EventRecord::default();
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "event data file unreadable");
            return EventRecord::default();
        }
    }

    match std::fs::read(path) {
        Ok(bytes) => parse_event_details(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "event data file unreadable");
            EventRecord::default()
        }
    }
}

/// Extracts `SUMMARY:` and `DESCRIPTION:` lines. The last occurrence wins.
fn parse_event_details(text: &str) -> EventRecord {
    let mut event = EventRecord::default();
    for line in text.lines() {
        if let Some(summary) = line.strip_prefix("SUMMARY:") {
            event.subject = summary.trim().to_string();
        } else if let Some(description) = line.strip_prefix("DESCRIPTION:") {
            event.body_text = description.trim().to_string();
        }
    }
    event
}
