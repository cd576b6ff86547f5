use super::mailer::validate_recipient;
use super::{DispatchError, DispatchReceipt, Dispatcher, OutgoingMessage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

// Shared by every dispatcher in the process; the process id separates
// concurrent `send` runs.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Spools messages as JSON envelopes in a directory watched by a mail relay.
///
/// Envelopes are written under a `.tmp` name and renamed to `.json` once
/// flushed, so the relay never sees a partial file.
#[derive(Debug)]
pub struct OutboxDispatcher {
    dir: PathBuf,
}

#[derive(Serialize)]
struct SpooledEnvelope<'a> {
    message_id: &'a str,
    queued_at: DateTime<Utc>,
    #[serde(flatten)]
    message: &'a OutgoingMessage,
}

struct Reservation {
    message_id: String,
    staging: PathBuf,
    path: PathBuf,
    file: File,
}

impl OutboxDispatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn reserve(&self, queued_at: DateTime<Utc>, subject: &str) -> io::Result<Reservation> {
        let stamp = queued_at.format("%Y%m%dT%H%M%S%3f");
        let slug = slugify(subject);

        loop {
            let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
            let message_id = format!("{stamp}-{}-{sequence:04}-{slug}", std::process::id());
            let path = self.dir.join(format!("{message_id}.json"));
            if path.exists() {
                continue;
            }

            let staging = self.dir.join(format!("{message_id}.json.tmp"));
            match OpenOptions::new().write(true).create_new(true).open(&staging) {
                Ok(file) => {
                    return Ok(Reservation {
                        message_id,
                        staging,
                        path,
                        file,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

fn write_envelope(file: File, envelope: &SpooledEnvelope<'_>) -> Result<(), DispatchError> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, envelope)?;
    writer.flush()?;
    Ok(())
}

impl Dispatcher for OutboxDispatcher {
    fn dispatch(&self, message: &OutgoingMessage) -> Result<DispatchReceipt, DispatchError> {
        validate_recipient(&message.recipient)?;
        std::fs::create_dir_all(&self.dir)?;

        let queued_at = Utc::now();
        let Reservation {
            message_id,
            staging,
            path,
            file,
        } = self.reserve(queued_at, &message.subject)?;

        let envelope = SpooledEnvelope {
            message_id: &message_id,
            queued_at,
            message,
        };
        let written = write_envelope(file, &envelope)
            .and_then(|()| std::fs::rename(&staging, &path).map_err(DispatchError::from));
        if let Err(err) = written {
            let _ = std::fs::remove_file(&staging);
            return Err(err);
        }

        info!(
            path = %path.display(),
            recipient = %message.recipient,
            "queued adherence report for delivery"
        );

        Ok(DispatchReceipt {
            message_id,
            location: Some(path),
        })
    }
}

fn slugify(value: &str) -> String {
    let mut slug = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>();
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "message".to_string()
    } else {
        trimmed.to_string()
    }
}
