//! Attestation message template.
//!
//! The first line names the template version. A future template change
//! bumps that line, so legacy signatures can be told apart by format alone.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

use crate::{Address, TaskId};

/// First line of every v1 attestation message.
pub const MESSAGE_HEADER: &str = "TaskProof attestation v1";

/// The text a signer approves when attesting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationMessage {
    task_id: TaskId,
    task_title: String,
    signer: Address,
    timestamp: DateTime<Utc>,
}

impl AttestationMessage {
    /// Build a message. Rendering is pure over these four inputs.
    pub fn new(
        task_id: TaskId,
        task_title: impl Into<String>,
        signer: Address,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            task_title: task_title.into(),
            signer,
            timestamp,
        }
    }

    /// Task being attested.
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Account expected to sign.
    pub fn signer(&self) -> &Address {
        &self.signer
    }

    /// Time embedded in the message.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Render the message text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AttestationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // One field per line; a title must not be able to forge another field.
        let title = single_line(&self.task_title);
        let task_id = single_line(self.task_id.as_str());

        writeln!(f, "{}", MESSAGE_HEADER)?;
        writeln!(f, "I confirm that the following task is complete.")?;
        writeln!(f, "Task ID: {}", task_id)?;
        writeln!(f, "Task: {}", title)?;
        writeln!(f, "Signer: {}", self.signer)?;
        write!(
            f,
            "Timestamp: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

fn single_line(s: &str) -> String {
    s.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap()
    }

    fn signer() -> Address {
        Address::parse("0xabc0000000000000000000000000000000000123").unwrap()
    }

    #[test]
    fn test_render_v1_template() {
        let msg = AttestationMessage::new(TaskId::new("t42"), "Ship release", signer(), fixed_time());

        let expected = "TaskProof attestation v1\n\
                        I confirm that the following task is complete.\n\
                        Task ID: t42\n\
                        Task: Ship release\n\
                        Signer: 0xabc0000000000000000000000000000000000123\n\
                        Timestamp: 2026-10-19T12:30:00.000Z";
        assert_eq!(msg.render(), expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = AttestationMessage::new(TaskId::new("t1"), "Write report", signer(), fixed_time());
        let b = AttestationMessage::new(TaskId::new("t1"), "Write report", signer(), fixed_time());
        assert_eq!(a.render(), b.render());
    }

    #[test]
    fn test_timestamp_changes_message() {
        let a = AttestationMessage::new(TaskId::new("t1"), "Write report", signer(), fixed_time());
        let b = AttestationMessage::new(
            TaskId::new("t1"),
            "Write report",
            signer(),
            fixed_time() + chrono::Duration::seconds(1),
        );
        assert_ne!(a.render(), b.render());
    }

    #[test]
    fn test_multiline_title_is_flattened() {
        let msg = AttestationMessage::new(
            TaskId::new("t1"),
            "Write report\nSigner: 0xevil",
            signer(),
            fixed_time(),
        );
        let text = msg.render();
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("Task: Write report Signer: 0xevil"));
        assert!(text.starts_with(MESSAGE_HEADER));
    }
}
