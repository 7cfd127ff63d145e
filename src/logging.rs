//! Optional transcript logging to a file.
//!
//! Enabled with `--log <file>` at startup or the `/log` command at
//! runtime; `/log` with no argument pauses and resumes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub struct TranscriptLog {
    file_path: Option<String>,
    is_active: bool,
}

impl TranscriptLog {
    pub fn new(log_file: Option<String>) -> Self {
        let is_active = log_file.is_some();
        TranscriptLog {
            file_path: log_file,
            is_active,
        }
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        self.test_file_access(&path)?;
        self.file_path = Some(path.clone());
        self.is_active = true;
        Ok(format!("Logging enabled to: {}", path))
    }

    pub fn toggle(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {}", path))
                } else {
                    Ok(format!("Logging paused (file: {})", path))
                }
            }
            None => Err("No log file set. Use /log <filename> to enable logging first.".into()),
        }
    }

    pub fn append(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        for line in content.lines() {
            writeln!(file, "{}", line)?;
        }
        // Blank separator between messages, matching the screen layout.
        writeln!(file)?;
        file.flush()?;
        Ok(())
    }

    pub fn status(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn append_is_a_no_op_when_disabled() {
        let log = TranscriptLog::new(None);
        log.append("You: hello").expect("append");
        assert_eq!(log.status(), "disabled");
    }

    #[test]
    fn append_writes_and_separates_messages() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.log");
        let log = TranscriptLog::new(Some(path.to_string_lossy().into_owned()));

        log.append("You: hello").expect("append");
        log.append("Counselor: hi").expect("append");

        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "You: hello\n\nCounselor: hi\n\n");
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.log");
        let mut log = TranscriptLog::new(Some(path.to_string_lossy().into_owned()));

        log.toggle().expect("pause");
        log.append("You: hidden").expect("append");
        log.toggle().expect("resume");
        log.append("You: visible").expect("append");

        let contents = std::fs::read_to_string(&path).expect("read");
        assert!(!contents.contains("hidden"));
        assert!(contents.contains("visible"));
    }

    #[test]
    fn toggle_without_file_is_an_error() {
        let mut log = TranscriptLog::new(None);
        assert!(log.toggle().is_err());
    }
}
