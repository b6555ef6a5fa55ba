use crate::AlertError;
use lookout_base::logging::format_unix_timestamp;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::process::Command;

/// A message about one label, ready to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub label: String,
    pub time: SystemTime,
    /// Snapshot to attach, if one was saved.
    pub image: Option<PathBuf>,
}

impl Alert {
    pub fn new(label: impl Into<String>, time: SystemTime) -> Self {
        Self {
            label: label.into(),
            time,
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// UTC time of the alert as `YYYY-MM-DDTHH:MM:SS`.
    pub fn timestamp(&self) -> String {
        let secs = self
            .time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format_unix_timestamp(secs)
    }

    /// `"<label> detected at <timestamp>"`
    pub fn subject(&self) -> String {
        format!("{} detected at {}", self.label, self.timestamp())
    }
}

/// Delivers alerts to people.
#[allow(async_fn_in_trait)]
pub trait Alerter {
    async fn send(&mut self, alert: &Alert) -> Result<(), AlertError>;
}

/// Writes alerts to the log.
pub struct LogAlerter {
    recipients: Vec<String>,
}

impl LogAlerter {
    pub fn new(recipients: Vec<String>) -> Self {
        Self { recipients }
    }
}

impl Alerter for LogAlerter {
    async fn send(&mut self, alert: &Alert) -> Result<(), AlertError> {
        log::info!("ALERT to [{}]: {}", self.recipients.join(", "), alert.subject());
        Ok(())
    }
}

/// Runs an external program for each alert.
///
/// The program sees `LOOKOUT_LABEL`, `LOOKOUT_TIME`, `LOOKOUT_RECIPIENTS`
/// (comma separated) and `LOOKOUT_SUBJECT` in its environment, plus
/// `LOOKOUT_IMAGE` when the alert has a snapshot.
pub struct CommandAlerter {
    program: String,
    args: Vec<String>,
    recipients: Vec<String>,
}

impl CommandAlerter {
    pub fn new(program: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            recipients,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Alerter for CommandAlerter {
    async fn send(&mut self, alert: &Alert) -> Result<(), AlertError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env("LOOKOUT_LABEL", &alert.label)
            .env("LOOKOUT_TIME", alert.timestamp())
            .env("LOOKOUT_SUBJECT", alert.subject())
            .env("LOOKOUT_RECIPIENTS", self.recipients.join(","))
            .kill_on_drop(true);
        match &alert.image {
            Some(image) => command.env("LOOKOUT_IMAGE", image),
            None => command.env_remove("LOOKOUT_IMAGE"),
        };

        let status = command.status().await.map_err(|e| {
            AlertError::Dispatch(format!("failed to run {}: {}", self.program, e))
        })?;
        if !status.success() {
            return Err(AlertError::Dispatch(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        log::info!("sent alert: {}", alert.subject());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_subject() {
        let alert = Alert::new("turkey", UNIX_EPOCH + Duration::from_secs(1_709_210_096));
        assert_eq!(alert.subject(), "turkey detected at 2024-02-29T12:34:56");
    }
}
