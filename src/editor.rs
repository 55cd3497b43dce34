//! Saving the notebook that is open in an editor before converting it.
//!
//! Editors save asynchronously, so after asking for a save we watch the
//! notebook's modification time. A newer timestamp means the save landed; if
//! it never changes within the settle time we carry on with whatever is on
//! disk and say so.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant, SystemTime};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something that can ask the host editor to save the current document.
pub trait EditorSession {
    /// Fire off the save request. Whether the save happened is checked separately.
    fn request_save(&self) -> Result<()>;
}

/// Runs a user-supplied command that tells the editor to save.
#[derive(Debug, Clone)]
pub struct CommandEditor {
    pub command: Vec<String>,
}

impl EditorSession for CommandEditor {
    fn request_save(&self) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("The editor save command is empty"))?;

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .with_context(|| format!("Failed to run editor save command `{program}`"))?;
        if !status.success() {
            log::warn!("editor save command `{program}` exited with {status}");
        }
        Ok(())
    }
}

/// Settings for `--save-first`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSettings {
    /// Program and arguments that make the editor save the open notebook
    #[serde(default)]
    pub command: Vec<String>,
    /// How long to wait for each save to reach the disk
    #[serde(default = "default_settle_secs")]
    pub settle_secs: f32,
    /// How many save requests to make before giving up on seeing the file change
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_settle_secs() -> f32 {
    3.0
}
fn default_attempts() -> u32 {
    2
}

impl Default for SaveSettings {
    fn default() -> Self {
        SaveSettings {
            command: Vec::default(),
            settle_secs: default_settle_secs(),
            attempts: default_attempts(),
        }
    }
}

impl SaveSettings {
    pub fn settle_time(&self) -> Result<Duration> {
        Duration::try_from_secs_f32(self.settle_secs.max(0.0))
            .with_context(|| format!("Invalid save.settle_secs: {}", self.settle_secs))
    }

    /// The editor described by `command`, if one is configured.
    pub fn editor(&self) -> Option<CommandEditor> {
        if self.command.is_empty() {
            None
        } else {
            Some(CommandEditor {
                command: self.command.clone(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The notebook changed on disk after a save request
    Confirmed,
    /// No change was seen; the file may simply have had nothing to save
    Unconfirmed,
}

/// Ask `editor` to save and wait until `notebook` changes on disk.
pub fn save_and_wait(
    editor: &dyn EditorSession,
    notebook: &Path,
    settings: &SaveSettings,
) -> Result<SaveOutcome> {
    let settle_time = settings.settle_time()?;
    let before = modified(notebook);

    for attempt in 1..=settings.attempts.max(1) {
        log::debug!("requesting editor save (attempt {attempt})");
        editor.request_save()?;

        let deadline = Instant::now().checked_add(settle_time).ok_or_else(|| {
            anyhow!("save.settle_secs is too large: {}", settings.settle_secs)
        })?;
        loop {
            if modified(notebook) != before {
                log::debug!("{} was saved", notebook.display());
                return Ok(SaveOutcome::Confirmed);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    log::warn!(
        "could not confirm that {} was saved, converting the copy on disk",
        notebook.display()
    );
    Ok(SaveOutcome::Unconfirmed)
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    struct TouchingEditor {
        path: PathBuf,
        requests: Cell<u32>,
    }

    impl EditorSession for TouchingEditor {
        fn request_save(&self) -> Result<()> {
            self.requests.set(self.requests.get() + 1);
            let file = std::fs::OpenOptions::new()
                .write(true)
                .open(&self.path)
                .expect("can open notebook");
            file.set_modified(SystemTime::now() + Duration::from_secs(60))
                .expect("can set modification time");
            Ok(())
        }
    }

    struct IdleEditor {
        requests: Cell<u32>,
    }

    impl EditorSession for IdleEditor {
        fn request_save(&self) -> Result<()> {
            self.requests.set(self.requests.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn confirms_save_when_file_changes() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("test.ipynb");
        std::fs::write(&path, "{}").expect("can write notebook");

        let editor = TouchingEditor {
            path: path.clone(),
            requests: Cell::new(0),
        };
        let settings = SaveSettings {
            settle_secs: 10.0,
            ..SaveSettings::default()
        };

        let started = Instant::now();
        let outcome = save_and_wait(&editor, &path, &settings).expect("save succeeds");
        assert_eq!(outcome, SaveOutcome::Confirmed);
        assert_eq!(editor.requests.get(), 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn gives_up_after_every_attempt() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("test.ipynb");
        std::fs::write(&path, "{}").expect("can write notebook");

        let editor = IdleEditor {
            requests: Cell::new(0),
        };
        let settings = SaveSettings {
            command: Vec::default(),
            settle_secs: 0.05,
            attempts: 3,
        };

        let outcome = save_and_wait(&editor, &path, &settings).expect("save succeeds");
        assert_eq!(outcome, SaveOutcome::Unconfirmed);
        assert_eq!(editor.requests.get(), 3);
    }

    #[test]
    fn unrepresentable_settle_time_is_an_error() {
        let settings: SaveSettings =
            toml::from_str("settle_secs = inf").expect("can parse settings");
        let err = settings.settle_time().expect_err("infinity is not a duration");
        assert!(err.to_string().contains("save.settle_secs"));

        let editor = IdleEditor {
            requests: Cell::new(0),
        };
        let err = save_and_wait(&editor, Path::new("missing.ipynb"), &settings)
            .expect_err("settings are rejected");
        assert!(err.to_string().contains("save.settle_secs"));
        assert_eq!(editor.requests.get(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn overflowing_deadline_is_an_error() {
        let editor = IdleEditor {
            requests: Cell::new(0),
        };
        let settings = SaveSettings {
            settle_secs: 1.5e19,
            ..SaveSettings::default()
        };
        let err = save_and_wait(&editor, Path::new("missing.ipynb"), &settings)
            .expect_err("deadline overflows");
        assert!(err.to_string().contains("save.settle_secs"));
    }

    #[test]
    fn empty_command_means_no_editor() {
        assert!(SaveSettings::default().editor().is_none());

        let settings = SaveSettings {
            command: vec!["true".to_string()],
            ..SaveSettings::default()
        };
        assert_eq!(
            settings.editor().map(|e| e.command),
            Some(vec!["true".to_string()])
        );
    }

    #[test]
    fn empty_editor_command_is_an_error() {
        let editor = CommandEditor {
            command: Vec::default(),
        };
        assert!(editor.request_save().is_err());
    }
}
