//! Command history backed by reedline's `FileBackedHistory`
//!
//! Submitted lines are stored oldest first. With persistence on, every line is
//! synced to the history file right away so a crashed session keeps it; the
//! next session loads the file when the history is created.
//!
//! Browsing with Up/Down walks back from the newest entry. The line being
//! edited when browsing starts is kept as a draft and comes back when the
//! user moves past the newest entry again.

use std::fmt;
use std::fs;
use std::path::Path;

use reedline::{FileBackedHistory, History, HistoryItem, SearchDirection, SearchQuery};
use tracing::{debug, warn};

use crate::config::HistoryConfig;
use crate::error::Result;

/// Submitted lines plus the browsing position of the current prompt
pub struct ShellHistory {
    store: FileBackedHistory,
    persist: bool,
    /// Steps back from the newest entry while browsing, 1 being the newest
    position: Option<usize>,
    /// Line being edited before browsing started
    draft: String,
}

impl ShellHistory {
    /// History kept only for the lifetime of the shell
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries
    pub fn in_memory(max_size: usize) -> Result<Self> {
        Ok(Self::from_store(FileBackedHistory::new(max_size)?, false))
    }

    /// History loaded from and synced to `path`
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries
    /// * `path` - History file
    pub fn with_file(max_size: usize, path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let store = FileBackedHistory::with_file(max_size, path.to_path_buf())?;
        let history = Self::from_store(store, true);
        debug!(
            "Loaded {} history entries from {}",
            history.len(),
            path.display()
        );
        Ok(history)
    }

    /// Build the history described by the configuration
    pub fn from_config(config: &HistoryConfig) -> Result<Self> {
        if config.persist {
            Self::with_file(config.max_size, &config.file_path)
        } else {
            Self::in_memory(config.max_size)
        }
    }

    fn from_store(store: FileBackedHistory, persist: bool) -> Self {
        Self {
            store,
            persist,
            position: None,
            draft: String::new(),
        }
    }

    /// Record a submitted line
    ///
    /// Blank lines are ignored and a line equal to the newest entry is not
    /// stored twice.
    ///
    /// # Arguments
    /// * `line` - Submitted line
    ///
    /// # Returns
    /// * `Result<()>` - Error when the history file cannot be written
    pub fn add(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        self.store.save(HistoryItem::from_command_line(line))?;
        if self.persist {
            self.store.sync()?;
        }
        Ok(())
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        let mut entries = self.newest_first();
        entries.reverse();
        entries
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.newest_first().len()
    }

    /// Whether nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget the browsing position, as when a new prompt starts
    pub fn reset(&mut self) {
        self.position = None;
        self.draft.clear();
    }

    /// Step to the next older entry
    ///
    /// # Arguments
    /// * `current` - Line being edited, kept as the draft on the first step
    ///
    /// # Returns
    /// * `Option<String>` - Line to show, None when there is no history
    pub fn previous(&mut self, current: &str) -> Option<String> {
        let entries = self.newest_first();
        if entries.is_empty() {
            return None;
        }

        let position = match self.position {
            None => {
                self.draft = current.to_string();
                1
            }
            Some(position) => (position + 1).min(entries.len()),
        };
        self.position = Some(position);
        entries.get(position - 1).cloned()
    }

    /// Step to the next newer entry, or back to the draft
    ///
    /// # Returns
    /// * `Option<String>` - Line to show, None when not browsing
    pub fn next(&mut self) -> Option<String> {
        match self.position? {
            1 => {
                self.position = None;
                Some(std::mem::take(&mut self.draft))
            }
            position => {
                self.position = Some(position - 1);
                self.newest_first().get(position - 2).cloned()
            }
        }
    }

    fn newest_first(&self) -> Vec<String> {
        let query = SearchQuery::everything(SearchDirection::Backward, None);
        match self.store.search(query) {
            Ok(items) => items.into_iter().map(|item| item.command_line).collect(),
            Err(e) => {
                warn!("History search failed: {}", e);
                Vec::new()
            }
        }
    }
}

impl fmt::Debug for ShellHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellHistory")
            .field("persist", &self.persist)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
