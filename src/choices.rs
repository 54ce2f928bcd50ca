//! Selection model for list-style dialogs
//!
//! [`Choices`] bundles the labelled options shown by radio lists, checklists
//! and dropdowns. Each option gets a stable identifier; after a dialog the
//! model records which ones the user picked and runs any per-option callbacks.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{DialogError, Result};

/// One option as handed to a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceEntry {
    /// Stable identifier (returned by backends that print tags)
    pub id: String,
    /// Text shown to the user
    pub label: String,
    /// Pre-selected / chosen state
    pub selected: bool,
}

type Callback = Box<dyn FnMut(&str)>;

/// Ordered options with selection state and optional callbacks
#[derive(Default)]
pub struct Choices {
    entries: Vec<ChoiceEntry>,
    callbacks: HashMap<String, Callback>,
}

impl fmt::Debug for Choices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choices")
            .field("entries", &self.entries)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Choices {
    /// Build from labels; identifiers are generated as `choice_000`, `choice_001`, ...
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| ChoiceEntry {
                id: format!("choice_{i:03}"),
                label: label.into(),
                selected: false,
            })
            .collect();
        Self {
            entries,
            callbacks: HashMap::new(),
        }
    }

    /// Build from caller-chosen `(id, label)` pairs; ids must be unique and non-empty
    pub fn with_ids<I, A, B>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (id, label) in pairs {
            let id = id.into();
            if id.is_empty() {
                return Err(DialogError::invalid("choices", "identifiers must not be empty"));
            }
            if !seen.insert(id.clone()) {
                return Err(DialogError::invalid("choices", format!("duplicate identifier '{id}'")));
            }
            entries.push(ChoiceEntry {
                id,
                label: label.into(),
                selected: false,
            });
        }
        Ok(Self {
            entries,
            callbacks: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChoiceEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn label_of(&self, id: &str) -> Option<&str> {
        self.entry(id).map(|e| e.label.as_str())
    }

    fn entry(&self, id: &str) -> Option<&ChoiceEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DialogError::invalid("choices", format!("no choice with identifier '{id}'")))
    }

    /// Mark an option as selected before showing the dialog
    pub fn preselect(&mut self, id: &str) -> Result<()> {
        let i = self.position(id)?;
        self.entries[i].selected = true;
        Ok(())
    }

    /// Builder-style [`preselect`](Self::preselect)
    pub fn with_default(mut self, id: &str) -> Result<Self> {
        self.preselect(id)?;
        Ok(self)
    }

    /// Register a callback run with the label when `id` is chosen
    pub fn on_select(&mut self, id: &str, callback: impl FnMut(&str) + 'static) -> Result<()> {
        self.position(id)?;
        self.callbacks.insert(id.to_string(), Box::new(callback));
        Ok(())
    }

    /// Entries for a single-choice dialog; more than one preselected entry is an error
    pub fn single_entries(&self) -> Result<Vec<ChoiceEntry>> {
        let preselected = self.entries.iter().filter(|e| e.selected).count();
        if preselected > 1 {
            return Err(DialogError::invalid(
                "default",
                format!("{preselected} options preselected for a single-choice dialog"),
            ));
        }
        Ok(self.entries.clone())
    }

    /// Record the chosen identifiers, in the order the backend reported them.
    ///
    /// Every other entry is deselected. Callbacks run once per chosen id, in order.
    pub fn apply(&mut self, chosen: &[String]) -> Result<()> {
        for id in chosen {
            self.position(id)?;
        }
        for entry in &mut self.entries {
            entry.selected = chosen.iter().any(|c| *c == entry.id);
        }
        for id in chosen {
            let label = self.label_of(id).unwrap_or_default().to_string();
            if let Some(callback) = self.callbacks.get_mut(id) {
                callback(&label);
            }
        }
        Ok(())
    }

    /// Clear every selection (after a cancelled dialog the caller may want this)
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.selected = false;
        }
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.id.as_str())
            .collect()
    }

    pub fn selected_labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.label.as_str())
            .collect()
    }
}
