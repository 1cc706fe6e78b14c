//! Archive entry names derived from project identifiers.

use crate::error::{ArchiveError, Result};
use fibermap_core::CollisionPolicy;
use std::collections::HashMap;

/// Name given to projects whose identifier is blank after cleaning
pub const UNNAMED: &str = "unnamed";

/// Characters that are unsafe in file names on common platforms
const RESERVED: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// File-system-safe stem for `project`.
///
/// Surrounding whitespace is trimmed; reserved characters and control
/// characters become `_`; a blank result becomes [`UNNAMED`].
#[must_use]
pub fn entry_stem(project: &str) -> String {
    let cleaned: String = project
        .trim()
        .chars()
        .map(|c| if RESERVED.contains(&c) || c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        UNNAMED.to_string()
    } else {
        cleaned
    }
}

/// Entry name for `project` with extension `ext`, e.g. `Cluster A.kml`
///
/// ```
/// use fibermap_archive::entry_name;
/// assert_eq!(entry_name(" A/B ", "kml"), "A_B.kml");
/// assert_eq!(entry_name("  ", "kml"), "unnamed.kml");
/// ```
#[must_use]
pub fn entry_name(project: &str, ext: &str) -> String {
    format!("{}.{ext}", entry_stem(project))
}

/// Hands out unique entry names, one per project.
///
/// Uniqueness is case-insensitive so archives extract cleanly on
/// case-insensitive file systems.
#[derive(Debug, Clone)]
pub struct EntryNamer {
    extension: String,
    policy: CollisionPolicy,
    /// lowercased entry name -> project that owns it
    taken: HashMap<String, String>,
}

impl EntryNamer {
    /// A namer producing `*.{extension}` entries
    #[must_use]
    pub fn new(extension: impl Into<String>, policy: CollisionPolicy) -> Self {
        Self {
            extension: extension.into(),
            policy,
            taken: HashMap::new(),
        }
    }

    /// Reserve the entry name for `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NameCollision`] when the name is taken and the
    /// policy is [`CollisionPolicy::Reject`].
    pub fn claim(&mut self, project: &str) -> Result<String> {
        let stem = entry_stem(project);
        let name = format!("{stem}.{}", self.extension);
        let key = name.to_lowercase();
        let Some(owner) = self.taken.get(&key) else {
            self.taken.insert(key, project.to_string());
            return Ok(name);
        };

        match self.policy {
            CollisionPolicy::Reject => Err(ArchiveError::NameCollision {
                entry: name,
                first: owner.clone(),
                second: project.to_string(),
            }),
            CollisionPolicy::Suffix => {
                let mut n = 2usize;
                loop {
                    let candidate = format!("{stem} ({n}).{}", self.extension);
                    if !self.taken.contains_key(&candidate.to_lowercase()) {
                        log::warn!("project '{project}' renamed to '{candidate}' to avoid '{name}'");
                        self.taken.insert(candidate.to_lowercase(), project.to_string());
                        return Ok(candidate);
                    }
                    n += 1;
                }
            }
        }
    }

    /// Whether `entry` has been handed out (case-insensitive)
    #[must_use]
    pub fn is_taken(&self, entry: &str) -> bool {
        self.taken.contains_key(&entry.to_lowercase())
    }
}
