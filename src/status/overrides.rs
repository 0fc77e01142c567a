//! # Override Store
//!
//! Marker files as a two-flag configuration store. A marker's presence turns
//! its mode on; its trimmed content is the reason shown to players.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};

/// Overrides read for one cycle
///
/// `Some(text)` means the marker is present; `text` is its trimmed content
/// and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverrideFlags {
    pub maintenance: Option<String>,
    pub admin_only: Option<String>,
}

impl OverrideFlags {
    /// No marker present
    pub fn none() -> Self {
        Self::default()
    }

    /// Maintenance marker with the given content
    pub fn maintenance(reason: impl Into<String>) -> Self {
        Self {
            maintenance: Some(reason.into()),
            admin_only: None,
        }
    }

    /// Admin-only marker with the given content
    pub fn admin_only(reason: impl Into<String>) -> Self {
        Self {
            maintenance: None,
            admin_only: Some(reason.into()),
        }
    }
}

/// Source of override flags, consulted once per cycle
pub trait OverrideStore: Send + Sync {
    /// Read the current flags. Never fails: unreadable markers count as absent.
    fn read_override_flags(&self) -> OverrideFlags;
}

/// Marker files on the local filesystem, read fresh on every call
#[derive(Debug, Clone)]
pub struct MarkerFileStore {
    maintenance_path: PathBuf,
    admin_only_path: PathBuf,
}

impl MarkerFileStore {
    pub fn new(maintenance_path: impl Into<PathBuf>, admin_only_path: impl Into<PathBuf>) -> Self {
        Self {
            maintenance_path: maintenance_path.into(),
            admin_only_path: admin_only_path.into(),
        }
    }

    pub fn maintenance_path(&self) -> &Path {
        &self.maintenance_path
    }

    pub fn admin_only_path(&self) -> &Path {
        &self.admin_only_path
    }

    fn read_marker(path: &Path, marker: &str) -> Option<String> {
        match Self::try_read_marker(path) {
            Ok(content) => content,
            Err(e) => {
                let path_str = path.display().to_string();
                let error = e.to_string();
                log_event_with_fields(
                    Event::MarkerReadFailed,
                    &[
                        ("error", error.as_str()),
                        ("marker", marker),
                        ("path", path_str.as_str()),
                    ],
                );
                None
            }
        }
    }

    fn try_read_marker(path: &Path) -> io::Result<Option<String>> {
        if !path.try_exists()? {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        Ok(Some(String::from_utf8_lossy(&bytes).trim().to_string()))
    }
}

impl OverrideStore for MarkerFileStore {
    fn read_override_flags(&self) -> OverrideFlags {
        // Maintenance wins outright; the admin-only marker is not consulted.
        if let Some(reason) = Self::read_marker(&self.maintenance_path, "maintenance") {
            return OverrideFlags::maintenance(reason);
        }

        OverrideFlags {
            maintenance: None,
            admin_only: Self::read_marker(&self.admin_only_path, "admin_only"),
        }
    }
}

/// Fixed flags, for tests and dry runs
#[derive(Debug, Default)]
pub struct StaticOverrides {
    flags: std::sync::RwLock<OverrideFlags>,
}

impl StaticOverrides {
    pub fn new(flags: OverrideFlags) -> Self {
        Self {
            flags: std::sync::RwLock::new(flags),
        }
    }

    /// Replace the flags returned from now on
    pub fn set(&self, flags: OverrideFlags) {
        if let Ok(mut current) = self.flags.write() {
            *current = flags;
        }
    }
}

impl OverrideStore for StaticOverrides {
    fn read_override_flags(&self) -> OverrideFlags {
        self.flags.read().map(|f| f.clone()).unwrap_or_default()
    }
}
