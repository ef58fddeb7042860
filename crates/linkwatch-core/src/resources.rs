//! Presentation resource lookup (icons, sounds) for bands.
//!
//! Lookups touch the filesystem, so they happen once while the band table
//! is compiled. A missing file yields no handle rather than an error.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Icon and sound handles for one band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub icon: Option<PathBuf>,
    pub sound: Option<PathBuf>,
}

/// Resolves a band name to presentation resources.
pub trait ResourceLocator {
    fn icon(&self, name: &str) -> Option<PathBuf>;

    fn sound(&self, name: &str) -> Option<PathBuf>;

    fn presentation(&self, name: &str) -> Presentation {
        Presentation {
            icon: self.icon(name),
            sound: self.sound(name),
        }
    }
}

/// Resources stored as `<dir>/<band name>.<ext>` files.
#[derive(Debug, Clone)]
pub struct FsResources {
    icon_dir: PathBuf,
    sound_dir: PathBuf,
    icon_ext: &'static str,
    sound_exts: &'static [&'static str],
}

impl FsResources {
    pub fn new(icon_dir: impl Into<PathBuf>, sound_dir: impl Into<PathBuf>) -> Self {
        Self {
            icon_dir: icon_dir.into(),
            sound_dir: sound_dir.into(),
            icon_ext: "png",
            sound_exts: &["ogg", "mp3", "wav"],
        }
    }

    pub fn icon_dir(&self) -> &Path {
        &self.icon_dir
    }

    pub fn sound_dir(&self) -> &Path {
        &self.sound_dir
    }
}

impl ResourceLocator for FsResources {
    fn icon(&self, name: &str) -> Option<PathBuf> {
        let path = self.icon_dir.join(format!("{name}.{}", self.icon_ext));
        path.is_file().then_some(path)
    }

    /// First existing extension wins.
    fn sound(&self, name: &str) -> Option<PathBuf> {
        self.sound_exts
            .iter()
            .map(|ext| self.sound_dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }
}

/// Locator that never finds anything (headless use, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl ResourceLocator for NoResources {
    fn icon(&self, _name: &str) -> Option<PathBuf> {
        None
    }

    fn sound(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}
