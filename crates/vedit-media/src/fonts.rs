//! Copies bundled font files into engine storage.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vedit_models::Font;

use crate::engine::EngineHandle;

/// Where font files are read from on the host.
#[derive(Debug, Clone)]
pub struct FontSources {
    dir: PathBuf,
    fonts: Vec<Font>,
}

impl FontSources {
    /// All bundled fonts from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fonts: Font::ALL.to_vec(),
        }
    }

    /// Restrict to a subset of fonts.
    pub fn with_fonts(mut self, fonts: impl IntoIterator<Item = Font>) -> Self {
        self.fonts = fonts.into_iter().collect();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn source_path(&self, font: Font) -> PathBuf {
        self.dir.join(font.source_file())
    }
}

/// Write every configured font into engine storage as `<name>.ttf`.
///
/// Failures are logged per font and never abort the load. Returns the
/// number of fonts stored.
pub async fn load_fonts(engine: &mut EngineHandle, sources: &FontSources) -> usize {
    let mut loaded = 0;

    for font in &sources.fonts {
        let path = sources.source_path(*font);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(font = font.name(), path = %path.display(), error = %e, "Font source unavailable");
                continue;
            }
        };

        match engine.write_file(&font.storage_name(), &bytes).await {
            Ok(()) => {
                debug!(font = font.name(), "Font stored");
                loaded += 1;
            }
            Err(e) => warn!(font = font.name(), error = %e, "Failed to store font"),
        }
    }

    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, MockMediaEngine};
    use tempfile::TempDir;

    #[test]
    fn test_source_paths() {
        let sources = FontSources::new("/srv/fonts");
        assert_eq!(
            sources.source_path(Font::Henny),
            PathBuf::from("/srv/fonts/HennyPenny-Regular.ttf")
        );
    }

    #[test]
    fn test_missing_fonts_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("arial.ttf"), b"ttf").unwrap();

        let mut engine = MockMediaEngine::new();
        engine.expect_load().returning(|_| Ok(()));
        engine.expect_virtual_root().returning(|| "/".to_string());
        engine
            .expect_write_file()
            .withf(|name, bytes| name == "arial.ttf" && bytes == b"ttf")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut handle = EngineHandle::new(Box::new(engine), EngineConfig::default());
        let loaded = tokio_test::block_on(async {
            handle.load().await.unwrap();
            load_fonts(&mut handle, &FontSources::new(dir.path())).await
        });
        assert_eq!(loaded, 1);
    }
}
