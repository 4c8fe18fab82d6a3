//! Fonts available for the text overlay.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Font bundled with the editor.
///
/// Each font is stored in engine storage as `<name>.ttf` once the
/// engine is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Arial,
    Henny,
    Kablamo,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Arial, Font::Henny, Font::Kablamo];

    /// Name used in edit options and in the stored file name.
    pub fn name(&self) -> &'static str {
        match self {
            Font::Arial => "arial",
            Font::Henny => "henny",
            Font::Kablamo => "kablamo",
        }
    }

    /// Name of the font file inside engine storage.
    pub fn storage_name(&self) -> String {
        format!("{}.ttf", self.name())
    }

    /// Source file name shipped in the font directory.
    pub fn source_file(&self) -> &'static str {
        match self {
            Font::Arial => "arial.ttf",
            Font::Henny => "HennyPenny-Regular.ttf",
            Font::Kablamo => "Kablammo-Regular.ttf",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}
