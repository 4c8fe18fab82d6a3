//! Named video filter presets offered by the editor.
//!
//! Expression values are passed to the engine verbatim as the primary
//! filter.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sentinel filter value meaning "leave the video unchanged".
pub const NO_OP_FILTER: &str = "null";

/// Built-in filter preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    Original,
    Grayscale,
    Sepia,
    Invert,
    Brightness,
    Contrast,
    YellowTint,
    BlueTint,
    GreenTint,
    WarmGlow,
    CoolTone,
}

impl FilterPreset {
    /// All presets in picker order.
    pub const ALL: [FilterPreset; 11] = [
        FilterPreset::Original,
        FilterPreset::Grayscale,
        FilterPreset::Sepia,
        FilterPreset::Invert,
        FilterPreset::Brightness,
        FilterPreset::Contrast,
        FilterPreset::YellowTint,
        FilterPreset::BlueTint,
        FilterPreset::GreenTint,
        FilterPreset::WarmGlow,
        FilterPreset::CoolTone,
    ];

    /// Label shown in the filter picker.
    pub fn label(&self) -> &'static str {
        match self {
            FilterPreset::Original => "None (Original)",
            FilterPreset::Grayscale => "Grayscale",
            FilterPreset::Sepia => "Sepia (Alternative)",
            FilterPreset::Invert => "Invert Colors",
            FilterPreset::Brightness => "Brightness + Light",
            FilterPreset::Contrast => "Contrast Increase",
            FilterPreset::YellowTint => "Yellow Tint (Alternative)",
            FilterPreset::BlueTint => "Blue Tint",
            FilterPreset::GreenTint => "Green Tint",
            FilterPreset::WarmGlow => "Warm Glow",
            FilterPreset::CoolTone => "Cool Tone",
        }
    }

    /// Filter-graph expression for this preset. Empty for `Original`.
    pub fn expression(&self) -> &'static str {
        match self {
            FilterPreset::Original => "",
            FilterPreset::Grayscale => "hue=s=0",
            FilterPreset::Sepia => "eq=contrast=1.2:brightness=0.05:saturation=1.3,format=yuv420p",
            FilterPreset::Invert => "negate,format=yuv420p",
            FilterPreset::Brightness => "eq=brightness=0.06,format=yuv420p",
            FilterPreset::Contrast => "eq=contrast=1.5,format=yuv420p",
            FilterPreset::YellowTint => "eq=gamma_r=1.2:gamma_g=1.2:gamma_b=0.8,format=yuv420p",
            FilterPreset::BlueTint => "eq=gamma_r=0.8:gamma_g=0.8:gamma_b=1.5,format=yuv420p",
            FilterPreset::GreenTint => "eq=gamma_r=0.8:gamma_g=1.5:gamma_b=0.8,format=yuv420p",
            FilterPreset::WarmGlow => "eq=brightness=0.06:contrast=1.1:saturation=1.2,format=yuv420p",
            FilterPreset::CoolTone => "eq=brightness=-0.02:contrast=1.1:saturation=0.8,format=yuv420p",
        }
    }

    /// Look up a preset by label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label.trim()))
    }
}
