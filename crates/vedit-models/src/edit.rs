//! Edit options captured when the user submits the editor form.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text color used when the form leaves the color empty.
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// Position used when the requested label is absent or unknown.
pub const FALLBACK_POSITION: (&str, &str) = ("10", "10");

/// Named anchor for the text overlay.
///
/// Each variant maps to an `(x, y)` pair written in filter-graph
/// coordinate syntax (`w`, `h`, `text_w`, `text_h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum NamedPosition {
    #[serde(rename = "Top Left")]
    TopLeft,
    #[serde(rename = "Top Center")]
    TopCenter,
    #[serde(rename = "Top Right")]
    TopRight,
    #[serde(rename = "Center Left")]
    CenterLeft,
    #[serde(rename = "Center")]
    Center,
    #[serde(rename = "Center Right")]
    CenterRight,
    #[serde(rename = "Bottom Left")]
    BottomLeft,
    #[serde(rename = "Bottom Center")]
    BottomCenter,
    #[serde(rename = "Bottom Right")]
    BottomRight,
}

impl NamedPosition {
    /// All positions in display order.
    pub const ALL: [NamedPosition; 9] = [
        NamedPosition::TopLeft,
        NamedPosition::TopCenter,
        NamedPosition::TopRight,
        NamedPosition::CenterLeft,
        NamedPosition::Center,
        NamedPosition::CenterRight,
        NamedPosition::BottomLeft,
        NamedPosition::BottomCenter,
        NamedPosition::BottomRight,
    ];

    /// Human-readable label shown in the position picker.
    pub fn label(&self) -> &'static str {
        match self {
            NamedPosition::TopLeft => "Top Left",
            NamedPosition::TopCenter => "Top Center",
            NamedPosition::TopRight => "Top Right",
            NamedPosition::CenterLeft => "Center Left",
            NamedPosition::Center => "Center",
            NamedPosition::CenterRight => "Center Right",
            NamedPosition::BottomLeft => "Bottom Left",
            NamedPosition::BottomCenter => "Bottom Center",
            NamedPosition::BottomRight => "Bottom Right",
        }
    }

    /// Look up a position by its exact label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    /// The `(x, y)` expression pair for this position.
    pub fn coordinates(&self) -> (&'static str, &'static str) {
        match self {
            NamedPosition::TopLeft => ("10", "10"),
            NamedPosition::TopCenter => ("(w-text_w)/2", "10"),
            NamedPosition::TopRight => ("w-text_w-10", "10"),
            NamedPosition::CenterLeft => ("10", "(h-text_h)/2"),
            NamedPosition::Center => ("(w-text_w)/2", "(h-text_h)/2"),
            NamedPosition::CenterRight => ("w-text_w-10", "(h-text_h)/2"),
            NamedPosition::BottomLeft => ("10", "h-text_h-10"),
            NamedPosition::BottomCenter => ("(w-text_w)/2", "h-text_h-10"),
            NamedPosition::BottomRight => ("w-text_w-10", "h-text_h-10"),
        }
    }
}

impl fmt::Display for NamedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of the editor form taken at submit time.
///
/// Every field is optional; the filter builder degrades missing or
/// unknown values to defaults instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditOptions {
    /// Primary video filter expression (e.g. a preset value)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,

    /// Text to draw over the video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_text: Option<String>,

    /// Font name, resolved to `<name>.ttf` in engine storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_font: Option<String>,

    /// Position label, see [`NamedPosition::label`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_position: Option<String>,

    /// Text color (any value the engine accepts, usually `#rrggbb`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_color: Option<String>,

    /// Whether an overlay image accompanies the submission
    #[serde(default)]
    pub has_overlay_image: bool,
}

impl EditOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary filter expression.
    pub fn with_filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    /// Set the overlay text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.overlay_text = Some(text.into());
        self
    }

    /// Set the overlay font name.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.overlay_font = Some(font.into());
        self
    }

    /// Set the overlay position from a named position.
    pub fn with_position(mut self, position: NamedPosition) -> Self {
        self.overlay_position = Some(position.label().to_string());
        self
    }

    /// Set the overlay position from a raw label (may be unknown).
    pub fn with_position_label(mut self, label: impl Into<String>) -> Self {
        self.overlay_position = Some(label.into());
        self
    }

    /// Set the overlay text color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.overlay_color = Some(color.into());
        self
    }

    /// Mark that an overlay image is attached.
    pub fn with_overlay_image(mut self) -> Self {
        self.has_overlay_image = true;
        self
    }

    /// Resolve the overlay position to an `(x, y)` expression pair.
    pub fn resolved_position(&self) -> (&'static str, &'static str) {
        self.overlay_position
            .as_deref()
            .and_then(NamedPosition::from_label)
            .map(|p| p.coordinates())
            .unwrap_or(FALLBACK_POSITION)
    }

    /// Resolve the overlay color, falling back to white.
    pub fn resolved_color(&self) -> &str {
        self.overlay_color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TEXT_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip_for_all_positions() {
        for position in NamedPosition::ALL {
            assert_eq!(NamedPosition::from_label(position.label()), Some(position));
        }
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(NamedPosition::from_label("Middle"), None);
        assert_eq!(NamedPosition::from_label("center"), None);
    }

    #[test]
    fn test_resolved_position_fallback() {
        let options = EditOptions::new().with_position_label("Somewhere");
        assert_eq!(options.resolved_position(), ("10", "10"));

        let options = EditOptions::new();
        assert_eq!(options.resolved_position(), FALLBACK_POSITION);
    }

    #[test]
    fn test_resolved_color_default() {
        assert_eq!(EditOptions::new().resolved_color(), "#ffffff");
        assert_eq!(EditOptions::new().with_color("").resolved_color(), "#ffffff");
        assert_eq!(EditOptions::new().with_color("#00ff00").resolved_color(), "#00ff00");
    }

    #[test]
    fn test_position_serializes_as_label() {
        let json = serde_json::to_string(&NamedPosition::BottomRight).unwrap();
        assert_eq!(json, "\"Bottom Right\"");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: EditOptions =
            serde_json::from_str(r#"{"overlay_text":"Hi","overlay_position":"Center"}"#).unwrap();
        assert_eq!(options.overlay_text.as_deref(), Some("Hi"));
        assert!(!options.has_overlay_image);
        assert_eq!(options.resolved_position(), ("(w-text_w)/2", "(h-text_h)/2"));
    }
}
