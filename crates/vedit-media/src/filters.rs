//! Filter-graph composition from editor options.
//!
//! The builder only concatenates known-good fragments; it never checks
//! the syntax of caller-supplied expressions and never fails.

use serde::{Deserialize, Serialize};
use vedit_models::{EditOptions, NO_OP_FILTER};

/// Fixed image overlay fragment. The offset is not user-configurable.
pub const IMAGE_OVERLAY_FILTER: &str = "overlay=10:10";

/// Font size used by the text overlay.
pub const TEXT_FONT_SIZE: u32 = 24;

/// Root under which font files are addressable in engine storage.
pub const DEFAULT_FONT_ROOT: &str = "/";

/// Filter expressions derived from one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPlan {
    /// Primary video filter, applied in the first transform stage
    pub primary_filter: String,
    /// Comma-joined overlay and text-draw fragments
    pub composite_filter: String,
}

impl FilterPlan {
    pub fn is_empty(&self) -> bool {
        self.primary_filter.is_empty() && self.composite_filter.is_empty()
    }

    pub fn has_primary(&self) -> bool {
        !self.primary_filter.is_empty()
    }

    pub fn has_composite(&self) -> bool {
        !self.composite_filter.is_empty()
    }

    /// Whether the composite chain starts with the image overlay.
    ///
    /// The overlay fragment is always pushed first, so a prefix check is
    /// enough and cannot be fooled by overlay text.
    pub fn uses_overlay_image(&self) -> bool {
        self.composite_filter == IMAGE_OVERLAY_FILTER
            || self
                .composite_filter
                .starts_with(&format!("{},", IMAGE_OVERLAY_FILTER))
    }
}

/// Builder for [`FilterPlan`] with a configurable font root.
#[derive(Debug, Clone)]
pub struct FilterPlanBuilder {
    font_root: String,
}

impl Default for FilterPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPlanBuilder {
    pub fn new() -> Self {
        Self {
            font_root: DEFAULT_FONT_ROOT.to_string(),
        }
    }

    /// Set the storage root prepended to `<font>.ttf`.
    pub fn font_root(mut self, root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.ends_with('/') {
            root.push('/');
        }
        self.font_root = root;
        self
    }

    /// Compose the plan. Rules are applied in order and are independent.
    pub fn build(&self, options: &EditOptions) -> FilterPlan {
        let mut composite: Vec<String> = Vec::new();

        let primary_filter = options
            .filter_expression
            .as_deref()
            .filter(|f| !f.is_empty() && *f != NO_OP_FILTER)
            .unwrap_or_default()
            .to_string();

        if options.has_overlay_image {
            composite.push(IMAGE_OVERLAY_FILTER.to_string());
        }

        if let Some(text) = options.overlay_text.as_deref().filter(|t| !t.is_empty()) {
            composite.push(self.draw_text_filter(options, text));
        }

        FilterPlan {
            primary_filter,
            composite_filter: composite.join(","),
        }
    }

    fn font_file(&self, options: &EditOptions) -> Option<String> {
        options
            .overlay_font
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|font| format!("fontfile={}{}.ttf", self.font_root, font))
    }

    // Text goes in unescaped: a quote or colon in `text` breaks the expression.
    fn draw_text_filter(&self, options: &EditOptions, text: &str) -> String {
        let (x, y) = options.resolved_position();
        let font = self
            .font_file(options)
            .map(|f| format!("{}:", f))
            .unwrap_or_default();

        format!(
            "drawtext={}text='{}':x={}:y={}:fontsize={}:fontcolor={}",
            font,
            text,
            x,
            y,
            TEXT_FONT_SIZE,
            options.resolved_color()
        )
    }
}

/// Build a plan with the default font root.
pub fn build_filter_plan(options: &EditOptions) -> FilterPlan {
    FilterPlanBuilder::new().build(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_models::{FilterPreset, NamedPosition};

    #[test]
    fn test_empty_options_produce_empty_plan() {
        let plan = build_filter_plan(&EditOptions::new());
        assert_eq!(plan, FilterPlan::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_strings_produce_empty_plan() {
        let options = EditOptions::new().with_filter("").with_text("");
        assert!(build_filter_plan(&options).is_empty());
    }

    #[test]
    fn test_no_op_sentinel_is_dropped() {
        let plan = build_filter_plan(&EditOptions::new().with_filter("null"));
        assert_eq!(plan.primary_filter, "");
    }

    #[test]
    fn test_primary_filter_verbatim() {
        let options = EditOptions::new().with_filter(FilterPreset::Invert.expression());
        let plan = build_filter_plan(&options);
        assert_eq!(plan.primary_filter, "negate,format=yuv420p");
        assert_eq!(plan.composite_filter, "");
    }

    #[test]
    fn test_all_named_positions() {
        let expected = [
            ("Top Left", "x=10:y=10"),
            ("Top Center", "x=(w-text_w)/2:y=10"),
            ("Top Right", "x=w-text_w-10:y=10"),
            ("Center Left", "x=10:y=(h-text_h)/2"),
            ("Center", "x=(w-text_w)/2:y=(h-text_h)/2"),
            ("Center Right", "x=w-text_w-10:y=(h-text_h)/2"),
            ("Bottom Left", "x=10:y=h-text_h-10"),
            ("Bottom Center", "x=(w-text_w)/2:y=h-text_h-10"),
            ("Bottom Right", "x=w-text_w-10:y=h-text_h-10"),
        ];
        assert_eq!(expected.len(), NamedPosition::ALL.len());

        for (label, coords) in expected {
            let options = EditOptions::new().with_text("T").with_position_label(label);
            let plan = build_filter_plan(&options);
            assert_eq!(
                plan.composite_filter,
                format!("drawtext=text='T':{}:fontsize=24:fontcolor=#ffffff", coords),
                "position {}",
                label
            );
        }
    }

    #[test]
    fn test_unknown_position_falls_back() {
        let options = EditOptions::new().with_text("T").with_position_label("Upside Down");
        let plan = build_filter_plan(&options);
        assert!(plan.composite_filter.contains(":x=10:y=10:"));
    }

    #[test]
    fn test_full_text_overlay() {
        let options = EditOptions::new()
            .with_text("Hello")
            .with_font("arial")
            .with_color("#ff0000")
            .with_position(NamedPosition::Center);
        let plan = build_filter_plan(&options);
        assert_eq!(
            plan.composite_filter,
            "drawtext=fontfile=/arial.ttf:text='Hello':x=(w-text_w)/2:y=(h-text_h)/2:fontsize=24:fontcolor=#ff0000"
        );
    }

    #[test]
    fn test_overlay_image_only() {
        let plan = build_filter_plan(&EditOptions::new().with_overlay_image());
        assert_eq!(plan.composite_filter, "overlay=10:10");
        assert!(plan.uses_overlay_image());
    }

    #[test]
    fn test_overlay_then_text_joined_with_comma() {
        let options = EditOptions::new()
            .with_overlay_image()
            .with_text("Hi")
            .with_filter("hue=s=0");
        let plan = build_filter_plan(&options);
        assert_eq!(plan.primary_filter, "hue=s=0");
        assert_eq!(
            plan.composite_filter,
            "overlay=10:10,drawtext=text='Hi':x=10:y=10:fontsize=24:fontcolor=#ffffff"
        );
        assert!(plan.uses_overlay_image());
    }

    #[test]
    fn test_overlay_text_does_not_count_as_image() {
        let plan = build_filter_plan(&EditOptions::new().with_text("overlay=10:10"));
        assert!(!plan.uses_overlay_image());
    }

    #[test]
    fn test_single_quote_passes_through_unescaped() {
        let plan = build_filter_plan(&EditOptions::new().with_text("it's: here"));
        assert_eq!(
            plan.composite_filter,
            "drawtext=text='it's: here':x=10:y=10:fontsize=24:fontcolor=#ffffff"
        );
    }

    #[test]
    fn test_custom_font_root() {
        let builder = FilterPlanBuilder::new().font_root("/tmp/vedit/storage");
        let plan = builder.build(&EditOptions::new().with_text("A").with_font("henny"));
        assert!(plan
            .composite_filter
            .starts_with("drawtext=fontfile=/tmp/vedit/storage/henny.ttf:text='A'"));
    }
}
