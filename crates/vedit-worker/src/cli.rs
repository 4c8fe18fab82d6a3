//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vedit_models::{EditOptions, FilterPreset, TrimRange};

use crate::error::WorkerResult;

#[derive(Parser, Debug)]
#[command(name = "vedit", version, about = "Edit and convert video clips with ffmpeg")]
pub struct Cli {
    /// Print collected metrics in Prometheus text format on exit.
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a filter, text and/or image overlay and trim to a clip.
    Edit(EditArgs),
    /// Convert a file to another container.
    Convert(ConvertArgs),
    /// List text overlay positions.
    Positions,
    /// List filter presets.
    Filters,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Input clip.
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Output extension (mp4, webm, avi, ogg, mov, mp3).
    #[arg(long, default_value = "mp4")]
    pub format: String,

    /// Output path; defaults to `output.<format>` in the current directory.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Filter preset label (e.g. "Grayscale") or a raw filter expression.
    #[arg(long)]
    pub filter: Option<String>,

    /// Text drawn over the video.
    #[arg(long)]
    pub text: Option<String>,

    /// Font for the text (arial, henny, kablamo).
    #[arg(long)]
    pub font: Option<String>,

    /// Text color.
    #[arg(long)]
    pub color: Option<String>,

    /// Text position label (see `vedit positions`).
    #[arg(long)]
    pub position: Option<String>,

    /// PNG image overlaid at the top-left corner.
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Trim start in seconds.
    #[arg(long, requires = "trim_end")]
    pub trim_start: Option<f64>,

    /// Trim end in seconds.
    #[arg(long, requires = "trim_start")]
    pub trim_end: Option<f64>,
}

impl EditArgs {
    /// Editor options for this invocation. Preset labels resolve to their expression.
    pub fn edit_options(&self) -> EditOptions {
        let mut options = EditOptions::new();
        if let Some(filter) = &self.filter {
            let expression = FilterPreset::from_label(filter)
                .map(|preset| preset.expression().to_string())
                .unwrap_or_else(|| filter.clone());
            options = options.with_filter(expression);
        }
        if let Some(text) = &self.text {
            options = options.with_text(text);
        }
        if let Some(font) = &self.font {
            options = options.with_font(font);
        }
        if let Some(color) = &self.color {
            options = options.with_color(color);
        }
        if let Some(position) = &self.position {
            options = options.with_position_label(position);
        }
        options
    }

    pub fn trim(&self) -> WorkerResult<Option<TrimRange>> {
        match (self.trim_start, self.trim_end) {
            (Some(start), Some(end)) => Ok(Some(TrimRange::new(start, end)?)),
            _ => Ok(None),
        }
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file.
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Target extension (mp4, webm, avi, mov, mkv, mp3, wav, flac, aac, opus, ogg).
    #[arg(long)]
    pub format: String,

    /// Output path; defaults to `output.<format>` in the current directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;

    fn edit_args(args: &[&str]) -> EditArgs {
        let mut argv = vec!["vedit", "edit", "--in", "clip.mp4"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Edit(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_preset_label_resolves() {
        let args = edit_args(&["--filter", "grayscale"]);
        assert_eq!(
            args.edit_options().filter_expression.as_deref(),
            Some(FilterPreset::Grayscale.expression())
        );
    }

    #[test]
    fn test_raw_filter_passes_through() {
        let args = edit_args(&["--filter", "eq=gamma=1.4"]);
        assert_eq!(args.edit_options().filter_expression.as_deref(), Some("eq=gamma=1.4"));
    }

    #[test]
    fn test_text_options() {
        let args = edit_args(&[
            "--text", "Hello", "--font", "henny", "--color", "#00ff00", "--position", "Bottom Right",
        ]);
        let options = args.edit_options();
        assert_eq!(options.overlay_text.as_deref(), Some("Hello"));
        assert_eq!(options.overlay_font.as_deref(), Some("henny"));
        assert_eq!(options.resolved_color(), "#00ff00");
        assert_eq!(options.overlay_position.as_deref(), Some("Bottom Right"));
        assert_eq!(args.format, "mp4");
    }

    #[test]
    fn test_trim_requires_both_bounds() {
        let argv = ["vedit", "edit", "--in", "clip.mp4", "--trim-start", "1"];
        assert!(Cli::try_parse_from(argv).is_err());

        let args = edit_args(&["--trim-start", "1", "--trim-end", "4.5"]);
        assert_eq!(args.trim().unwrap(), Some(TrimRange { start: 1.0, end: 4.5 }));
    }

    #[test]
    fn test_reversed_trim_rejected() {
        let args = edit_args(&["--trim-start", "5", "--trim-end", "1"]);
        assert!(matches!(args.trim(), Err(WorkerError::Model(_))));
    }

    #[test]
    fn test_convert_args() {
        let cli = Cli::try_parse_from(["vedit", "--print-metrics", "convert", "--in", "a.webm", "--format", "mkv"])
            .unwrap();
        assert!(cli.print_metrics);
        match cli.command {
            Command::Convert(args) => {
                assert_eq!(args.format, "mkv");
                assert!(args.out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
