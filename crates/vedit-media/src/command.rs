//! Engine argument builder and invocation planning.
//!
//! Argument vectors mirror a conventional transcoding command line:
//! `-i <input> [-i <input2>] <output args> <output>`. Global flags
//! (overwrite, log level, progress pipe) are the engine's concern.

use vedit_models::{OutputFormat, TrimRange, NO_OP_FILTER};

use crate::filters::FilterPlan;

/// Name of the overlay image inside engine storage.
pub const OVERLAY_IMAGE_NAME: &str = "overlay.png";

/// Builder for a single engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCommand {
    /// Input file names, in `-i` order
    inputs: Vec<String>,
    /// Output file name
    output: String,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
}

impl EngineCommand {
    /// Create a new command reading `input` and writing `output`.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            inputs: vec![input.into()],
            output: output.into(),
            output_args: Vec::new(),
        }
    }

    /// Add another `-i` input.
    pub fn extra_input(mut self, input: impl Into<String>) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Apply trim bounds (`-ss`/`-to`).
    pub fn trim(self, range: &TrimRange) -> Self {
        self.output_args(range.to_args())
    }

    /// Set a single-input video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set a multi-input filter graph.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Build the argument vector.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.inputs.len() * 2 + self.output_args.len() + 1);
        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.clone());
        }
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.clone());
        args
    }
}

/// Ordered invocations for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationPlan {
    pub commands: Vec<EngineCommand>,
    /// Intermediate file produced by the first stage, if any
    pub intermediate: Option<String>,
}

impl InvocationPlan {
    pub fn stages(&self) -> usize {
        self.commands.len()
    }
}

/// Plan the invocations for an edit job.
///
/// Two stages run only when both a primary and a composite filter are
/// present: stage 1 applies the primary filter, stage 2 the composite
/// chain. Otherwise a single invocation covers filter, trim and codec.
/// Trim always goes to the first stage.
pub fn plan_edit(
    input: &str,
    format: OutputFormat,
    plan: &FilterPlan,
    trim: Option<&TrimRange>,
) -> InvocationPlan {
    let output = format.output_file_name();
    let codec = format.codec_args();

    if plan.has_primary() && plan.has_composite() {
        let intermediate = format!("stage1.{}", format.extension());

        let mut first = EngineCommand::new(input, &intermediate);
        if let Some(range) = trim {
            first = first.trim(range);
        }
        let first = first
            .video_filter(&plan.primary_filter)
            .output_args(codec.iter().cloned());

        let second = composite_stage(EngineCommand::new(&intermediate, &output), plan)
            .output_args(codec);

        return InvocationPlan {
            commands: vec![first, second],
            intermediate: Some(intermediate),
        };
    }

    let mut command = EngineCommand::new(input, &output);
    if let Some(range) = trim {
        command = command.trim(range);
    }
    let command = if plan.has_primary() {
        command.video_filter(&plan.primary_filter)
    } else if plan.has_composite() {
        composite_stage(command, plan)
    } else {
        command.video_filter(NO_OP_FILTER)
    };

    InvocationPlan {
        commands: vec![command.output_args(codec)],
        intermediate: None,
    }
}

/// Plan a plain container conversion: `-i <input> <output>`.
pub fn plan_conversion(input: &str, format: OutputFormat) -> InvocationPlan {
    InvocationPlan {
        commands: vec![EngineCommand::new(input, format.output_file_name())],
        intermediate: None,
    }
}

fn composite_stage(command: EngineCommand, plan: &FilterPlan) -> EngineCommand {
    if plan.uses_overlay_image() {
        command
            .extra_input(OVERLAY_IMAGE_NAME)
            .filter_complex(&plan.composite_filter)
    } else {
        command.video_filter(&plan.composite_filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(primary: &str, composite: &str) -> FilterPlan {
        FilterPlan {
            primary_filter: primary.to_string(),
            composite_filter: composite.to_string(),
        }
    }

    #[test]
    fn test_command_builder() {
        let args = EngineCommand::new("input.mp4", "output.mp4")
            .video_filter("hue=s=0")
            .output_args(["-c:v", "libx264"])
            .build_args();
        assert_eq!(
            args,
            vec!["-i", "input.mp4", "-vf", "hue=s=0", "-c:v", "libx264", "output.mp4"]
        );
    }

    #[test]
    fn test_single_stage_primary_with_trim() {
        let trim = TrimRange::new(1.5, 4.0).unwrap();
        let result = plan_edit("input.mp4", OutputFormat::Mp4, &plan("hue=s=0", ""), Some(&trim));

        assert_eq!(result.stages(), 1);
        assert_eq!(result.intermediate, None);
        assert_eq!(
            result.commands[0].build_args(),
            vec![
                "-i", "input.mp4", "-ss", "1.5", "-to", "4", "-vf", "hue=s=0", "-c:v", "libx264",
                "-crf", "18", "-preset", "slow", "-pix_fmt", "yuv420p", "-c:a", "aac", "output.mp4"
            ]
        );
    }

    #[test]
    fn test_single_stage_composite_only() {
        let text = "drawtext=text='A':x=10:y=10:fontsize=24:fontcolor=#ffffff";
        let result = plan_edit("input.webm", OutputFormat::Webm, &plan("", text), None);

        assert_eq!(result.stages(), 1);
        assert_eq!(
            result.commands[0].build_args(),
            vec!["-i", "input.webm", "-vf", text, "-c:v", "libvpx", "-b:v", "5M", "-c:a", "libvorbis", "output.webm"]
        );
    }

    #[test]
    fn test_empty_plan_uses_null_filter() {
        let trim = TrimRange::new(0.0, 2.0).unwrap();
        let result = plan_edit("input.mov", OutputFormat::Mov, &FilterPlan::default(), Some(&trim));
        assert_eq!(
            result.commands[0].build_args(),
            vec!["-i", "input.mov", "-ss", "0", "-to", "2", "-vf", "null", "output.mov"]
        );
    }

    #[test]
    fn test_two_stages_trim_in_first() {
        let trim = TrimRange::new(2.0, 8.0).unwrap();
        let result = plan_edit(
            "input.mp4",
            OutputFormat::Avi,
            &plan("negate", "drawtext=text='X':x=10:y=10:fontsize=24:fontcolor=#ffffff"),
            Some(&trim),
        );

        assert_eq!(result.stages(), 2);
        assert_eq!(result.intermediate.as_deref(), Some("stage1.avi"));

        let first = result.commands[0].build_args();
        assert_eq!(&first[..8], &["-i", "input.mp4", "-ss", "2", "-to", "8", "-vf", "negate"]);
        assert_eq!(first.last().map(String::as_str), Some("stage1.avi"));

        let second = result.commands[1].build_args();
        assert_eq!(&second[..2], &["-i", "stage1.avi"]);
        assert!(!second.contains(&"-ss".to_string()));
        assert!(second.contains(&"mpeg4".to_string()));
        assert_eq!(second.last().map(String::as_str), Some("output.avi"));
    }

    #[test]
    fn test_overlay_image_adds_second_input() {
        let result = plan_edit("input.mp4", OutputFormat::Mp4, &plan("", "overlay=10:10"), None);
        let args = result.commands[0].build_args();
        assert_eq!(
            &args[..6],
            &["-i", "input.mp4", "-i", "overlay.png", "-filter_complex", "overlay=10:10"]
        );
    }

    #[test]
    fn test_conversion_has_no_extra_args() {
        let result = plan_conversion("input.webm", OutputFormat::Mkv);
        assert_eq!(result.commands[0].build_args(), vec!["-i", "input.webm", "output.mkv"]);
    }
}
