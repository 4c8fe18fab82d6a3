//! Output formats, codec argument sets and MIME types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, ModelResult};

/// Fixed H.264 argument set for MP4 output.
pub const MP4_CODEC_ARGS: &[&str] = &[
    "-c:v", "libx264", "-crf", "18", "-preset", "slow", "-pix_fmt", "yuv420p", "-c:a", "aac",
];

/// VP8/Vorbis argument set for WebM output (high bitrate).
pub const WEBM_CODEC_ARGS: &[&str] = &["-c:v", "libvpx", "-b:v", "5M", "-c:a", "libvorbis"];

/// MPEG-4 Part 2/MP3 argument set for AVI output (best quantizer).
pub const AVI_CODEC_ARGS: &[&str] = &["-c:v", "mpeg4", "-q:v", "1", "-c:a", "libmp3lame"];

/// Container/extension the engine can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp4,
    Webm,
    Avi,
    Ogg,
    Mov,
    Mkv,
    Mp3,
    Wav,
    Flac,
    Aac,
    Opus,
}

/// Which list of formats a request is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormatTable {
    /// Export formats of the editor (filters, overlays, trim)
    Editor,
    /// Target formats of the plain converter
    Converter,
}

impl FormatTable {
    /// Formats accepted by this table, in picker order.
    pub fn formats(&self) -> &'static [OutputFormat] {
        use OutputFormat::*;
        match self {
            FormatTable::Editor => &[Mp4, Webm, Avi, Ogg, Mov, Mp3],
            FormatTable::Converter => &[Mp4, Webm, Avi, Mov, Mkv, Mp3, Wav, Flac, Aac, Opus, Ogg],
        }
    }

    pub fn contains(&self, format: OutputFormat) -> bool {
        self.formats().contains(&format)
    }
}

impl OutputFormat {
    /// Every known format.
    pub const ALL: [OutputFormat; 11] = [
        OutputFormat::Mp4,
        OutputFormat::Webm,
        OutputFormat::Avi,
        OutputFormat::Ogg,
        OutputFormat::Mov,
        OutputFormat::Mkv,
        OutputFormat::Mp3,
        OutputFormat::Wav,
        OutputFormat::Flac,
        OutputFormat::Aac,
        OutputFormat::Opus,
    ];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
            OutputFormat::Avi => "avi",
            OutputFormat::Ogg => "ogg",
            OutputFormat::Mov => "mov",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Wav => "wav",
            OutputFormat::Flac => "flac",
            OutputFormat::Aac => "aac",
            OutputFormat::Opus => "opus",
        }
    }

    /// Parse an extension against a format table.
    ///
    /// Matching is case-insensitive and ignores a leading dot. Extensions
    /// outside the table are rejected even if known to another table.
    pub fn parse(extension: &str, table: FormatTable) -> ModelResult<Self> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == normalized)
            .filter(|f| table.contains(*f))
            .ok_or(ModelError::UnsupportedFormat(normalized))
    }

    /// Codec arguments appended to every editor invocation.
    ///
    /// Only mp4, webm and avi carry a fixed set; every other format lets
    /// the engine pick its defaults.
    pub fn codec_args(&self) -> Vec<String> {
        let args: &[&str] = match self {
            OutputFormat::Mp4 => MP4_CODEC_ARGS,
            OutputFormat::Webm => WEBM_CODEC_ARGS,
            OutputFormat::Avi => AVI_CODEC_ARGS,
            _ => &[],
        };
        args.iter().map(|s| s.to_string()).collect()
    }

    /// MIME type of an artifact in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "video/mp4",
            OutputFormat::Webm => "video/webm",
            OutputFormat::Avi => "video/x-msvideo",
            OutputFormat::Ogg => "video/ogg",
            OutputFormat::Mov => "video/quicktime",
            OutputFormat::Mkv => "video/x-matroska",
            OutputFormat::Mp3 => "audio/mpeg",
            OutputFormat::Wav => "audio/wav",
            OutputFormat::Flac => "audio/flac",
            OutputFormat::Aac => "audio/aac",
            OutputFormat::Opus => "audio/opus",
        }
    }

    /// Name of the final output file in engine storage.
    pub fn output_file_name(&self) -> String {
        format!("output.{}", self.extension())
    }

    /// Whether common browsers can preview this format inline.
    pub fn is_previewable(&self) -> bool {
        matches!(self, OutputFormat::Mp4 | OutputFormat::Webm)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
