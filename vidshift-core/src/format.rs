//! Output container formats accepted at the API boundary.
//!
//! Callers name a format by string; only the variants below parse. The
//! file extension and ffmpeg muxer always come from the enum, never from the
//! caller's text.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    Mp4,
    Webm,
    Mkv,
    Mov,
    Avi,
    Gif,
    Mp3,
    Wav,
    Ogg,
    Flac,
}

impl OutputFormat {
    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Mov => "mov",
            OutputFormat::Avi => "avi",
            OutputFormat::Gif => "gif",
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Wav => "wav",
            OutputFormat::Ogg => "ogg",
            OutputFormat::Flac => "flac",
        }
    }

    /// Name passed to ffmpeg's `-f` flag.
    pub fn muxer(self) -> &'static str {
        match self {
            OutputFormat::Mkv => "matroska",
            other => other.extension(),
        }
    }

    /// Value for the `Content-Type` response header.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "video/mp4",
            OutputFormat::Webm => "video/webm",
            OutputFormat::Mkv => "video/x-matroska",
            OutputFormat::Mov => "video/quicktime",
            OutputFormat::Avi => "video/x-msvideo",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Mp3 => "audio/mpeg",
            OutputFormat::Wav => "audio/wav",
            OutputFormat::Ogg => "audio/ogg",
            OutputFormat::Flac => "audio/flac",
        }
    }

    /// Whether the muxer understands `-movflags +faststart`.
    pub fn supports_faststart(self) -> bool {
        matches!(self, OutputFormat::Mp4 | OutputFormat::Mov)
    }

    /// Comma-separated list of every accepted name, for error messages.
    pub fn supported_list() -> String {
        OutputFormat::iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(OutputFormat::from_str("mp4").ok(), Some(OutputFormat::Mp4));
        assert_eq!(OutputFormat::from_str("WebM").ok(), Some(OutputFormat::Webm));
        assert_eq!(OutputFormat::from_str("MKV").ok(), Some(OutputFormat::Mkv));
    }

    #[test]
    fn rejects_paths_and_unknown_names() {
        for bad in ["", "exe", "../mp4", "mp4/../../etc", "mp4\0", " mp4", "sh"] {
            assert!(OutputFormat::from_str(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn mkv_uses_matroska_muxer() {
        assert_eq!(OutputFormat::Mkv.muxer(), "matroska");
        assert_eq!(OutputFormat::Mkv.extension(), "mkv");
        assert_eq!(OutputFormat::Mp4.muxer(), "mp4");
    }

    #[test]
    fn display_matches_extension() {
        for f in OutputFormat::iter() {
            assert_eq!(f.to_string(), f.extension());
        }
    }

    #[test]
    fn supported_list_names_every_format() {
        let list = OutputFormat::supported_list();
        assert!(list.starts_with("mp4, webm"));
        assert!(list.contains("flac"));
    }
}
