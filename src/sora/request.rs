//! Request model for the `/videos` endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::client::SoraError;

/// Default model sent with every generation request.
pub const DEFAULT_MODEL: &str = "sora-2";

/// Clip duration accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSeconds {
    #[default]
    Four,
    Eight,
    Twelve,
}

impl VideoSeconds {
    pub const ALL: [VideoSeconds; 3] = [VideoSeconds::Four, VideoSeconds::Eight, VideoSeconds::Twelve];

    /// Wire representation ("4", "8", "12").
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSeconds::Four => "4",
            VideoSeconds::Eight => "8",
            VideoSeconds::Twelve => "12",
        }
    }
}

impl fmt::Display for VideoSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoSeconds {
    type Err = SoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4" => Ok(VideoSeconds::Four),
            "8" => Ok(VideoSeconds::Eight),
            "12" => Ok(VideoSeconds::Twelve),
            other => Err(SoraError::InvalidParameter {
                name: "seconds",
                value: other.to_string(),
            }),
        }
    }
}

impl Serialize for VideoSeconds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Output resolution accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSize {
    #[default]
    Landscape1280x720,
    Portrait720x1280,
    Standard1024x768,
}

impl VideoSize {
    pub const ALL: [VideoSize; 3] = [
        VideoSize::Landscape1280x720,
        VideoSize::Portrait720x1280,
        VideoSize::Standard1024x768,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSize::Landscape1280x720 => "1280x720",
            VideoSize::Portrait720x1280 => "720x1280",
            VideoSize::Standard1024x768 => "1024x768",
        }
    }
}

impl fmt::Display for VideoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoSize {
    type Err = SoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoSize::ALL
            .into_iter()
            .find(|size| size.as_str() == s.trim())
            .ok_or_else(|| SoraError::InvalidParameter {
                name: "size",
                value: s.trim().to_string(),
            })
    }
}

impl Serialize for VideoSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single video generation request.
///
/// Built once with [`GenerationRequest::new`] and the `with_*` methods, then
/// handed to [`SoraClient::submit`](super::SoraClient::submit). Serializes to
/// the exact JSON body the `/videos` endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    seconds: VideoSeconds,
    size: VideoSize,
    /// PNG data URI of the reference frame.
    #[serde(rename = "input_reference", skip_serializing_if = "Option::is_none")]
    reference_image: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            seconds: VideoSeconds::default(),
            size: VideoSize::default(),
            reference_image: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_seconds(mut self, seconds: VideoSeconds) -> Self {
        self.seconds = seconds;
        self
    }

    pub fn with_size(mut self, size: VideoSize) -> Self {
        self.size = size;
        self
    }

    /// Attach an already encoded `data:image/png;base64,...` URI.
    pub fn with_reference_image(mut self, data_uri: impl Into<String>) -> Self {
        self.reference_image = Some(data_uri.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn seconds(&self) -> VideoSeconds {
        self.seconds
    }

    pub fn size(&self) -> VideoSize {
        self.size
    }

    pub fn reference_image(&self) -> Option<&str> {
        self.reference_image.as_deref()
    }
}
