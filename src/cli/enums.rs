//! CLI enum types for clip duration and output size.

use clap::ValueEnum;

use crate::sora::{VideoSeconds, VideoSize};

/// Clip duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Seconds {
    #[default]
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
    #[value(name = "12")]
    Twelve,
}

impl From<Seconds> for VideoSeconds {
    fn from(s: Seconds) -> Self {
        match s {
            Seconds::Four => VideoSeconds::Four,
            Seconds::Eight => VideoSeconds::Eight,
            Seconds::Twelve => VideoSeconds::Twelve,
        }
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Size {
    #[default]
    #[value(name = "1280x720")]
    Landscape,
    #[value(name = "720x1280")]
    Portrait,
    #[value(name = "1024x768")]
    Standard,
}

impl From<Size> for VideoSize {
    fn from(s: Size) -> Self {
        match s {
            Size::Landscape => VideoSize::Landscape1280x720,
            Size::Portrait => VideoSize::Portrait720x1280,
            Size::Standard => VideoSize::Standard1024x768,
        }
    }
}
