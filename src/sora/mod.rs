//! Sora-compatible video generation API integration.
//!
//! Builds generation requests, encodes optional reference frames from host
//! image tensors, submits tasks to `{base_url}/videos` and polls them until the
//! video URL is available.

mod client;
mod encoding;
mod request;

pub use client::{
    validate_api_key, validate_prompt, PollOptions, SoraClient, SoraError, TaskHandle, TaskStatus,
    DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PLACEHOLDER_API_KEY,
    SORA_API_KEY_ENV,
};
pub use encoding::{decode_data_uri, encode_image, ImageTensor, PNG_DATA_URI_PREFIX};
pub use request::{GenerationRequest, VideoSeconds, VideoSize, DEFAULT_MODEL};
