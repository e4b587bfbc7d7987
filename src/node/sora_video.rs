//! The Sora video generator node.

use crate::config::Config;
use crate::sora::{
    encode_image, validate_api_key, GenerationRequest, ImageTensor, PollOptions, SoraClient, VideoSeconds,
    VideoSize, DEFAULT_BASE_URL, DEFAULT_MODEL, PLACEHOLDER_API_KEY,
};

use super::traits::{HostNode, InputSpec, NodeDefinition, NodeInputs, OutputValue};
use super::NodeError;

/// Class key the node is registered under.
pub const SORA_VIDEO_NODE_KEY: &str = "SoraVideoGenerator";

/// Display name shown by the host.
pub const SORA_VIDEO_NODE_NAME: &str = "Sora API Video Generator";

/// Prompt pre-filled in the host UI.
pub const DEFAULT_PROMPT: &str = "A cute orange cat chasing a butterfly in a sunny garden.";

/// Generates a video from a prompt and an optional reference image.
#[derive(Debug, Clone)]
pub struct SoraVideoNode {
    model: String,
    poll: PollOptions,
}

impl Default for SoraVideoNode {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL.to_string(), PollOptions::default())
    }
}

impl SoraVideoNode {
    pub fn new(model: String, poll: PollOptions) -> Self {
        Self { model, poll }
    }

    /// Build a node from the `[api]` and `[poll]` config sections.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api.model.clone(), config.poll.options())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn poll_options(&self) -> PollOptions {
        self.poll
    }

    /// Submit a generation task and block until its video URL is available.
    ///
    /// Must not be called from inside an async runtime; it starts its own.
    ///
    /// # Errors
    ///
    /// Fails before any network traffic for an empty or placeholder API key,
    /// an empty prompt, or a malformed image. Otherwise propagates submission,
    /// polling and task errors from [`SoraClient`].
    pub fn generate_video(
        &self,
        api_key: &str,
        prompt: &str,
        seconds: VideoSeconds,
        size: VideoSize,
        api_base_url: &str,
        image: Option<&ImageTensor>,
    ) -> Result<String, NodeError> {
        validate_api_key(api_key)?;

        let mut request = GenerationRequest::new(prompt)
            .with_model(self.model.clone())
            .with_seconds(seconds)
            .with_size(size);

        if let Some(image) = image {
            log::info!("Reference image supplied, encoding...");
            request = request.with_reference_image(encode_image(image)?);
            log::info!("Reference image attached to request");
        }

        let runtime = tokio::runtime::Runtime::new()?;
        let video_url = runtime.block_on(async {
            let client = SoraClient::with_base_url(api_key.to_string(), api_base_url.to_string())?;
            client.generate(&request, self.poll).await
        })?;

        Ok(video_url)
    }
}

impl HostNode for SoraVideoNode {
    fn definition(&self) -> NodeDefinition {
        NodeDefinition {
            class_key: SORA_VIDEO_NODE_KEY,
            display_name: SORA_VIDEO_NODE_NAME,
            category: "Sora API",
            function: "generate_video",
            required: vec![
                InputSpec::string("api_key", false, PLACEHOLDER_API_KEY),
                InputSpec::string("prompt", true, DEFAULT_PROMPT),
                InputSpec::choice("seconds", VideoSeconds::ALL.iter().map(|s| s.as_str())),
                InputSpec::choice("size", VideoSize::ALL.iter().map(|s| s.as_str())),
                InputSpec::string("api_base_url", false, DEFAULT_BASE_URL),
            ],
            optional: vec![InputSpec::image("image")],
            return_types: vec!["STRING"],
            return_names: vec!["video_url"],
        }
    }

    fn execute(&self, inputs: &NodeInputs) -> Result<Vec<OutputValue>, NodeError> {
        let api_key = inputs.string("api_key")?;
        let prompt = inputs.string("prompt")?;
        let seconds: VideoSeconds = inputs.string("seconds")?.parse()?;
        let size: VideoSize = inputs.string("size")?.parse()?;
        let api_base_url = inputs.string("api_base_url")?;
        let image = inputs.image("image")?;

        let video_url = self.generate_video(api_key, prompt, seconds, size, api_base_url, image)?;
        Ok(vec![OutputValue::String(video_url)])
    }
}
