//! SoraClient - submits video generation tasks and polls them to completion.

use std::time::Duration;

use serde::Deserialize;

use super::request::GenerationRequest;

/// The environment variable name for the API key.
pub const SORA_API_KEY_ENV: &str = "SORA_API_KEY";

/// Default base URL of the Sora-compatible API.
pub const DEFAULT_BASE_URL: &str = "https://openai.qiniu.com/v1";

/// Placeholder key shipped as the node's default input. Never a valid key.
pub const PLACEHOLDER_API_KEY: &str = "sk-xxx";

/// Default timeout for a single HTTP request (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time budget for polling a task to a terminal status (5 minutes).
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Default delay between status checks (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Validate an API key before any request is built.
///
/// Rejects empty keys and the placeholder default.
pub fn validate_api_key(api_key: &str) -> Result<(), SoraError> {
    let trimmed = api_key.trim();

    if trimmed.is_empty() {
        return Err(SoraError::MissingApiKey);
    }

    if trimmed == PLACEHOLDER_API_KEY {
        return Err(SoraError::PlaceholderApiKey);
    }

    Ok(())
}

/// Validate a prompt before sending to the API.
///
/// Rejects empty or whitespace-only prompts.
pub fn validate_prompt(prompt: &str) -> Result<(), SoraError> {
    if prompt.trim().is_empty() {
        return Err(SoraError::EmptyPrompt);
    }

    Ok(())
}

/// Handle of a submitted task, used for polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub id: String,
}

/// Response from task submission.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Response from the task status endpoint.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    task_result: Option<TaskResult>,
    #[serde(default)]
    error: Option<TaskErrorBody>,
}

#[derive(Debug, Deserialize)]
struct TaskResult {
    #[serde(default)]
    videos: Vec<VideoOutput>,
}

#[derive(Debug, Deserialize)]
struct VideoOutput {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Status of a submitted task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    /// Task is waiting to be scheduled.
    Queued,
    /// Video is being generated.
    Running,
    /// Generation finished; the video is ready.
    Completed { video_url: String },
    /// Generation failed on the server.
    Failed { reason: String },
    /// Task was cancelled before completing.
    Cancelled { reason: String },
}

/// Timing knobs for [`SoraClient::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Give up once this much time has passed without a terminal status.
    pub timeout: Duration,
    /// Delay between status checks.
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollOptions {
    pub fn from_secs(timeout_secs: u64, interval_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Reject a zero interval, which would turn polling into a busy loop.
    pub fn validate(&self) -> Result<(), SoraError> {
        if self.interval.is_zero() {
            return Err(SoraError::InvalidParameter {
                name: "interval",
                value: format!("{:?}", self.interval),
            });
        }
        Ok(())
    }
}

/// Client for the Sora-compatible `/videos` API.
pub struct SoraClient {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl SoraClient {
    /// Create a new SoraClient with an explicit API key and the default base URL.
    pub fn with_api_key(api_key: String) -> Result<Self, SoraError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new SoraClient with a custom base URL.
    ///
    /// A trailing `/` on the base URL is ignored.
    ///
    /// # Errors
    ///
    /// Returns `SoraError::MissingApiKey` or `SoraError::PlaceholderApiKey`
    /// for an unusable key, before any HTTP client is created.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, SoraError> {
        validate_api_key(&api_key)?;

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Submit a video generation task.
    ///
    /// POSTs the request as JSON to `{base_url}/videos` and returns the task
    /// handle from the response.
    ///
    /// # Errors
    ///
    /// Returns `SoraError::EmptyPrompt` for an empty prompt,
    /// `SoraError::Api` on a non-2xx response,
    /// `SoraError::MissingTaskId` if the response has no `id`,
    /// or `SoraError::Http` if the request fails.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<TaskHandle, SoraError> {
        validate_api_key(&self.api_key)?;
        validate_prompt(request.prompt())?;

        let url = format!("{}/videos", self.base_url);

        log::info!(
            "Submitting video generation task (model: {}, {}s, {}{})",
            request.model(),
            request.seconds(),
            request.size(),
            if request.reference_image().is_some() {
                ", with reference image"
            } else {
                ""
            }
        );

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.bearer())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::error!("Task submission failed with status {}: {}", status, body);
            return Err(SoraError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let id = serde_json::from_str::<SubmitResponse>(&body)
            .ok()
            .and_then(|r| r.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SoraError::MissingTaskId { body: body.clone() })?;

        log::info!("Task created, id: {}", id);
        Ok(TaskHandle { id })
    }

    /// Check the status of a task once.
    ///
    /// # Errors
    ///
    /// Returns `SoraError::Http` if the request fails or the body is not JSON,
    /// `SoraError::Api` on a non-2xx response, and `SoraError::MissingVideoUrl`
    /// if the task reports completion without a video URL.
    pub async fn poll_status(&self, handle: &TaskHandle) -> Result<TaskStatus, SoraError> {
        let url = format!("{}/videos/{}", self.base_url, handle.id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SoraError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let status_response: StatusResponse = response.json().await?;
        parse_status(status_response)
    }

    /// Poll a task until it reaches a terminal status or the timeout elapses.
    ///
    /// The first status check is always made; the timeout is only consulted
    /// between checks. Transport failures and non-2xx responses while polling
    /// are logged and retried on the next interval.
    ///
    /// # Returns
    ///
    /// The URL of the finished video.
    ///
    /// # Errors
    ///
    /// - `SoraError::InvalidParameter` for a zero polling interval
    /// - `SoraError::Timeout` if no terminal status arrives in time
    /// - `SoraError::TaskFailed` if the task failed or was cancelled
    /// - `SoraError::MissingVideoUrl` if completion carries no URL
    pub async fn poll(&self, handle: &TaskHandle, options: PollOptions) -> Result<String, SoraError> {
        use tokio::time::Instant;

        options.validate()?;

        log::info!(
            "Polling task {} (timeout: {:?}, interval: {:?})",
            handle.id,
            options.timeout,
            options.interval
        );

        let start_time = Instant::now();
        loop {
            match self.poll_status(handle).await {
                Ok(TaskStatus::Completed { video_url }) => {
                    log::info!("Video ready: {}", video_url);
                    return Ok(video_url);
                }
                Ok(TaskStatus::Failed { reason }) => {
                    log::error!("Task {} failed: {}", handle.id, reason);
                    return Err(SoraError::TaskFailed {
                        status: "failed",
                        message: reason,
                    });
                }
                Ok(TaskStatus::Cancelled { reason }) => {
                    log::error!("Task {} was cancelled: {}", handle.id, reason);
                    return Err(SoraError::TaskFailed {
                        status: "cancelled",
                        message: reason,
                    });
                }
                Ok(status) => {
                    log::debug!("Task {} status: {:?}", handle.id, status);
                }
                Err(e) if e.is_transient() => {
                    log::warn!("Status check for task {} failed: {}", handle.id, e);
                }
                Err(e) => return Err(e),
            }

            let elapsed = start_time.elapsed();
            if elapsed >= options.timeout {
                log::error!("Task {} timed out after {:?}", handle.id, elapsed);
                return Err(SoraError::Timeout {
                    timeout: options.timeout,
                });
            }

            tokio::time::sleep(options.interval).await;
        }
    }

    /// Submit a request and wait for its video URL.
    pub async fn generate(&self, request: &GenerationRequest, options: PollOptions) -> Result<String, SoraError> {
        let handle = self.submit(request).await?;
        self.poll(&handle, options).await
    }
}

/// Map a status response onto a `TaskStatus`.
fn parse_status(response: StatusResponse) -> Result<TaskStatus, SoraError> {
    let raw = response.status.unwrap_or_default();

    match raw.as_str() {
        "queued" => Ok(TaskStatus::Queued),
        "in_progress" => Ok(TaskStatus::Running),
        "completed" => response
            .task_result
            .and_then(|result| result.videos.into_iter().next())
            .and_then(|video| video.url)
            .filter(|url| !url.is_empty())
            .map(|video_url| TaskStatus::Completed { video_url })
            .ok_or(SoraError::MissingVideoUrl),
        "failed" => Ok(TaskStatus::Failed {
            reason: error_message(response.error),
        }),
        "cancelled" => Ok(TaskStatus::Cancelled {
            reason: error_message(response.error),
        }),
        unknown => {
            log::warn!("Unrecognized task status {:?}; still waiting", unknown);
            Ok(TaskStatus::Running)
        }
    }
}

fn error_message(error: Option<TaskErrorBody>) -> String {
    error
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "unknown error".to_string())
}

/// Errors that can occur while generating a video.
#[derive(Debug, thiserror::Error)]
pub enum SoraError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("API key is still the placeholder default; enter a real API key")]
    PlaceholderApiKey,

    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("Invalid {name}: {value:?}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: String,
    },

    #[error("Image encoding failed: {reason}")]
    Encoding {
        /// What was wrong with the pixel buffer
        reason: String,
    },

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the server
        body: String,
    },

    #[error("API did not return a task id. Response: {body}")]
    MissingTaskId {
        /// Response body as returned by the server
        body: String,
    },

    #[error("Polling timed out: task did not finish within {timeout:?}")]
    Timeout {
        /// The configured polling budget
        timeout: Duration,
    },

    #[error("Task {status}: {message}")]
    TaskFailed {
        /// Terminal status reported by the server ("failed" or "cancelled")
        status: &'static str,
        /// Server-provided reason
        message: String,
    },

    #[error("Task completed but no video URL was found")]
    MissingVideoUrl,
}

impl SoraError {
    /// Errors worth another status check on the next polling interval.
    pub fn is_transient(&self) -> bool {
        matches!(self, SoraError::Http(_) | SoraError::Api { .. })
    }
}
