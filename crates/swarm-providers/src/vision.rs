//! Vision client — describe images and summarize videos frame by frame.
//!
//! Each image or frame becomes one `[text, image_url]` user message sent
//! through the [`Dispatcher`], so every request is retried and metered like
//! any other completion.

use std::path::Path;
use std::sync::Arc;

use swarm_core::config::schema::VisionConfig;
use swarm_core::config::Config;
use swarm_core::types::{ContentPart, Message};
use swarm_usage::{CallerChain, UsageLedger};
use tracing::{debug, info};

use crate::credentials::CredentialPool;
use crate::dispatcher::Dispatcher;
use crate::media::{encode_image, image_data_url, select_frames, FrameSource};
use crate::traits::CompletionRequest;

/// Prompt used for each frame when the caller gives no task.
pub const DEFAULT_FRAME_TASK: &str =
    "This is one frame from a video, please summarize this frame.";

const VISION_TEMPERATURE: f64 = 1.0;

/// Multimodal completions over images and extracted video frames.
#[derive(Clone, Debug)]
pub struct VisionClient {
    model: String,
    dispatcher: Arc<Dispatcher>,
    config: VisionConfig,
    caller: CallerChain,
}

impl VisionClient {
    pub fn new(model: impl Into<String>, dispatcher: Arc<Dispatcher>, config: VisionConfig) -> Self {
        Self {
            model: model.into(),
            dispatcher,
            config,
            caller: CallerChain::default(),
        }
    }

    /// Client with its own dispatcher keyed by `MULTIMODE_OPENAI_API_KEY`,
    /// metering into `ledger`.
    pub fn from_env(model: impl Into<String>, config: &Config, ledger: Arc<UsageLedger>) -> Self {
        let dispatcher = Dispatcher::from_config(config, CredentialPool::vision_from_env(), ledger);
        Self::new(model, Arc::new(dispatcher), config.vision.clone())
    }

    /// Attribution tag for every request this client sends.
    pub fn with_caller(mut self, caller: CallerChain) -> Self {
        self.caller = caller;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn frame_request(&self, task: &str, b64: &str) -> CompletionRequest {
        let message = Message::user_parts(vec![
            ContentPart::text(task),
            ContentPart::image_url(image_data_url(b64)),
        ]);
        CompletionRequest::new(self.model.clone(), vec![message])
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(VISION_TEMPERATURE)
            .with_completion_count(1)
            .with_caller(self.caller.clone())
    }

    /// Describe one base64 JPEG payload.
    pub async fn describe_encoded(&self, task: &str, b64: &str) -> anyhow::Result<String> {
        let request = self.frame_request(task, b64);
        let completion = self.dispatcher.complete_async(&request).await?;
        Ok(completion.first().unwrap_or_default().to_string())
    }

    /// Describe an image file.
    pub async fn describe_image(&self, task: &str, path: &Path) -> anyhow::Result<String> {
        let b64 = encode_image(path).await?;
        let content = self.describe_encoded(task, &b64).await?;
        info!(model = %self.model, image = %path.display(), "image described");
        Ok(content)
    }

    /// Summarize a video one selected frame at a time.
    ///
    /// Frames are thinned with [`select_frames`] using `interval` (or the
    /// configured default). Each line of the result reads
    /// `Frame {i}'s content: {text}`, numbered from 1.
    pub async fn summarize_video(
        &self,
        task: Option<&str>,
        source: &dyn FrameSource,
        interval: Option<usize>,
    ) -> anyhow::Result<String> {
        let task = task.unwrap_or(DEFAULT_FRAME_TASK);
        let interval = interval.unwrap_or(self.config.frame_interval);

        let frames = select_frames(source.frames().await?, interval, self.config.max_frames);
        info!(source = %source.describe(), frames = frames.len(), "summarizing video");

        let mut summary = String::new();
        for (idx, frame) in frames.iter().enumerate() {
            let idx = idx + 1;
            debug!(frame = idx, "describing frame");
            let content = self.describe_encoded(task, frame).await?;
            summary.push_str(&format!("Frame {}'s content: {}\n", idx, content));
        }
        Ok(summary)
    }
}
