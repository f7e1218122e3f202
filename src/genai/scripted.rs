//! In-process driver that replays canned turns.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{AspectRatio, ImageGenerator, TextChunk, TextRequest, TextStream, TextStreamer};

/// Outcome of one scripted text turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedTurn {
    /// Stream these chunks, then end normally.
    Chunks(Vec<String>),
    /// Fail before any stream is returned.
    FailToOpen,
    /// Stream these chunks, then yield an error.
    FailAfter(Vec<String>),
}

/// Replays queued [`ScriptedTurn`]s and returns a fixed image.
///
/// When the queue is empty every further turn uses the fallback turn.
#[derive(Debug)]
pub struct ScriptedDriver {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    fallback: ScriptedTurn,
    image: Option<String>,
    requests: Mutex<Vec<TextRequest>>,
    image_prompts: Mutex<Vec<(String, AspectRatio)>>,
}

impl ScriptedDriver {
    #[must_use]
    pub fn new(fallback: ScriptedTurn) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            fallback,
            image: None,
            requests: Mutex::new(Vec::new()),
            image_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Driver whose every turn streams `chunks`.
    #[must_use]
    pub fn replying<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ScriptedTurn::Chunks(
            chunks.into_iter().map(Into::into).collect(),
        ))
    }

    /// Queue a turn ahead of the fallback.
    #[must_use]
    pub fn then(self, turn: ScriptedTurn) -> Self {
        self.turns.lock().unwrap().push_back(turn);
        self
    }

    /// Base64 payload returned by [`ImageGenerator::generate_image`].
    /// Without one, image generation fails.
    #[must_use]
    pub fn with_image(mut self, base64: impl Into<String>) -> Self {
        self.image = Some(base64.into());
        self
    }

    /// Text requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<TextRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Image prompts received so far.
    #[must_use]
    pub fn image_prompts(&self) -> Vec<(String, AspectRatio)> {
        self.image_prompts.lock().unwrap().clone()
    }

    fn next_turn(&self) -> ScriptedTurn {
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait::async_trait]
impl TextStreamer for ScriptedDriver {
    async fn stream_text(&self, req: TextRequest) -> anyhow::Result<TextStream> {
        self.requests.lock().unwrap().push(req);

        let (chunks, fail_at_end) = match self.next_turn() {
            ScriptedTurn::FailToOpen => anyhow::bail!("scripted stream refused"),
            ScriptedTurn::Chunks(chunks) => (chunks, false),
            ScriptedTurn::FailAfter(chunks) => (chunks, true),
        };

        let out = async_stream::try_stream! {
            for text in chunks {
                tokio::task::yield_now().await;
                yield TextChunk { text };
            }
            if fail_at_end {
                Err::<(), _>(anyhow::anyhow!("scripted stream interrupted"))?;
            }
        };
        Ok(Box::pin(out))
    }
}

#[async_trait::async_trait]
impl ImageGenerator for ScriptedDriver {
    async fn generate_image(&self, prompt: &str, aspect: AspectRatio) -> anyhow::Result<String> {
        self.image_prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), aspect));
        match &self.image {
            Some(data) => Ok(format!("data:image/png;base64,{data}")),
            None => anyhow::bail!("scripted image generation disabled"),
        }
    }
}
