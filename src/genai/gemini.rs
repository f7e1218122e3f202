//! Google Gemini REST driver.
//!
//! Text answers use `models/{model}:streamGenerateContent?alt=sse`, which
//! emits one `data:` frame per candidate chunk. Visuals use
//! `models/{image_model}:generateContent` and read the first inline image
//! part of the first candidate.

use base64::Engine;
use futures::StreamExt;
use serde_json::{Value, json};

use super::{
    AspectRatio, GenAiError, GenAiSettings, ImageGenerator, TextChunk, TextRequest, TextStream,
    TextStreamer,
};

/// Driver for the Gemini `v1beta` REST API.
#[derive(Clone)]
pub struct GeminiDriver {
    http: reqwest::Client,
    settings: GenAiSettings,
}

impl std::fmt::Debug for GeminiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl GeminiDriver {
    #[must_use]
    pub fn new(settings: GenAiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:{method}",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn api_key(&self) -> Result<&str, GenAiError> {
        self.settings
            .api_key
            .as_deref()
            .ok_or(GenAiError::MissingApiKey)
    }

    fn text_body(&self, req: &TextRequest) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": req.prompt }] }],
            "systemInstruction": { "parts": [{ "text": req.system_instruction }] },
            "generationConfig": {
                "maxOutputTokens": self.settings.max_output_tokens,
                "temperature": self.settings.temperature,
                "thinkingConfig": { "thinkingBudget": self.settings.thinking_budget }
            }
        })
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response, GenAiError> {
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key()?)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message: error_message(&raw),
            });
        }
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl TextStreamer for GeminiDriver {
    async fn stream_text(&self, req: TextRequest) -> anyhow::Result<TextStream> {
        let url = format!(
            "{}?alt=sse",
            self.model_url(&self.settings.model, "streamGenerateContent")
        );
        let body = self.text_body(&req);

        tracing::debug!(
            name: "genai.stream.request",
            model = %self.settings.model,
            prompt_length = req.prompt.len(),
            "Opening Gemini stream"
        );

        let resp = self.post(&url, &body).await?;
        let byte_stream = resp.bytes_stream();

        let out = async_stream::try_stream! {
            let mut buf = Vec::<u8>::new();

            futures::pin_mut!(byte_stream);
            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk.map_err(GenAiError::from)?;
                buf.extend_from_slice(&chunk);

                while let Some((pos, sep_len)) = find_frame_end(&buf) {
                    let frame = buf.drain(..pos + sep_len).collect::<Vec<_>>();
                    if let Some(text) = parse_frame(&String::from_utf8_lossy(&frame))? {
                        yield TextChunk { text };
                    }
                }
            }

            // Trailing frame without a blank line after it.
            if !buf.is_empty() {
                if let Some(text) = parse_frame(&String::from_utf8_lossy(&buf))? {
                    yield TextChunk { text };
                }
            }
        };

        Ok(Box::pin(out))
    }
}

#[async_trait::async_trait]
impl ImageGenerator for GeminiDriver {
    async fn generate_image(&self, prompt: &str, aspect: AspectRatio) -> anyhow::Result<String> {
        let url = self.model_url(&self.settings.image_model, "generateContent");
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "imageConfig": { "aspectRatio": aspect.as_str() }
            }
        });

        let resp = self.post(&url, &body).await?;
        let payload: Value = resp.json().await.map_err(GenAiError::from)?;
        let data = first_inline_image(&payload).ok_or(GenAiError::NoImage)?;

        // Reject payloads the browser could not decode anyway.
        if base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .is_err()
        {
            return Err(GenAiError::NoImage.into());
        }

        Ok(format!("data:image/png;base64,{data}"))
    }
}

/// Extract the text carried by one SSE frame.
///
/// Returns `Ok(None)` for frames without `data:` lines or without text parts
/// (e.g. a final usage-only chunk).
fn parse_frame(frame: &str) -> Result<Option<String>, GenAiError> {
    let mut text = String::new();
    let mut saw_text = false;

    for line in frame.lines() {
        let line = line.trim();
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            continue;
        }

        let v: Value = serde_json::from_str(data)?;
        if let Some(err) = v.get("error") {
            return Err(GenAiError::Api {
                status: err
                    .get("code")
                    .and_then(Value::as_u64)
                    .and_then(|c| u16::try_from(c).ok())
                    .unwrap_or(500),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("stream error")
                    .to_string(),
            });
        }

        if let Some(parts) = v["candidates"][0]["content"]["parts"].as_array() {
            for part in parts {
                // Thought summaries are not part of the answer.
                if part.get("thought").and_then(Value::as_bool) == Some(true) {
                    continue;
                }
                if let Some(s) = part.get("text").and_then(Value::as_str) {
                    text.push_str(s);
                    saw_text = true;
                }
            }
        }
    }

    Ok((saw_text && !text.is_empty()).then_some(text))
}

/// First `inlineData.data` of the first candidate.
fn first_inline_image(payload: &Value) -> Option<&str> {
    payload["candidates"][0]["content"]["parts"]
        .as_array()?
        .iter()
        .find_map(|part| {
            part.get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(|d| d.get("data"))
                .and_then(Value::as_str)
        })
}

/// Pull a readable message out of a provider error body.
fn error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(ToString::to_string))
        .unwrap_or_else(|| raw.chars().take(200).collect())
}

/// Find the end of the next SSE frame, returning its start offset and the
/// separator length. Gemini terminates frames with `\r\n\r\n`.
fn find_frame_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = buf.windows(2).position(|w| w == b"\n\n");
    match (crlf, lf) {
        (Some(a), Some(b)) if b < a => Some((b, 2)),
        (Some(a), _) => Some((a, 4)),
        (None, Some(b)) => Some((b, 2)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_concatenates_parts() {
        let frame = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}],"role":"model"}}]}"#;
        assert_eq!(parse_frame(frame).unwrap().as_deref(), Some("Hello"));
    }

    #[test]
    fn test_parse_frame_skips_usage_only_chunk() {
        let frame = r#"data: {"candidates":[{"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;
        assert_eq!(parse_frame(frame).unwrap(), None);
        assert_eq!(parse_frame(": keep-alive").unwrap(), None);
    }

    #[test]
    fn test_parse_frame_skips_thoughts() {
        let frame = r#"data: {"candidates":[{"content":{"parts":[{"text":"hmm","thought":true},{"text":"Answer"}]}}]}"#;
        assert_eq!(parse_frame(frame).unwrap().as_deref(), Some("Answer"));
    }

    #[test]
    fn test_parse_frame_surfaces_stream_error() {
        let frame = r#"data: {"error":{"code":429,"message":"quota exceeded"}}"#;
        let err = parse_frame(frame).unwrap_err();
        assert!(matches!(err, GenAiError::Api { status: 429, .. }));
    }

    #[test]
    fn test_find_frame_end_handles_both_separators() {
        assert_eq!(find_frame_end(b"data: a\r\n\r\ndata: b"), Some((7, 4)));
        assert_eq!(find_frame_end(b"data: a\n\ndata: b"), Some((7, 2)));
        assert_eq!(find_frame_end(b"data: partial"), None);
    }

    #[test]
    fn test_first_inline_image() {
        let payload = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here is your image" },
                { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
            ]}}]
        });
        assert_eq!(first_inline_image(&payload), Some("aGVsbG8="));
        assert_eq!(first_inline_image(&json!({ "candidates": [] })), None);
    }

    #[test]
    fn test_error_message_prefers_provider_message() {
        let raw = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        assert_eq!(error_message(raw), "API key not valid");
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let driver = GeminiDriver::new(GenAiSettings::default());
        let req = TextRequest {
            prompt: "hi".to_string(),
            system_instruction: String::new(),
        };
        let Err(err) = driver.stream_text(req).await else {
            panic!("expected missing key error");
        };
        assert!(matches!(
            err.downcast_ref::<GenAiError>(),
            Some(GenAiError::MissingApiKey)
        ));
    }

    /// Serve `chunks` as the body of every request on a local port and
    /// return a driver pointed at it.
    async fn driver_against(status: u16, chunks: Vec<Vec<u8>>) -> GeminiDriver {
        use axum::body::{Body, Bytes};
        use axum::http::StatusCode;
        use axum::response::Response;
        use std::convert::Infallible;

        let app = axum::Router::new().fallback(move || {
            let chunks = chunks.clone();
            async move {
                let body = futures::stream::iter(
                    chunks
                        .into_iter()
                        .map(|c| Ok::<Bytes, Infallible>(Bytes::from(c))),
                );
                let mut resp = Response::new(Body::from_stream(body));
                *resp.status_mut() = StatusCode::from_u16(status).unwrap();
                resp
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        GeminiDriver::new(GenAiSettings {
            base_url: format!("http://{addr}"),
            api_key: Some("test-key".to_string()),
            ..GenAiSettings::default()
        })
    }

    fn hello_request() -> TextRequest {
        TextRequest {
            prompt: "hi".to_string(),
            system_instruction: "be brief".to_string(),
        }
    }

    #[tokio::test]
    async fn test_stream_text_reassembles_split_frames() {
        let first = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"H\u{e9}l\"}]}}]}\r\n\r\n";
        let (head, tail) = first.as_bytes().split_at(first.find('\u{e9}').unwrap() + 1);
        let chunks = vec![
            head.to_vec(),
            tail.to_vec(),
            b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"te".to_vec(),
            b"xt\":\"lo\"}]}}]}\r\n".to_vec(),
            b"\r\n: keep-alive\n\n".to_vec(),
            b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"!\"}]}}]}".to_vec(),
        ];
        let driver = driver_against(200, chunks).await;

        let stream = driver.stream_text(hello_request()).await.unwrap();
        let texts: Vec<String> = stream.map(|c| c.unwrap().text).collect().await;
        assert_eq!(texts, vec!["H\u{e9}l", "lo", "!"]);
    }

    #[tokio::test]
    async fn test_stream_text_http_error_carries_provider_message() {
        let body = br#"{"error":{"code":429,"message":"quota exceeded"}}"#.to_vec();
        let driver = driver_against(429, vec![body]).await;

        let Err(err) = driver.stream_text(hello_request()).await else {
            panic!("expected an API error");
        };
        match err.downcast_ref::<GenAiError>() {
            Some(GenAiError::Api { status, message }) => {
                assert_eq!(*status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_text_error_frame_ends_with_err_item() {
        let chunks = vec![
            b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"partial\"}]}}]}\n\n".to_vec(),
            b"data: {\"error\":{\"code\":503,\"message\":\"overloaded\"}}\n\n".to_vec(),
        ];
        let driver = driver_against(200, chunks).await;

        let items: Vec<_> = driver
            .stream_text(hello_request())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().text, "partial");
        assert!(items[1].is_err());
    }
}
