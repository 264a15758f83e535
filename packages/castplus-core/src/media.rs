//! Media requests and load request construction.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::MediaDefaults;
use crate::error::CastResult;
use crate::protocol_constants::CAST_METADATA_TYPE_MOVIE;
use crate::utils::{require_non_empty, validate_media_url};

/// How the receiver should treat the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    /// Finite media the receiver may buffer.
    #[default]
    Buffered,
    /// Live stream.
    Live,
}

impl StreamType {
    /// Returns the wire name used by the Cast media namespace.
    pub fn as_cast_str(self) -> &'static str {
        match self {
            Self::Buffered => "BUFFERED",
            Self::Live => "LIVE",
        }
    }
}

/// What the caller asked to play. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    url: String,
    title: String,
    content_type: Option<String>,
    stream_type: Option<StreamType>,
}

impl MediaRequest {
    /// Creates a request for `url` with the given title.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content_type: None,
            stream_type: None,
        }
    }

    /// Overrides the default content type (e.g. `application/x-mpegURL` for HLS).
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Overrides the default stream type.
    #[must_use]
    pub fn with_stream_type(mut self, stream_type: StreamType) -> Self {
        self.stream_type = Some(stream_type);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rejects malformed requests before they reach the state machine.
    pub fn validate(&self) -> CastResult<()> {
        validate_media_url(&self.url)?;
        require_non_empty("title", &self.title)
    }
}

/// Movie metadata block sent with a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub metadata_type: u8,
    pub title: String,
}

/// Fully resolved load request handed to the media transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    /// Media URL the receiver fetches.
    pub content_id: String,
    pub stream_type: StreamType,
    pub content_type: String,
    pub metadata: MediaMetadata,
    pub autoplay: bool,
}

impl LoadRequest {
    /// Resolves a media request against the configured defaults.
    pub fn build(media: &MediaRequest, defaults: &MediaDefaults) -> Self {
        let content_type = media
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(defaults.content_type.as_str())
            .to_string();

        Self {
            content_id: media.url.trim().to_string(),
            stream_type: media.stream_type.unwrap_or(defaults.stream_type),
            content_type,
            metadata: MediaMetadata {
                metadata_type: CAST_METADATA_TYPE_MOVIE,
                title: media.title.clone(),
            },
            autoplay: true,
        }
    }

    /// Renders the Cast media-namespace `LOAD` message for this request.
    pub fn to_cast_payload(&self, request_id: i64) -> serde_json::Value {
        json!({
            "type": "LOAD",
            "requestId": request_id,
            "autoplay": self.autoplay,
            "media": {
                "contentId": self.content_id,
                "streamType": self.stream_type.as_cast_str(),
                "contentType": self.content_type,
                "metadata": {
                    "metadataType": self.metadata.metadata_type,
                    "title": self.metadata.title,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults() {
        let media = MediaRequest::new("http://x/video.mp4", "Demo");
        let request = LoadRequest::build(&media, &MediaDefaults::default());

        assert_eq!(request.content_id, "http://x/video.mp4");
        assert_eq!(request.stream_type, StreamType::Buffered);
        assert_eq!(request.content_type, "video/mp4");
        assert_eq!(request.metadata.title, "Demo");
        assert_eq!(request.metadata.metadata_type, CAST_METADATA_TYPE_MOVIE);
        assert!(request.autoplay);
    }

    #[test]
    fn build_honours_overrides() {
        let media = MediaRequest::new("https://x/live.m3u8", "News")
            .with_content_type("application/x-mpegURL")
            .with_stream_type(StreamType::Live);
        let request = LoadRequest::build(&media, &MediaDefaults::default());

        assert_eq!(request.content_type, "application/x-mpegURL");
        assert_eq!(request.stream_type, StreamType::Live);
    }

    #[test]
    fn blank_content_type_override_falls_back() {
        let media = MediaRequest::new("http://x/video.mp4", "Demo").with_content_type(" ");
        let request = LoadRequest::build(&media, &MediaDefaults::default());
        assert_eq!(request.content_type, "video/mp4");
    }

    #[test]
    fn cast_payload_matches_media_namespace_shape() {
        let media = MediaRequest::new("http://x/video.mp4", "Demo");
        let payload = LoadRequest::build(&media, &MediaDefaults::default()).to_cast_payload(7);

        assert_eq!(payload["type"], "LOAD");
        assert_eq!(payload["requestId"], 7);
        assert_eq!(payload["media"]["streamType"], "BUFFERED");
        assert_eq!(payload["media"]["contentType"], "video/mp4");
        assert_eq!(payload["media"]["metadata"]["title"], "Demo");
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(MediaRequest::new("", "Demo").validate().is_err());
        assert!(MediaRequest::new("file:///tmp/a.mp4", "Demo").validate().is_err());
        assert!(MediaRequest::new("http://x/video.mp4", "Demo").validate().is_ok());
    }

    #[test]
    fn validate_requires_title() {
        let err = MediaRequest::new("http://x/video.mp4", "  ")
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
        assert!(err.to_string().contains("title is required"));
    }
}
