//! Media load sequencing for an active session.
//!
//! The sequencer builds the load request, hands it to the media transport and
//! interprets what comes back. It does not track attempts itself: the session
//! controller guarantees a single submission per attempt and tells the
//! sequencer whether the load outcome was already observed.

use std::sync::Arc;

use crate::config::MediaDefaults;
use crate::events::{EventEmitter, StatusEvent};
use crate::media::{LoadRequest, MediaRequest};
use crate::sdk::{MediaListener, MediaSignal, MediaTransport, RequestHandle, SdkError};
use crate::session::AttemptId;

/// Error text reported when the receiver goes idle with an error status.
const PLAYBACK_ERROR: &str = "media playback error";

/// What a media signal means for the pending connect completion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MediaOutcome {
    /// The load succeeded.
    Loaded,
    /// The load failed with the given SDK error.
    Failed(SdkError),
    /// Nothing to resolve.
    Ignored,
}

/// Builds, submits and tracks the single media load of a session.
pub struct MediaLoadSequencer {
    transport: Arc<dyn MediaTransport>,
    defaults: MediaDefaults,
    emitter: Arc<dyn EventEmitter>,
}

impl MediaLoadSequencer {
    pub fn new(
        transport: Arc<dyn MediaTransport>,
        defaults: MediaDefaults,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            transport,
            defaults,
            emitter,
        }
    }

    /// Builds the load request and announces it with `MediaLoading`.
    pub(crate) fn prepare(&self, device_name: &str, media: &MediaRequest) -> LoadRequest {
        let request = LoadRequest::build(media, &self.defaults);
        log::info!(
            "[Media] Loading '{}' ({}) on {}",
            request.metadata.title,
            request.content_type,
            device_name
        );
        self.emitter
            .emit_status(StatusEvent::media_loading(device_name, media.title()));
        request
    }

    /// Hands the request to the transport. Must be called without locks held.
    pub(crate) fn dispatch(
        &self,
        request: &LoadRequest,
        listener: MediaListener,
    ) -> Result<RequestHandle, SdkError> {
        self.transport.load_media(request, listener)
    }

    /// Announces that the transport accepted the request.
    pub(crate) fn confirm_sent(&self, device_name: &str, handle: RequestHandle) {
        log::debug!("[Media] Load request {} sent to {}", handle.0, device_name);
        self.emitter
            .emit_status(StatusEvent::media_load_request_sent(device_name));
    }

    /// Announces a load failure.
    pub(crate) fn report_failure(&self, device_name: &str, error: &SdkError) {
        log::warn!("[Media] Load failed on {}: {}", device_name, error);
        self.emitter
            .emit_status(StatusEvent::media_load_failed(device_name, &error.message));
    }

    /// Interprets a transport signal.
    ///
    /// `load_observed` is true once the load outcome has already resolved the
    /// connect completion; later signals then only produce status events.
    pub(crate) fn interpret(
        &self,
        device_name: &str,
        load_observed: bool,
        signal: MediaSignal,
    ) -> MediaOutcome {
        match signal {
            MediaSignal::RequestCompleted => {
                if load_observed {
                    log::debug!("[Media] Duplicate load completion on {}", device_name);
                    return MediaOutcome::Ignored;
                }
                log::info!("[Media] Load completed on {}", device_name);
                MediaOutcome::Loaded
            }
            MediaSignal::RequestFailed(error) => {
                self.report_failure(device_name, &error);
                if load_observed {
                    MediaOutcome::Ignored
                } else {
                    MediaOutcome::Failed(error)
                }
            }
            MediaSignal::StatusChanged(status) if status.is_finished() => {
                log::info!("[Media] Playback finished on {}", device_name);
                self.emitter
                    .emit_status(StatusEvent::media_finished(device_name));
                if load_observed {
                    MediaOutcome::Ignored
                } else {
                    MediaOutcome::Loaded
                }
            }
            MediaSignal::StatusChanged(status) if status.is_error() => {
                if load_observed {
                    log::warn!("[Media] Playback error on {} after load", device_name);
                    return MediaOutcome::Ignored;
                }
                let error = SdkError::new(PLAYBACK_ERROR);
                self.report_failure(device_name, &error);
                MediaOutcome::Failed(error)
            }
            MediaSignal::StatusChanged(status) => {
                log::trace!(
                    "[Media] {} is {:?} at {:.1}s",
                    device_name,
                    status.player_state,
                    status.current_time
                );
                MediaOutcome::Ignored
            }
        }
    }

    /// Drops the transport's listener for `attempt`.
    pub(crate) fn release(&self, attempt: AttemptId) {
        self.transport.release_listener(attempt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StatusKind;
    use crate::sdk::{IdleReason, MediaStatus, PlayerState};
    use crate::test_support::{MockMediaTransport, RecordingEmitter};

    fn sequencer() -> (MediaLoadSequencer, Arc<MockMediaTransport>, Arc<RecordingEmitter>) {
        let transport = Arc::new(MockMediaTransport::default());
        let emitter = Arc::new(RecordingEmitter::default());
        let sequencer = MediaLoadSequencer::new(
            transport.clone(),
            MediaDefaults::default(),
            emitter.clone(),
        );
        (sequencer, transport, emitter)
    }

    fn status(state: PlayerState, reason: Option<IdleReason>) -> MediaSignal {
        MediaSignal::StatusChanged(MediaStatus::new(state, reason))
    }

    #[test]
    fn prepare_emits_loading_with_title() {
        let (sequencer, _, emitter) = sequencer();
        let request = sequencer.prepare("TV", &MediaRequest::new("http://x/video.mp4", "Demo"));

        assert_eq!(request.content_type, "video/mp4");
        let statuses = emitter.statuses();
        assert_eq!(statuses.len(), 1);
        assert!(matches!(
            &statuses[0],
            StatusEvent::MediaLoading { device_name, title, .. }
                if device_name == "TV" && title == "Demo"
        ));
    }

    #[test]
    fn first_completion_is_success() {
        let (sequencer, _, emitter) = sequencer();
        assert_eq!(
            sequencer.interpret("TV", false, MediaSignal::RequestCompleted),
            MediaOutcome::Loaded
        );
        assert_eq!(
            sequencer.interpret("TV", true, MediaSignal::RequestCompleted),
            MediaOutcome::Ignored
        );
        assert!(emitter.statuses().is_empty());
    }

    #[test]
    fn failure_carries_sdk_text() {
        let (sequencer, _, emitter) = sequencer();
        let outcome = sequencer.interpret(
            "TV",
            false,
            MediaSignal::RequestFailed(SdkError::new("Unsupported media")),
        );
        assert_eq!(outcome, MediaOutcome::Failed(SdkError::new("Unsupported media")));
        assert_eq!(emitter.statuses()[0].error(), Some("Unsupported media"));
    }

    #[test]
    fn finished_resolves_only_if_not_observed() {
        let (sequencer, _, emitter) = sequencer();
        let finished = status(PlayerState::Idle, Some(IdleReason::Finished));

        assert_eq!(
            sequencer.interpret("TV", false, finished.clone()),
            MediaOutcome::Loaded
        );
        assert_eq!(sequencer.interpret("TV", true, finished), MediaOutcome::Ignored);
        assert_eq!(
            emitter.status_kinds(),
            vec![StatusKind::MediaFinished, StatusKind::MediaFinished]
        );
    }

    #[test]
    fn idle_error_before_load_is_failure() {
        let (sequencer, _, emitter) = sequencer();
        let outcome = sequencer.interpret("TV", false, status(PlayerState::Idle, Some(IdleReason::Error)));

        assert_eq!(outcome, MediaOutcome::Failed(SdkError::new(PLAYBACK_ERROR)));
        assert_eq!(emitter.status_kinds(), vec![StatusKind::MediaLoadFailed]);
    }

    #[test]
    fn other_statuses_are_ignored() {
        let (sequencer, _, emitter) = sequencer();
        for signal in [
            status(PlayerState::Playing, None),
            status(PlayerState::Buffering, None),
            status(PlayerState::Idle, Some(IdleReason::Cancelled)),
        ] {
            assert_eq!(sequencer.interpret("TV", false, signal), MediaOutcome::Ignored);
        }
        assert!(emitter.statuses().is_empty());
    }

    #[test]
    fn release_forwards_to_transport() {
        let (sequencer, transport, _) = sequencer();
        let attempt = AttemptId::new();
        sequencer.release(attempt);
        assert_eq!(transport.released(), vec![attempt]);
    }
}
