//! Session backend for a monitor that never casts.
//!
//! Discovery needs no vendor SDK, but the core still wants a session SDK and
//! a media transport. This backend rejects every session and load request, so
//! a stray connect ends as an ordinary start failure.

use castplus_core::{
    AttemptId, LoadRequest, MediaListener, MediaTransport, NativeHandle, RequestHandle, SdkError,
    SessionListener, SessionSdk,
};

const REJECTION: &str = "castplus-monitor does not open sessions";

pub struct NoSessionBackend;

impl SessionSdk for NoSessionBackend {
    fn attach_listener(&self, listener: SessionListener) {
        log::debug!("[Monitor] Listener for attempt {} ignored", listener.attempt());
    }

    fn detach_listener(&self, _attempt: AttemptId) {}

    fn start_session(&self, device: &NativeHandle) -> Result<(), SdkError> {
        log::warn!("[Monitor] Refusing session on {}", device.friendly_name);
        Err(SdkError::new(REJECTION))
    }

    fn end_session(&self) -> Result<(), SdkError> {
        Ok(())
    }
}

impl MediaTransport for NoSessionBackend {
    fn load_media(
        &self,
        _request: &LoadRequest,
        _listener: MediaListener,
    ) -> Result<RequestHandle, SdkError> {
        Err(SdkError::new(REJECTION))
    }

    fn release_listener(&self, _attempt: AttemptId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use castplus_core::TransportFamily;

    #[test]
    fn every_session_is_rejected() {
        let handle = NativeHandle::new("dev1", "TV", TransportFamily::Cast);
        let err = NoSessionBackend.start_session(&handle).unwrap_err();
        assert_eq!(err.message, REJECTION);
        assert!(NoSessionBackend.end_session().is_ok());
    }
}
