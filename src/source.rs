use crate::frame::CaptureEvent;

/// Camera permission state.
///
/// The only transitions are `NotDetermined` → `Authorized` and
/// `NotDetermined` → `Denied`, driven by the platform's grant callback.
/// Denial is terminal for the process's capture capability: a denied source
/// is never started, and the denial is logged, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    NotDetermined,
    Denied,
    Authorized,
}

/// Callback-based frame delivery.
///
/// Events are pushed on a single dedicated background context, strictly one
/// at a time, never concurrently. The handler borrows each frame for the
/// duration of the call only; a slow handler causes the source to drop
/// frames upstream rather than queue them.
pub trait FrameSource {
    type Error: core::error::Error;

    /// Start delivery. The handler is invoked on the source's delivery
    /// context for every delivered and every dropped frame, until [`stop`]
    /// is called or the source is dropped.
    ///
    /// [`stop`]: FrameSource::stop
    fn start<H>(&mut self, handler: H) -> Result<(), Self::Error>
    where
        H: FnMut(CaptureEvent<'_>) + Send + 'static;

    fn stop(&mut self) -> Result<(), Self::Error>;
}
