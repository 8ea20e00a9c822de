use core::fmt;

#[cfg(target_os = "macos")]
use objc2::exception::Exception;
#[cfg(target_os = "macos")]
use objc2::rc::Retained;
#[cfg(target_os = "macos")]
use objc2_foundation::NSError;

use crate::convert::ConvertError;
use crate::image::BufferError;

/// Platform-specific error details.
///
/// On platforms that provide native error objects (e.g. `NSError` on macOS),
/// the original object is preserved. Use [`Display`](fmt::Display) (or
/// [`ToString::to_string`] when `alloc` is available) to obtain a
/// human-readable description.
#[derive(Debug)]
#[non_exhaustive]
pub enum PlatformError {
    Message(&'static str),
    #[cfg(target_os = "macos")]
    NsError(Retained<NSError>),
    #[cfg(target_os = "macos")]
    ObjCException(Option<Retained<Exception>>),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => f.write_str(msg),
            #[cfg(target_os = "macos")]
            Self::NsError(e) => write!(f, "{e}"),
            #[cfg(target_os = "macos")]
            Self::ObjCException(Some(e)) => write!(f, "{e:?}"),
            #[cfg(target_os = "macos")]
            Self::ObjCException(None) => f.write_str("unknown Objective-C exception"),
        }
    }
}

impl core::error::Error for PlatformError {}

/// Top-level crate error.
///
/// Permission denial and a missing device are terminal for capture: the
/// session is never started and there is no retry path. Per-frame
/// conversion and buffer failures normally stay inside the previewer (logged
/// and discarded); the variants exist for callers driving the converter
/// directly.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    PermissionDenied,
    DeviceNotFound,
    AlreadyStarted,
    NotStarted,
    Conversion(ConvertError),
    Buffer(BufferError),
    Platform(PlatformError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("camera permission denied"),
            Self::DeviceNotFound => f.write_str("no such device"),
            Self::AlreadyStarted => f.write_str("source already started"),
            Self::NotStarted => f.write_str("source not started"),
            Self::Conversion(e) => write!(f, "conversion failed: {e}"),
            Self::Buffer(e) => write!(f, "buffer creation failed: {e}"),
            Self::Platform(e) => write!(f, "platform error: {e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Conversion(e) => Some(e),
            Self::Buffer(e) => Some(e),
            Self::Platform(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PlatformError> for Error {
    fn from(e: PlatformError) -> Self {
        Self::Platform(e)
    }
}

impl From<ConvertError> for Error {
    fn from(e: ConvertError) -> Self {
        Self::Conversion(e)
    }
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}
