use std::sync::Mutex;

use block2::RcBlock;
use objc2::runtime::Bool;
use objc2_av_foundation::{AVAuthorizationStatus, AVCaptureDevice, AVMediaType, AVMediaTypeVideo};

use crate::error::{Error, PlatformError};
use crate::source::Authorization;

fn video_media_type() -> Result<&'static AVMediaType, Error> {
    unsafe { AVMediaTypeVideo }.ok_or(Error::Platform(PlatformError::Message(
        "AVMediaTypeVideo not available",
    )))
}

/// Camera authorization as last decided for this process, without
/// prompting.
pub fn authorization_status() -> Result<Authorization, Error> {
    let media_type = video_media_type()?;
    let status = unsafe { AVCaptureDevice::authorizationStatusForMediaType(media_type) };
    Ok(if status == AVAuthorizationStatus::Authorized {
        Authorization::Authorized
    } else if status == AVAuthorizationStatus::NotDetermined {
        Authorization::NotDetermined
    } else {
        // Denied or Restricted; terminal either way.
        Authorization::Denied
    })
}

/// Prompt the user for camera access if still undetermined.
///
/// The completion fires on an AVFoundation-owned queue once a decision
/// exists; an already-decided status resolves immediately without showing a
/// prompt. There is no way to re-prompt after a denial.
pub fn request_access<F>(completion: F) -> Result<(), Error>
where
    F: FnOnce(Authorization) + Send + 'static,
{
    let media_type = video_media_type()?;
    let completion = Mutex::new(Some(completion));
    let block = RcBlock::new(move |granted: Bool| {
        if let Some(f) = completion.lock().ok().and_then(|mut guard| guard.take()) {
            f(if granted.as_bool() {
                Authorization::Authorized
            } else {
                Authorization::Denied
            });
        }
    });
    unsafe { AVCaptureDevice::requestAccessForMediaType_completionHandler(media_type, &block) };
    Ok(())
}
