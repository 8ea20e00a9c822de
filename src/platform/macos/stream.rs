use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2::runtime::ProtocolObject;
use objc2::{AllocAnyThread, DefinedClass, define_class, msg_send};
use objc2_av_foundation::{
    AVCaptureConnection, AVCaptureDevice, AVCaptureDeviceInput, AVCaptureOutput, AVCaptureSession,
    AVCaptureSessionPreset, AVCaptureVideoDataOutput,
    AVCaptureVideoDataOutputSampleBufferDelegate,
};
use objc2_core_media::CMSampleBuffer;
use objc2_core_video::kCVPixelBufferPixelFormatTypeKey;
use objc2_foundation::{NSDictionary, NSNumber, NSObjectProtocol, NSString};

use crate::error::{Error, PlatformError};
use crate::frame::CaptureEvent;
use crate::platform::macos::auth;
use crate::platform::macos::catch_objc;
use crate::platform::macos::device::pixel_format_to_fourcc;
use crate::platform::macos::frame::{
    PixelLockGuard, raw_frame_from_locked, timestamp_from_cm_time,
};
use crate::source::FrameSource;
use crate::types::{SessionConfig, Size};

type EventHandler = Box<dyn FnMut(CaptureEvent<'_>) + Send + 'static>;

struct DelegateIvars {
    handler: Arc<Mutex<Option<EventHandler>>>,
}

define_class!(
    #[unsafe(super(objc2_foundation::NSObject))]
    #[ivars = DelegateIvars]
    #[name = "CameraPreviewSampleBufferDelegate"]
    struct SampleBufferDelegate;

    impl SampleBufferDelegate {
    }

    unsafe impl NSObjectProtocol for SampleBufferDelegate {}

    unsafe impl AVCaptureVideoDataOutputSampleBufferDelegate for SampleBufferDelegate {
        #[unsafe(method(captureOutput:didOutputSampleBuffer:fromConnection:))]
        #[allow(non_snake_case)]
        unsafe fn captureOutput_didOutputSampleBuffer_fromConnection(
            &self,
            _output: &AVCaptureOutput,
            sample_buffer: &CMSampleBuffer,
            _connection: &AVCaptureConnection,
        ) {
            // Get the pixel buffer from the sample buffer
            let pixel_buffer = match unsafe { sample_buffer.image_buffer() } {
                Some(pb) => pb,
                None => return,
            };

            let timestamp =
                timestamp_from_cm_time(unsafe { sample_buffer.presentation_time_stamp() });

            // Lock, build the borrowed view, hand it to the consumer. The
            // guard unlocks when this scope exits, on every path.
            let Some(lock) = PixelLockGuard::lock_read_only(&pixel_buffer) else {
                log::warn!("could not lock pixel buffer, frame skipped");
                return;
            };

            let frame = match unsafe { raw_frame_from_locked(lock.pixel_buffer(), timestamp) } {
                Some(frame) => frame,
                None => {
                    log::warn!("unreadable pixel buffer, frame skipped");
                    return;
                }
            };

            if let Ok(mut guard) = self.ivars().handler.lock()
                && let Some(ref mut handler) = *guard {
                    handler(CaptureEvent::Frame(frame));
                }
        }

        #[unsafe(method(captureOutput:didDropSampleBuffer:fromConnection:))]
        #[allow(non_snake_case)]
        unsafe fn captureOutput_didDropSampleBuffer_fromConnection(
            &self,
            _output: &AVCaptureOutput,
            _sample_buffer: &CMSampleBuffer,
            _connection: &AVCaptureConnection,
        ) {
            if let Ok(mut guard) = self.ivars().handler.lock()
                && let Some(ref mut handler) = *guard {
                    handler(CaptureEvent::Dropped);
                }
        }
    }
);

impl SampleBufferDelegate {
    fn new(handler: EventHandler) -> Retained<Self> {
        let ivars = DelegateIvars {
            handler: Arc::new(Mutex::new(Some(handler))),
        };
        let obj = Self::alloc().set_ivars(ivars);
        unsafe { msg_send![super(obj), init] }
    }
}

fn preset_for_size(size: Size) -> Result<&'static AVCaptureSessionPreset, Error> {
    use objc2_av_foundation::{
        AVCaptureSessionPreset640x480, AVCaptureSessionPreset1280x720,
        AVCaptureSessionPreset1920x1080,
    };

    let preset = match (size.width, size.height) {
        (640, 480) => unsafe { AVCaptureSessionPreset640x480 },
        (1280, 720) => unsafe { AVCaptureSessionPreset1280x720 },
        (1920, 1080) => unsafe { AVCaptureSessionPreset1920x1080 },
        _ => None,
    };
    preset.ok_or(Error::Platform(PlatformError::Message(
        "no session preset for the requested size",
    )))
}

/// macOS frame source backed by `AVCaptureSession`.
///
/// Configured once at construction (fixed preset, fixed pixel format,
/// drop-late-frames policy), then started; it runs until stopped or
/// dropped, delivering events on its own serial dispatch queue.
pub struct MacosFrameSource {
    session: Retained<AVCaptureSession>,
    output: Retained<AVCaptureVideoDataOutput>,
    delegate: Option<Retained<SampleBufferDelegate>>,
    running: bool,
}

impl MacosFrameSource {
    pub(crate) fn new(
        device: Retained<AVCaptureDevice>,
        config: &SessionConfig,
    ) -> Result<Self, Error> {
        // A session built without authorization would run and deliver
        // nothing; fail the setup instead. Callers prompt via
        // `auth::request_access` before opening.
        if auth::authorization_status()? != crate::source::Authorization::Authorized {
            return Err(Error::PermissionDenied);
        }

        let session = unsafe { AVCaptureSession::new() };

        // Create device input
        let input = unsafe { AVCaptureDeviceInput::deviceInputWithDevice_error(&device) }
            .map_err(|e| Error::Platform(PlatformError::NsError(e)))?;

        // Create video data output
        let output = unsafe { AVCaptureVideoDataOutput::new() };

        // Ask for frames in the configured pixel format rather than the
        // output's default (which is typically UYVY).
        let fourcc = pixel_format_to_fourcc(&config.pixel_format);
        unsafe {
            let key: &NSString = std::mem::transmute::<&objc2_core_foundation::CFString, &NSString>(
                kCVPixelBufferPixelFormatTypeKey,
            );
            let value = NSNumber::new_u32(fourcc);
            let settings: Retained<NSDictionary<NSString, AnyObject>> =
                NSDictionary::dictionaryWithObject_forKey(&value, ProtocolObject::from_ref(key));
            output.setVideoSettings(Some(&settings));
        }

        // Late frames are discarded upstream instead of queued; the
        // consumer sees drop notifications rather than growing latency.
        unsafe { output.setAlwaysDiscardsLateVideoFrames(config.discard_late_frames) };

        let preset = preset_for_size(config.size)?;

        catch_objc(AssertUnwindSafe(|| unsafe {
            session.beginConfiguration();

            if !session.canSetSessionPreset(preset) {
                session.commitConfiguration();
                return Err(Error::Platform(PlatformError::Message(
                    "session preset not supported by this device",
                )));
            }
            session.setSessionPreset(preset);

            // Add input
            if !session.canAddInput(&input) {
                session.commitConfiguration();
                return Err(Error::Platform(PlatformError::Message(
                    "cannot add input to session",
                )));
            }
            session.addInput(&input);

            // Add output
            if !session.canAddOutput(&output) {
                session.commitConfiguration();
                return Err(Error::Platform(PlatformError::Message(
                    "cannot add output to session",
                )));
            }
            session.addOutput(&output);

            session.commitConfiguration();
            Ok::<(), Error>(())
        }))??;

        Ok(MacosFrameSource {
            session,
            output,
            delegate: None,
            running: false,
        })
    }
}

impl FrameSource for MacosFrameSource {
    type Error = Error;

    fn start<H>(&mut self, handler: H) -> Result<(), Self::Error>
    where
        H: FnMut(CaptureEvent<'_>) + Send + 'static,
    {
        if self.running {
            return Err(Error::AlreadyStarted);
        }

        let delegate = SampleBufferDelegate::new(Box::new(handler));

        let queue = dispatch2::DispatchQueue::new(
            "camera-preview.capture",
            dispatch2::DispatchQueueAttr::SERIAL,
        );

        unsafe {
            self.output.setSampleBufferDelegate_queue(
                Some(ProtocolObject::from_ref(&*delegate)),
                Some(&queue),
            );
        }

        self.delegate = Some(delegate);

        catch_objc(AssertUnwindSafe(|| unsafe { self.session.startRunning() }))?;
        self.running = true;

        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        if !self.running {
            return Err(Error::NotStarted);
        }

        unsafe { self.session.stopRunning() };

        unsafe {
            self.output.setSampleBufferDelegate_queue(None, None);
        }

        // Clear the handler
        if let Some(ref delegate) = self.delegate
            && let Ok(mut guard) = delegate.ivars().handler.lock()
        {
            *guard = None;
        }
        self.delegate = None;
        self.running = false;

        Ok(())
    }
}

impl Drop for MacosFrameSource {
    fn drop(&mut self) {
        if self.running {
            let _ = self.stop();
        }
    }
}
