use objc2::rc::Retained;
use objc2_av_foundation::{AVCaptureDevice, AVMediaTypeVideo};

use crate::device::{CameraDevice, CameraManager};
use crate::error::{Error, PlatformError};
use crate::platform::macos::stream::MacosFrameSource;
use crate::types::{PixelFormat, SessionConfig};

/// macOS camera manager using AVFoundation.
#[derive(Default)]
pub struct MacosCameraManager;

impl CameraManager for MacosCameraManager {
    type Device = MacosCameraDevice;
    type Error = Error;

    fn discover_devices(&self) -> Result<impl Iterator<Item = Self::Device>, Self::Error> {
        let media_type = unsafe { AVMediaTypeVideo }.ok_or(Error::Platform(
            PlatformError::Message("AVMediaTypeVideo not available"),
        ))?;

        #[allow(deprecated)]
        let devices: Vec<_> = unsafe { AVCaptureDevice::devicesWithMediaType(media_type) }
            .iter()
            .map(|d| MacosCameraDevice::new(d.clone()))
            .collect();

        Ok(devices.into_iter())
    }

    fn default_device(&self) -> Result<Option<Self::Device>, Self::Error> {
        let media_type = unsafe { AVMediaTypeVideo }.ok_or(Error::Platform(
            PlatformError::Message("AVMediaTypeVideo not available"),
        ))?;

        let device = unsafe { AVCaptureDevice::defaultDeviceWithMediaType(media_type) };
        Ok(device.map(MacosCameraDevice::new))
    }
}

/// Wraps an `AVCaptureDevice`.
pub struct MacosCameraDevice {
    pub(crate) device: Retained<AVCaptureDevice>,
    id_cache: String,
    name_cache: String,
}

impl MacosCameraDevice {
    pub(crate) fn new(device: Retained<AVCaptureDevice>) -> Self {
        let id_cache = unsafe { device.uniqueID() }.to_string();
        let name_cache = unsafe { device.localizedName() }.to_string();
        MacosCameraDevice {
            device,
            id_cache,
            name_cache,
        }
    }

    /// Access the underlying `AVCaptureDevice`.
    pub fn av_device(&self) -> &AVCaptureDevice {
        &self.device
    }
}

pub(crate) fn fourcc_to_pixel_format(fourcc: u32) -> Option<PixelFormat> {
    // kCVPixelFormatType values
    #[allow(clippy::mistyped_literal_suffixes)]
    match fourcc {
        0x34_32_30_76 => Some(PixelFormat::Nv12),   // '420v'
        0x34_32_30_66 => Some(PixelFormat::Nv12),   // '420f'
        0x79_75_76_32 => Some(PixelFormat::Yuyv),   // 'yuvs' / 'yuv2'
        0x32_76_75_79 => Some(PixelFormat::Uyvy),   // '2vuy'
        0x42_47_52_41 => Some(PixelFormat::Bgra32), // 'BGRA'
        0x6A_70_65_67 => Some(PixelFormat::Jpeg),   // 'jpeg'
        _ => None,
    }
}

pub(crate) fn pixel_format_to_fourcc(pf: &PixelFormat) -> u32 {
    #[allow(clippy::mistyped_literal_suffixes)]
    match pf {
        PixelFormat::Nv12 => 0x34_32_30_76,   // '420v'
        PixelFormat::Yuyv => 0x79_75_76_32,   // 'yuvs'
        PixelFormat::Uyvy => 0x32_76_75_79,   // '2vuy'
        PixelFormat::Bgra32 => 0x42_47_52_41, // 'BGRA'
        PixelFormat::Jpeg => 0x6A_70_65_67,   // 'jpeg'
    }
}

impl CameraDevice for MacosCameraDevice {
    type Source = MacosFrameSource;
    type Error = Error;

    fn id(&self) -> &str {
        &self.id_cache
    }

    fn name(&self) -> &str {
        &self.name_cache
    }

    fn open(self, config: &SessionConfig) -> Result<Self::Source, Self::Error> {
        MacosFrameSource::new(self.device, config)
    }
}
