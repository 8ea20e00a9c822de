use crate::source::FrameSource;
use crate::types::SessionConfig;

/// Discover and inspect camera devices.
pub trait CameraManager {
    type Device: CameraDevice;
    type Error: core::error::Error;

    fn discover_devices(&self) -> Result<impl Iterator<Item = Self::Device>, Self::Error>;
    fn default_device(&self) -> Result<Option<Self::Device>, Self::Error>;
}

/// A camera device that can be opened as a frame source.
pub trait CameraDevice {
    type Source: FrameSource;
    type Error: core::error::Error;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn open(self, config: &SessionConfig) -> Result<Self::Source, Self::Error>;
}
