#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod frame;
pub mod types;

#[cfg(feature = "alloc")]
pub mod convert;
#[cfg(feature = "alloc")]
pub mod image;

#[cfg(feature = "std")]
pub mod device;
#[cfg(feature = "std")]
pub mod error;
#[cfg(feature = "std")]
pub mod platform;
#[cfg(feature = "std")]
pub mod preview;
#[cfg(feature = "std")]
pub mod sink;
#[cfg(feature = "std")]
pub mod source;
#[cfg(feature = "std")]
pub mod synthetic;

// Re-exports
pub use frame::*;
pub use types::*;

#[cfg(feature = "alloc")]
pub use convert::*;
#[cfg(feature = "alloc")]
pub use image::*;

#[cfg(feature = "std")]
pub use device::*;
#[cfg(feature = "std")]
pub use error::*;
#[cfg(feature = "std")]
pub use preview::*;
#[cfg(feature = "std")]
pub use sink::*;
#[cfg(feature = "std")]
pub use source::*;
#[cfg(feature = "std")]
pub use synthetic::*;
