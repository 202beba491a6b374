//! Contains logic for reading user inactivity from different environments.
//! [GenericIdleSource] is the main artifact of this module that abstracts
//! the operations.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use anyhow::Result;

/// Intended to serve as a contract windows and linux systems must implement.
#[cfg_attr(test, mockall::automock)]
pub trait IdleSource {
    /// Retrieve amount of time user has been inactive in milliseconds
    fn get_idle_time(&mut self) -> Result<u32>;
}

/// Serves as a cross-compatible IdleSource implementation.
pub struct GenericIdleSource {
    inner: Box<dyn IdleSource + Send>,
}

impl GenericIdleSource {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsIdleSource;
                Ok(Self {
                    inner: Box::new(WindowsIdleSource::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::LinuxIdleSource;
                Ok(Self {
                    inner: Box::new(LinuxIdleSource::new()?),
                })
            }
            else {
                tracing::warn!("No idle source was enabled at build time, every tick counts as active");
                Ok(Self {
                    inner: Box::new(AlwaysActive),
                })
            }
        }
    }
}

impl IdleSource for GenericIdleSource {
    fn get_idle_time(&mut self) -> Result<u32> {
        self.inner.get_idle_time()
    }
}

/// Used when the binary was built without a platform feature.
#[cfg(not(any(feature = "win", feature = "x11")))]
struct AlwaysActive;

#[cfg(not(any(feature = "win", feature = "x11")))]
impl IdleSource for AlwaysActive {
    fn get_idle_time(&mut self) -> Result<u32> {
        Ok(0)
    }
}
