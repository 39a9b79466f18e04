// edgekit-pipeline/src/lease.rs
//! Scoped read access to a caller-owned frame.
//!
//! A successful [`FrameSource::acquire`] is paired with exactly one
//! [`FrameSource::release`] when the lease drops, whichever way the
//! transform exits.  A failed acquire constructs no lease, so release is
//! never called for a resource that was never held.

use thiserror::Error;

/// The frame's pixel data could not be borrowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct AcquireError {
    pub reason: String,
}

impl AcquireError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A caller-owned frame that can lend out its pixel words for one call.
///
/// Plain slices and vectors implement this with a no-op release;
/// instrumented sources use the release hook to verify that every borrow
/// was handed back.
pub trait FrameSource {
    /// Borrow the pixel data.  Called at most once per transform.
    fn acquire(&self) -> Result<&[u32], AcquireError>;

    /// Return the borrow.  Called exactly once per successful acquire.
    fn release(&self);
}

impl FrameSource for [u32] {
    fn acquire(&self) -> Result<&[u32], AcquireError> {
        Ok(self)
    }

    fn release(&self) {}
}

impl FrameSource for Vec<u32> {
    fn acquire(&self) -> Result<&[u32], AcquireError> {
        Ok(self.as_slice())
    }

    fn release(&self) {}
}

/// Ties a borrowed frame to its release.
pub(crate) struct Lease<'a, S: FrameSource + ?Sized> {
    source: &'a S,
    pixels: &'a [u32],
}

impl<'a, S: FrameSource + ?Sized> Lease<'a, S> {
    pub(crate) fn acquire(source: &'a S) -> Result<Self, AcquireError> {
        let pixels = source.acquire()?;
        Ok(Self { source, pixels })
    }

    pub(crate) fn pixels(&self) -> &'a [u32] {
        self.pixels
    }
}

impl<S: FrameSource + ?Sized> Drop for Lease<'_, S> {
    fn drop(&mut self) {
        self.source.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracked {
        pixels: Vec<u32>,
        fail: bool,
        released: AtomicUsize,
    }

    impl FrameSource for Tracked {
        fn acquire(&self) -> Result<&[u32], AcquireError> {
            if self.fail {
                return Err(AcquireError::new("no backing store"));
            }
            Ok(&self.pixels)
        }

        fn release(&self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn release_runs_exactly_once_on_drop() {
        let src = Tracked {
            pixels: vec![1, 2, 3],
            fail: false,
            released: AtomicUsize::new(0),
        };
        {
            let lease = Lease::acquire(&src).unwrap();
            assert_eq!(lease.pixels(), &[1, 2, 3]);
        }
        assert_eq!(src.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_acquire_skips_release() {
        let src = Tracked {
            pixels: vec![],
            fail: true,
            released: AtomicUsize::new(0),
        };
        assert!(Lease::acquire(&src).is_err());
        assert_eq!(src.released.load(Ordering::SeqCst), 0);
    }
}
