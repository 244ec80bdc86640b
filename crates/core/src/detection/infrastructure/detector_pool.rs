use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::detection::domain::region_detector::RegionDetector;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PoolError {
    #[error("detector pool needs at least one detector")]
    Empty,
    #[error("detector pool is disconnected")]
    Disconnected,
}

/// Fixed set of detector instances shared by concurrent masking requests.
///
/// Inference sessions are not reentrant, so each instance is lent to exactly
/// one request at a time; callers block until one is idle. Instances are
/// loaded once up front and live as long as the pool.
pub struct DetectorPool {
    idle_tx: Sender<Box<dyn RegionDetector>>,
    idle_rx: Receiver<Box<dyn RegionDetector>>,
}

impl DetectorPool {
    pub fn new(detectors: Vec<Box<dyn RegionDetector>>) -> Result<Self, PoolError> {
        if detectors.is_empty() {
            return Err(PoolError::Empty);
        }
        let size = detectors.len();
        let (idle_tx, idle_rx) = crossbeam_channel::bounded(size);
        for detector in detectors {
            idle_tx.send(detector).map_err(|_| PoolError::Disconnected)?;
        }
        Ok(Self { idle_tx, idle_rx })
    }

    /// Builds `size` detectors with `factory`, stopping at the first failure.
    pub fn build<E>(
        size: usize,
        mut factory: impl FnMut(usize) -> Result<Box<dyn RegionDetector>, E>,
    ) -> Result<Self, E>
    where
        E: From<PoolError>,
    {
        let detectors = (0..size).map(&mut factory).collect::<Result<Vec<_>, E>>()?;
        Ok(Self::new(detectors)?)
    }

    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }

    /// Borrows an idle detector for the duration of `f`.
    ///
    /// The detector goes back to the pool even if `f` panics.
    pub fn with_detector<T>(
        &self,
        f: impl FnOnce(&mut dyn RegionDetector) -> T,
    ) -> Result<T, PoolError> {
        let detector = self.idle_rx.recv().map_err(|_| PoolError::Disconnected)?;
        let mut checkout = Checkout {
            pool: self,
            detector: Some(detector),
        };
        match checkout.detector.as_deref_mut() {
            Some(detector) => Ok(f(detector)),
            None => Err(PoolError::Disconnected),
        }
    }
}

struct Checkout<'a> {
    pool: &'a DetectorPool,
    detector: Option<Box<dyn RegionDetector>>,
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        if let Some(detector) = self.detector.take() {
            // Capacity equals pool size, so this never blocks.
            let _ = self.pool.idle_tx.send(detector);
        }
    }
}
