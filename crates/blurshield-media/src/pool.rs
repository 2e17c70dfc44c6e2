//! Detector pool: bounds concurrent use of a fixed set of detector
//! instances behind a semaphore, the way `JobExecutor` in the worker
//! crate bounds concurrent jobs.

use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use crate::error::MediaResult;
use crate::BoundingBox;

/// One detection pass against one image.
///
/// Implemented by the OpenCV-backed YuNet detector (feature `opencv`)
/// and, in tests, by a stub so pool bookkeeping can be exercised without
/// a system OpenCV install.
pub trait Detector: Send {
    fn detect(&mut self, image: &DetectorInput) -> MediaResult<Vec<(BoundingBox, f64)>>;
}

/// What a [`Detector`] operates on. Boxed behind a feature so the pool
/// and its tests compile without OpenCV linked in.
#[cfg(feature = "opencv")]
pub type DetectorInput = opencv::core::Mat;
#[cfg(not(feature = "opencv"))]
pub type DetectorInput = Vec<u8>;

type BoxedDetector = Box<dyn Detector>;

/// Fixed-size pool of detector instances, checked out under a counting
/// semaphore. Construction is the pool's one-shot `initialize`: by the
/// time `new` returns, all `N` detectors exist and the free list is
/// full — there is no separate idempotent-init step to get wrong,
/// because Rust's ownership model already makes "runs exactly once"
/// the constructor's job.
///
/// The free list is a plain `std::sync::Mutex`, never held across an
/// `.await`: both `lease` and the lease's `Drop` only need it for a
/// `pop`/`push`, so there is no reason to pay for an async mutex here.
pub struct DetectorPool {
    size: usize,
    semaphore: Arc<Semaphore>,
    free: Mutex<Vec<BoxedDetector>>,
}

impl DetectorPool {
    /// Eagerly build `size` detectors via `factory`. `factory` is called
    /// exactly `size` times.
    pub fn new<F>(size: usize, mut factory: F) -> MediaResult<Self>
    where
        F: FnMut() -> MediaResult<BoxedDetector>,
    {
        let mut free = Vec::with_capacity(size);
        for _ in 0..size {
            free.push(factory()?);
        }
        Ok(Self {
            size,
            semaphore: Arc::new(Semaphore::new(size)),
            free: Mutex::new(free),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Block until a detector is available, then hand out an exclusive,
    /// RAII-scoped lease. `self` is an `Arc` so the lease can own its
    /// own clone rather than borrow: that makes `DetectorLease` `'static`,
    /// which is what lets the analyzer and exporter move a lease into
    /// `tokio::task::spawn_blocking` for the actual (synchronous, CPU-bound)
    /// detection call. The permit and the detector both return on every
    /// exit path — panic, early return, or `?` — because they live in
    /// the guard's `Drop`, not in caller discipline.
    pub async fn lease(self: &Arc<Self>) -> DetectorLease {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("pool semaphore is never closed");
        let detector = self
            .free
            .lock()
            .expect("free list poisoned")
            .pop()
            .expect("semaphore permit implies a free detector is available");
        DetectorLease {
            pool: Arc::clone(self),
            detector: Some(detector),
            _permit: permit,
        }
    }

    fn release(&self, detector: BoxedDetector) {
        self.free.lock().expect("free list poisoned").push(detector);
    }

    /// Number of detectors currently checked out. For tests only; not
    /// part of the production contract.
    #[cfg(test)]
    pub fn outstanding(&self) -> usize {
        self.size - self.free.lock().unwrap().len()
    }
}

/// Exclusive, scoped possession of one detector. Returned to the pool's
/// free list when dropped, regardless of how the scope is exited.
pub struct DetectorLease {
    pool: Arc<DetectorPool>,
    detector: Option<BoxedDetector>,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl DetectorLease {
    pub fn detect(&mut self, image: &DetectorInput) -> MediaResult<Vec<(BoundingBox, f64)>> {
        self.detector
            .as_mut()
            .expect("detector only taken on drop")
            .detect(image)
    }
}

impl Drop for DetectorLease {
    fn drop(&mut self) {
        if let Some(detector) = self.detector.take() {
            self.pool.release(detector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubDetector;

    impl Detector for StubDetector {
        fn detect(&mut self, _image: &DetectorInput) -> MediaResult<Vec<(BoundingBox, f64)>> {
            Ok(vec![])
        }
    }

    fn stub_pool(size: usize) -> Arc<DetectorPool> {
        Arc::new(DetectorPool::new(size, || Ok(Box::new(StubDetector) as BoxedDetector)).unwrap())
    }

    #[tokio::test]
    async fn lease_and_release_conserves_detectors() {
        let pool = stub_pool(3);
        {
            let _a = pool.lease().await;
            let _b = pool.lease().await;
            assert_eq!(pool.outstanding(), 2);
        }
        // leases dropped: both detectors returned.
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn bounded_concurrency_blocks_the_nplus1th_lease() {
        let pool = stub_pool(2);
        let _a = pool.lease().await;
        let _b = pool.lease().await;

        let pending = Arc::new(AtomicUsize::new(0));
        let pool2 = Arc::clone(&pool);
        let pending2 = Arc::clone(&pending);
        let handle = tokio::spawn(async move {
            pending2.fetch_add(1, Ordering::SeqCst);
            let _c = pool2.lease().await;
            pending2.fetch_sub(1, Ordering::SeqCst);
        });

        tokio::task::yield_now().await;
        assert_eq!(pending.load(Ordering::SeqCst), 1);
        assert_eq!(pool.outstanding(), 2);

        drop(_a);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn release_on_early_return_via_question_mark() {
        let pool = stub_pool(1);

        async fn does_work(pool: &Arc<DetectorPool>) -> MediaResult<()> {
            let mut lease = pool.lease().await;
            lease.detect(&DetectorInput::default())?;
            Err(MediaError::detection_failed("simulated failure"))
        }

        let _ = does_work(&pool).await;
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn lease_survives_a_spawn_blocking_move() {
        let pool = stub_pool(1);
        let mut lease = pool.lease().await;
        let result = tokio::task::spawn_blocking(move || lease.detect(&DetectorInput::default()))
            .await
            .unwrap();
        assert!(result.unwrap().is_empty());
        assert_eq!(pool.outstanding(), 0);
    }
}
