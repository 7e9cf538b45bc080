use super::types::{Matte, SegmentationModel};
use image::RgbImage;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// Best-effort segmentation scheduler with a single request slot.
///
/// A worker thread owns the model. `submit` places a frame in the slot,
/// overwriting any frame that is still waiting — frames are dropped
/// rather than queued, so the worker always sees the latest one. The
/// most recent matte is kept for pickup via `latest_matte`.
pub struct MatteScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<SlotState>,
    signal: Condvar,
}

#[derive(Default)]
struct SlotState {
    pending: Option<(u64, RgbImage)>,
    latest: Option<Matte>,
    latest_seq: u64,
    submitted_seq: u64,
    completed_seq: u64,
    shutdown: bool,
}

impl MatteScheduler {
    /// Spawn the worker around an already-initialized model
    pub fn new(mut model: Box<dyn SegmentationModel>) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(SlotState::default()),
            signal: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::spawn(move || loop {
            let (seq, frame) = {
                let mut state = worker_shared.state.lock().unwrap();
                loop {
                    if state.shutdown {
                        return;
                    }
                    if let Some(pending) = state.pending.take() {
                        break pending;
                    }
                    state = worker_shared.signal.wait(state).unwrap();
                }
            };

            let result = model.segment(&frame);

            let mut state = worker_shared.state.lock().unwrap();
            match result {
                Ok(matte) => {
                    state.latest = Some(matte);
                    state.latest_seq = seq;
                }
                Err(e) => tracing::warn!("Segmentation failed, frame skipped: {e}"),
            }
            // Overwritten frames never complete; their waiters are
            // satisfied by the newer sequence number instead
            state.completed_seq = state.completed_seq.max(seq);
            worker_shared.signal.notify_all();
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Offer a frame for segmentation, replacing any still-pending one
    pub fn submit(&self, frame: RgbImage) {
        let mut state = self.shared.state.lock().unwrap();
        if state.pending.is_some() {
            tracing::debug!("Segmentation busy, replacing pending frame");
        }
        state.submitted_seq += 1;
        state.pending = Some((state.submitted_seq, frame));
        self.shared.signal.notify_all();
    }

    /// Most recent completed matte, if any
    pub fn latest_matte(&self) -> Option<Matte> {
        self.shared.state.lock().unwrap().latest.clone()
    }

    /// Block until everything submitted so far has been processed (or
    /// superseded). Returns the matte only if the awaited frame actually
    /// produced one; an inference failure yields `None` rather than a
    /// matte belonging to an earlier frame.
    pub fn wait_for_matte(&self) -> Option<Matte> {
        let mut state = self.shared.state.lock().unwrap();
        let target = state.submitted_seq;
        while state.completed_seq < target && !state.shutdown {
            state = self.shared.signal.wait(state).unwrap();
        }
        if state.latest_seq >= target {
            state.latest.clone()
        } else {
            None
        }
    }
}

impl Drop for MatteScheduler {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.shutdown = true;
        }
        self.shared.signal.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingModel {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl CountingModel {
        fn boxed(calls: &Arc<AtomicUsize>, delay: Duration) -> Box<dyn SegmentationModel> {
            Box::new(CountingModel {
                calls: Arc::clone(calls),
                delay,
            })
        }
    }

    impl SegmentationModel for CountingModel {
        fn segment(&mut self, frame: &RgbImage) -> Result<Matte> {
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (w, h) = frame.dimensions();
            Ok(vec![1.0; (w * h) as usize])
        }
    }

    #[test]
    fn produces_matte_for_submitted_frame() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scheduler = MatteScheduler::new(CountingModel::boxed(&calls, Duration::ZERO));

        scheduler.submit(RgbImage::new(4, 4));
        let matte = scheduler.wait_for_matte().unwrap();

        assert_eq!(matte.len(), 16);
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn latest_matte_is_none_before_any_submission() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scheduler = MatteScheduler::new(CountingModel::boxed(&calls, Duration::ZERO));
        assert!(scheduler.latest_matte().is_none());
    }

    #[test]
    fn busy_worker_drops_intermediate_frames() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scheduler = MatteScheduler::new(CountingModel::boxed(
            &calls,
            Duration::from_millis(80),
        ));

        scheduler.submit(RgbImage::new(4, 4));
        // Give the worker time to pick up the first frame, then flood the
        // slot while it is busy
        std::thread::sleep(Duration::from_millis(20));
        for _ in 0..5 {
            scheduler.submit(RgbImage::new(4, 4));
        }

        scheduler.wait_for_matte().unwrap();
        // First frame plus at most the one surviving slot occupant
        assert!(calls.load(Ordering::SeqCst) <= 2);
    }

    struct FlakyModel {
        calls: usize,
    }

    impl SegmentationModel for FlakyModel {
        fn segment(&mut self, frame: &RgbImage) -> Result<Matte> {
            self.calls += 1;
            if self.calls >= 2 {
                return Err(crate::error::BoothError::Segmentation(
                    "inference failed".into(),
                ));
            }
            let (w, h) = frame.dimensions();
            Ok(vec![1.0; (w * h) as usize])
        }
    }

    #[test]
    fn failed_inference_yields_no_matte_for_that_frame() {
        let scheduler = MatteScheduler::new(Box::new(FlakyModel { calls: 0 }));

        scheduler.submit(RgbImage::new(4, 4));
        assert!(scheduler.wait_for_matte().is_some());

        // Second frame errors; the first frame's matte must not be
        // handed out in its place
        scheduler.submit(RgbImage::new(4, 4));
        assert_eq!(scheduler.wait_for_matte(), None);

        // The earlier matte is still around for best-effort preview
        assert!(scheduler.latest_matte().is_some());
    }

    #[test]
    fn shutdown_joins_worker() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scheduler = MatteScheduler::new(CountingModel::boxed(&calls, Duration::ZERO));
        scheduler.submit(RgbImage::new(4, 4));
        drop(scheduler);
    }
}
