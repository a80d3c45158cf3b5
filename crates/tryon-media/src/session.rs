//! Overlay session where the most recent image wins.
//!
//! Every [`OverlaySession::submit`] starts a new generation. The previous
//! run is aborted, which drops its detector guard and closes the detector.
//! A finished run publishes its frame only if its generation is still the
//! current one. The check and the publish happen under the watch channel's
//! lock, and so does the generation bump, so a superseded result can never
//! replace a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use tryon_models::PoseOptions;

use crate::compositor::{CompositeFrame, Compositor};
use crate::detector::PoseProvider;
use crate::error::{MediaError, MediaResult};
use crate::pipeline::render_image;

/// Latest state of a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Nothing submitted yet
    Idle,
    /// A run for this generation is in flight
    Pending { generation: u64 },
    /// Composite for this generation
    Ready {
        generation: u64,
        frame: Arc<CompositeFrame>,
    },
    /// The image for this generation could not be rendered
    Failed { generation: u64, message: String },
    /// The session closed before this generation settled
    Cancelled { generation: u64 },
}

impl SessionEvent {
    /// Generation the event belongs to (0 for idle).
    pub fn generation(&self) -> u64 {
        match self {
            SessionEvent::Idle => 0,
            SessionEvent::Pending { generation }
            | SessionEvent::Ready { generation, .. }
            | SessionEvent::Failed { generation, .. }
            | SessionEvent::Cancelled { generation } => *generation,
        }
    }
}

/// Interactive overlay pipeline.
pub struct OverlaySession {
    compositor: Arc<Compositor>,
    provider: Arc<dyn PoseProvider>,
    options: PoseOptions,
    generation: Arc<AtomicU64>,
    events: Arc<watch::Sender<SessionEvent>>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl OverlaySession {
    /// Create a new session.
    pub fn new(compositor: Arc<Compositor>, provider: Arc<dyn PoseProvider>, options: PoseOptions) -> Self {
        let (events, _) = watch::channel(SessionEvent::Idle);
        Self {
            compositor,
            provider,
            options,
            generation: Arc::new(AtomicU64::new(0)),
            events: Arc::new(events),
            in_flight: Mutex::new(None),
        }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current generation (0 before the first submit).
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Submit a new encoded image, superseding any run in flight.
    ///
    /// Must be called from within a Tokio runtime. Returns the new
    /// generation.
    pub fn submit(&self, bytes: Vec<u8>) -> u64 {
        let mut generation = 0;
        self.events.send_modify(|event| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *event = SessionEvent::Pending { generation };
        });

        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            debug!(generation, "Superseding in-flight overlay run");
            previous.abort();
        }

        let compositor = Arc::clone(&self.compositor);
        let provider = Arc::clone(&self.provider);
        let options = self.options.clone();
        let current = Arc::clone(&self.generation);
        let events = Arc::clone(&self.events);

        *slot = Some(tokio::spawn(async move {
            let event = match render_image(compositor, provider, options, bytes).await {
                Ok(frame) => SessionEvent::Ready {
                    generation,
                    frame: Arc::new(frame),
                },
                Err(e) => {
                    warn!(generation, error = %e, "Overlay run failed");
                    SessionEvent::Failed {
                        generation,
                        message: e.to_string(),
                    }
                }
            };

            // A close() may already have settled this generation
            let applied = events.send_if_modified(|latest| {
                let pending = matches!(latest, SessionEvent::Pending { generation: g } if *g == generation);
                if !pending || current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *latest = event;
                true
            });
            if !applied {
                debug!(generation, "Discarding stale overlay result");
            }
        }));

        generation
    }

    /// Wait until `generation` settles.
    ///
    /// Fails with [`MediaError::Cancelled`] if a newer submission supersedes
    /// it or the session closes first.
    pub async fn wait_for(&self, generation: u64) -> MediaResult<Arc<CompositeFrame>> {
        let mut rx = self.subscribe();
        loop {
            {
                let event = rx.borrow_and_update();
                if event.generation() > generation {
                    return Err(MediaError::Cancelled);
                }
                match &*event {
                    SessionEvent::Ready { generation: g, frame } if *g == generation => {
                        return Ok(Arc::clone(frame));
                    }
                    SessionEvent::Failed { generation: g, message } if *g == generation => {
                        return Err(MediaError::internal(message.clone()));
                    }
                    SessionEvent::Cancelled { generation: g } if *g == generation => {
                        return Err(MediaError::Cancelled);
                    }
                    _ => {}
                }
            }
            rx.changed().await.map_err(|_| MediaError::Cancelled)?;
        }
    }

    /// Abort any run in flight. Its detector is closed when the task drops,
    /// and a pending generation is settled as cancelled so waiters return.
    pub fn close(&self) {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        self.events.send_if_modified(|event| match *event {
            SessionEvent::Pending { generation } => {
                debug!(generation, "Overlay session closed with a run pending");
                *event = SessionEvent::Cancelled { generation };
                true
            }
            _ => false,
        });
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_png;
    use crate::detector::PoseDetector;
    use async_trait::async_trait;
    use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tryon_models::{Keypoint, LandmarkSet, PoseLandmark};

    /// Detector whose latency depends on the image width, so an earlier
    /// submission can finish after a later one.
    struct SlowWideProvider {
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
    }

    struct SlowWideDetector {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PoseDetector for SlowWideDetector {
        async fn detect(&mut self, image: &DynamicImage) -> MediaResult<LandmarkSet> {
            let (width, _) = image.dimensions();
            tokio::time::sleep(Duration::from_millis(width as u64 * 10)).await;
            let mut set = LandmarkSet::empty();
            set.set(PoseLandmark::Nose, Some(Keypoint::new(0.5, 0.5, 1.0)));
            Ok(set)
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "slow-wide"
        }
    }

    #[async_trait]
    impl PoseProvider for SlowWideProvider {
        async fn open(&self, _options: &PoseOptions) -> MediaResult<Box<dyn PoseDetector>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(SlowWideDetector {
                closed: Arc::clone(&self.closed),
            }))
        }

        fn name(&self) -> &'static str {
            "slow-wide"
        }
    }

    fn png(width: u32) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(width, 10, Rgba([9, 9, 9, 255]))).unwrap()
    }

    fn session() -> (OverlaySession, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let opened = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));
        let provider = SlowWideProvider {
            opened: Arc::clone(&opened),
            closed: Arc::clone(&closed),
        };
        let session = OverlaySession::new(
            Arc::new(Compositor::default()),
            Arc::new(provider),
            PoseOptions::default(),
        );
        (session, opened, closed)
    }

    #[tokio::test]
    async fn test_single_submission_completes() {
        let (session, _, closed) = session();
        let generation = session.submit(png(2));
        assert_eq!(generation, 1);

        let frame = session.wait_for(generation).await.unwrap();
        assert_eq!(frame.image.dimensions(), (2, 10));
        assert!(frame.landmarks.get(PoseLandmark::Nose).is_some());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_latest_submission_wins() {
        let (session, opened, closed) = session();
        let mut rx = session.subscribe();

        // First image is slow, second is fast
        let first = session.submit(png(30));
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = session.submit(png(1));

        let frame = session.wait_for(second).await.unwrap();
        assert_eq!(frame.image.dimensions(), (1, 10));

        // Give the superseded run time to have finished if it had not been aborted
        tokio::time::sleep(Duration::from_millis(400)).await;

        let latest = rx.borrow_and_update().clone();
        assert_eq!(latest.generation(), second);
        assert!(matches!(latest, SessionEvent::Ready { .. }));
        assert!(matches!(session.wait_for(first).await, Err(MediaError::Cancelled)));

        // Both detectors were opened, and both were closed
        assert_eq!(opened.load(Ordering::SeqCst), 2);
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_undecodable_image_fails_generation() {
        let (session, _, _) = session();
        let generation = session.submit(b"garbage".to_vec());
        assert!(session.wait_for(generation).await.is_err());
        assert!(matches!(
            &*session.subscribe().borrow(),
            SessionEvent::Failed { generation: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_close_releases_detector() {
        let (session, opened, closed) = session();
        session.submit(png(50));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(opened.load(Ordering::SeqCst), 1);

        drop(session);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_settles_waiters() {
        let (session, _, closed) = session();
        let session = Arc::new(session);
        let generation = session.submit(png(500));

        let waiter = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.wait_for(generation).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.close();

        let result = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter still blocked after close")
            .unwrap();
        assert!(matches!(result, Err(MediaError::Cancelled)));
        assert!(matches!(
            &*session.subscribe().borrow(),
            SessionEvent::Cancelled { generation: 1 }
        ));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);

        // Closing again leaves the settled event alone
        session.close();
        assert!(matches!(
            &*session.subscribe().borrow(),
            SessionEvent::Cancelled { generation: 1 }
        ));
    }
}
