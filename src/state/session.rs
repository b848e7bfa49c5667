/// The filter session
///
/// This is the heart of the app: it owns the three inputs (source bitmap,
/// active filter, intensity) and keeps a rendered output derived from them.
/// Any change to an input triggers a full recompute through the engine;
/// there is no incremental update path. A failed render leaves the last
/// good output on screen.

use image::RgbaImage;

use crate::filter::engine::RenderEngine;
use crate::filter::kind::{FilterKind, FilterParams};
use super::usage::{CounterStore, FILTER_CHANGES, REVIEW_THRESHOLD};

/// Asks the user for a review
///
/// Invoked on every filter change once the persisted counter has reached
/// the threshold; showing at most one actual prompt is this collaborator's
/// job, not the session's.
pub trait ReviewPrompt {
    fn request_review(&mut self);
}

pub struct FilterSession {
    engine: Box<dyn RenderEngine>,
    counter: Box<dyn CounterStore>,
    review: Box<dyn ReviewPrompt>,

    source: Option<RgbaImage>,
    filter: FilterKind,
    intensity: f32,
    rendered: Option<RgbaImage>,
}

impl FilterSession {
    /// Create a session with its collaborators injected
    ///
    /// Starts in the no-image state with the default filter and the slider
    /// at its midpoint.
    pub fn new(
        engine: Box<dyn RenderEngine>,
        counter: Box<dyn CounterStore>,
        review: Box<dyn ReviewPrompt>,
    ) -> Self {
        FilterSession {
            engine,
            counter,
            review,
            source: None,
            filter: FilterKind::default(),
            intensity: 0.5,
            rendered: None,
        }
    }

    /// Install a freshly decoded photo as the filter input
    ///
    /// Replaces the previous source wholesale and recomputes the output.
    pub fn install_source(&mut self, bitmap: RgbaImage) {
        self.source = Some(bitmap);
        self.recompute();
    }

    /// Switch the active filter, keeping the current photo
    ///
    /// Every switch bumps the persisted usage counter; once the counter
    /// reaches the review threshold the review collaborator is invoked on
    /// the call that got it there.
    pub fn set_filter(&mut self, kind: FilterKind) {
        self.filter = kind;

        match self.counter.increment(FILTER_CHANGES) {
            Ok(count) if count >= REVIEW_THRESHOLD => self.review.request_review(),
            Ok(_) => {}
            // A counter that fails to persist must not break filtering
            Err(e) => eprintln!("⚠️  Failed to record filter change: {}", e),
        }

        self.recompute();
    }

    /// Update the intensity slider value
    ///
    /// The slider is the only writer and already restricts the range to
    /// [0, 1], so no further validation happens here.
    pub fn set_intensity(&mut self, value: f32) {
        self.intensity = value;
        self.recompute();
    }

    /// Re-render the output from the current inputs
    ///
    /// No-op while no photo is loaded. On engine failure the previous
    /// output is left untouched.
    pub fn recompute(&mut self) {
        let Some(source) = &self.source else {
            return;
        };

        let params = FilterParams::map(self.filter, self.intensity);

        match self.engine.render(self.filter, &params, source) {
            Ok(output) => self.rendered = Some(output),
            Err(e) => eprintln!("⚠️  Render failed, keeping previous output: {}", e),
        }
    }

    pub fn rendered(&self) -> Option<&RgbaImage> {
        self.rendered.as_ref()
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}

impl std::fmt::Debug for FilterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSession")
            .field("filter", &self.filter)
            .field("intensity", &self.intensity)
            .field("has_source", &self.source.is_some())
            .field("has_rendered", &self.rendered.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::engine::{CpuEngine, EngineError, EngineResult};
    use crate::state::usage::MemoryCounter;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every render call; can be switched to fail mid-test
    struct RecordingEngine {
        calls: Rc<RefCell<Vec<(FilterKind, FilterParams)>>>,
        fail: Rc<std::cell::Cell<bool>>,
    }

    impl RenderEngine for RecordingEngine {
        fn render(
            &self,
            kind: FilterKind,
            params: &FilterParams,
            input: &RgbaImage,
        ) -> EngineResult<RgbaImage> {
            self.calls.borrow_mut().push((kind, *params));
            if self.fail.get() {
                return Err(EngineError::EmptyInput {
                    width: 0,
                    height: 0,
                });
            }
            Ok(input.clone())
        }
    }

    /// Counts review requests
    struct CountingPrompt {
        requests: Rc<RefCell<u32>>,
    }

    impl ReviewPrompt for CountingPrompt {
        fn request_review(&mut self) {
            *self.requests.borrow_mut() += 1;
        }
    }

    struct Harness {
        session: FilterSession,
        calls: Rc<RefCell<Vec<(FilterKind, FilterParams)>>>,
        reviews: Rc<RefCell<u32>>,
        fail: Rc<std::cell::Cell<bool>>,
    }

    fn harness_with(counter: MemoryCounter) -> Harness {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let reviews = Rc::new(RefCell::new(0));
        let fail = Rc::new(std::cell::Cell::new(false));

        let session = FilterSession::new(
            Box::new(RecordingEngine {
                calls: calls.clone(),
                fail: fail.clone(),
            }),
            Box::new(counter),
            Box::new(CountingPrompt {
                requests: reviews.clone(),
            }),
        );

        Harness {
            session,
            calls,
            reviews,
            fail,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryCounter::new())
    }

    fn photo() -> RgbaImage {
        RgbaImage::from_pixel(4, 4, image::Rgba([120, 90, 60, 255]))
    }

    #[test]
    fn test_starts_with_sepia_and_no_output() {
        let h = harness();
        assert_eq!(h.session.filter(), FilterKind::SepiaTone);
        assert_eq!(h.session.intensity(), 0.5);
        assert!(!h.session.has_source());
        assert!(h.session.rendered().is_none());
    }

    #[test]
    fn test_no_image_guard() {
        // Filter and intensity changes before a photo is loaded must not
        // render anything
        let mut h = harness();
        h.session.set_filter(FilterKind::GaussianBlur);
        h.session.set_intensity(0.9);
        h.session.recompute();

        assert!(h.session.rendered().is_none());
        assert!(h.calls.borrow().is_empty());
    }

    #[test]
    fn test_default_sepia_render() {
        let mut h = harness();
        h.session.install_source(photo());

        let calls = h.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (kind, params) = calls[0];
        assert_eq!(kind, FilterKind::SepiaTone);
        assert_eq!(params.intensity, Some(0.5));
        assert_eq!(params.radius, None);
        assert_eq!(params.scale, None);
        drop(calls);

        assert!(h.session.rendered().is_some());
    }

    #[test]
    fn test_blur_receives_scaled_radius() {
        let mut h = harness();
        h.session.install_source(photo());
        h.session.set_intensity(0.25);
        h.session.set_filter(FilterKind::GaussianBlur);

        let calls = h.calls.borrow();
        let (kind, params) = *calls.last().unwrap();
        assert_eq!(kind, FilterKind::GaussianBlur);
        assert_eq!(params.radius, Some(50.0));
    }

    #[test]
    fn test_unsharp_mask_receives_both_params() {
        let mut h = harness();
        h.session.install_source(photo());
        h.session.set_intensity(0.8);
        h.session.set_filter(FilterKind::UnsharpMask);

        let calls = h.calls.borrow();
        let (_, params) = *calls.last().unwrap();
        assert_eq!(params.radius, Some(160.0));
        assert_eq!(params.intensity, Some(0.8));
        assert_eq!(params.scale, None);
    }

    #[test]
    fn test_filter_change_keeps_source() {
        let mut h = harness();
        h.session.install_source(photo());
        h.session.set_filter(FilterKind::Vignette);

        // Second render ran against the same photo
        assert_eq!(h.calls.borrow().len(), 2);
        assert!(h.session.rendered().is_some());
    }

    #[test]
    fn test_review_fires_exactly_once_after_three_changes() {
        let mut h = harness();
        h.session.install_source(photo());

        h.session.set_filter(FilterKind::Edges);
        assert_eq!(*h.reviews.borrow(), 0);
        h.session.set_filter(FilterKind::Pixellate);
        assert_eq!(*h.reviews.borrow(), 0);
        h.session.set_filter(FilterKind::Vignette);
        assert_eq!(*h.reviews.borrow(), 1);
    }

    #[test]
    fn test_review_fires_when_persisted_count_crosses_threshold() {
        // Two changes from a previous run; one more crosses the line
        let mut h = harness_with(MemoryCounter::starting_at(FILTER_CHANGES, 2));
        h.session.install_source(photo());

        h.session.set_filter(FilterKind::Crystallize);
        assert_eq!(*h.reviews.borrow(), 1);
    }

    #[test]
    fn test_render_failure_keeps_previous_output() {
        let mut h = harness();
        h.session.install_source(photo());
        let before = h.session.rendered().unwrap().clone();

        h.fail.set(true);
        h.session.set_intensity(0.6);

        // The failed render was attempted but the output is untouched
        assert_eq!(h.calls.borrow().len(), 2);
        assert_eq!(h.session.rendered().unwrap(), &before);
    }

    #[test]
    fn test_render_failure_before_any_output_leaves_none() {
        let mut h = harness();
        h.fail.set(true);
        h.session.install_source(photo());
        assert!(h.session.rendered().is_none());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        // Two recomputes with unchanged inputs produce bit-identical output
        let reviews = Rc::new(RefCell::new(0));
        let mut session = FilterSession::new(
            Box::new(CpuEngine::new()),
            Box::new(MemoryCounter::new()),
            Box::new(CountingPrompt {
                requests: reviews.clone(),
            }),
        );

        session.set_intensity(0.8);
        session.set_filter(FilterKind::Crystallize);
        session.install_source(photo());

        let first = session.rendered().unwrap().clone();
        session.recompute();
        let second = session.rendered().unwrap().clone();
        assert_eq!(first, second);
    }
}
