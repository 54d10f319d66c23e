//! Fade-in transition for newly bound values.
//!
//! A fade starts with the widget cleared, its opacity at 0 and the new value
//! assigned (the binder does this in one UI job). [`FadeTransition::run`]
//! then raises opacity linearly on a frame interval until it reaches exactly
//! 1.0. Every step is a separate UI job that re-checks the driving token, so
//! a rebind stops the animation at whatever opacity it had reached.

use std::sync::Arc;

use bridge_traits::dispatch::UiDispatcher;
use bridge_traits::widget::Widget;
use core_async::sync::CancellationToken;
use core_async::time::{frame_interval, Duration, Instant};
use tracing::trace;

/// Default animation frame period.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTransition {
    duration: Duration,
    frame_interval: Duration,
}

impl FadeTransition {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Fade lasting `millis`; 0 or negative disables it.
    pub fn from_millis(millis: i64) -> Self {
        Self::new(Duration::from_millis(millis.max(0) as u64))
    }

    /// A zero period is replaced by 1 ms.
    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval.max(Duration::from_millis(1));
        self
    }

    /// Whether values should be faded in rather than assigned directly.
    pub fn is_enabled(&self) -> bool {
        !self.duration.is_zero()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Opacity `elapsed` into the transition, clamped to `[0, 1]`.
    ///
    /// A disabled transition is always fully opaque.
    pub fn opacity_at(&self, elapsed: Duration) -> f32 {
        if !self.is_enabled() || elapsed >= self.duration {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    /// Drive opacity from 0 to 1, one UI job per frame.
    ///
    /// Returns once the final step (opacity 1.0) has been dispatched, or as
    /// soon as `token` is cancelled or the dispatcher stops accepting jobs.
    /// Must run inside a Tokio runtime.
    pub async fn run<W>(
        &self,
        widget: Arc<W>,
        token: CancellationToken,
        dispatcher: Arc<dyn UiDispatcher>,
    ) where
        W: Widget + ?Sized + 'static,
    {
        if !self.is_enabled() {
            return;
        }

        let mut ticker = frame_interval(self.frame_interval);
        let start = Instant::now();

        loop {
            core_async::select! {
                biased;
                _ = token.cancelled() => {
                    trace!(widget = %widget.widget_id(), "Fade cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let opacity = self.opacity_at(start.elapsed());
            let step_widget = Arc::clone(&widget);
            let step_token = token.clone();
            let dispatched = dispatcher.dispatch(Box::new(move || {
                if !step_token.is_cancelled() {
                    step_widget.set_opacity(opacity);
                }
            }));

            if dispatched.is_err() || opacity >= 1.0 {
                return;
            }
        }
    }
}

impl Default for FadeTransition {
    fn default() -> Self {
        Self::from_millis(300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::{ManualUiDispatcher, TextView, ThreadUiDispatcher, ViewChange};

    fn opacities(view: &TextView) -> Vec<f32> {
        view.history()
            .into_iter()
            .filter_map(|change| match change {
                ViewChange::Opacity(o) => Some(o),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_opacity_interpolation() {
        let fade = FadeTransition::from_millis(200);
        assert_eq!(fade.opacity_at(Duration::ZERO), 0.0);
        assert!((fade.opacity_at(Duration::from_millis(50)) - 0.25).abs() < 1e-6);
        assert!((fade.opacity_at(Duration::from_millis(100)) - 0.5).abs() < 1e-6);
        assert_eq!(fade.opacity_at(Duration::from_millis(200)), 1.0);
        assert_eq!(fade.opacity_at(Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn test_non_positive_duration_disables() {
        assert!(!FadeTransition::from_millis(0).is_enabled());
        assert!(!FadeTransition::from_millis(-50).is_enabled());
        assert_eq!(FadeTransition::from_millis(-50).opacity_at(Duration::ZERO), 1.0);
        assert!(FadeTransition::default().is_enabled());
    }

    #[test]
    fn test_zero_frame_interval_clamped() {
        let fade = FadeTransition::from_millis(100).with_frame_interval(Duration::ZERO);
        assert_eq!(fade.frame_interval(), Duration::from_millis(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_is_monotonic_and_ends_at_one() {
        let dispatcher = Arc::new(ThreadUiDispatcher::spawn().unwrap());
        let view = Arc::new(TextView::new());
        let fade = FadeTransition::from_millis(80).with_frame_interval(Duration::from_millis(5));

        fade.run(view.clone(), CancellationToken::new(), dispatcher.clone())
            .await;
        dispatcher.flush().await.unwrap();

        let steps = opacities(&view);
        assert!(steps.len() >= 2);
        assert!(steps.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*steps.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_changes_nothing() {
        let dispatcher = Arc::new(ManualUiDispatcher::new());
        let view = Arc::new(TextView::new());
        let token = CancellationToken::new();
        token.cancel();

        FadeTransition::from_millis(100)
            .run(view.clone(), token, dispatcher.clone())
            .await;
        dispatcher.run_pending();

        assert!(view.history().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_animation_stops_updates() {
        let dispatcher = Arc::new(ManualUiDispatcher::new());
        let view = Arc::new(TextView::new());
        let token = CancellationToken::new();
        let fade = FadeTransition::from_millis(10_000).with_frame_interval(Duration::from_millis(1));

        let runner = {
            let view = view.clone();
            let token = token.clone();
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { fade.run(view, token, dispatcher).await })
        };

        core_async::time::sleep(Duration::from_millis(20)).await;
        dispatcher.run_pending();
        let applied_before_cancel = opacities(&view).len();
        assert!(applied_before_cancel >= 1);

        token.cancel();
        runner.await.unwrap();
        dispatcher.run_pending();

        // Queued steps are skipped once the token is cancelled
        assert_eq!(opacities(&view).len(), applied_before_cancel);
        assert!(view.opacity() < 1.0);
    }

    #[tokio::test]
    async fn test_disabled_fade_dispatches_nothing() {
        let dispatcher = Arc::new(ManualUiDispatcher::new());
        let view = Arc::new(TextView::new());

        FadeTransition::from_millis(0)
            .run(view.clone(), CancellationToken::new(), dispatcher.clone())
            .await;

        assert_eq!(dispatcher.pending(), 0);
    }
}
