use std::time::{Duration, Instant};

/// Deltas this close to the fixed target are treated as exactly the target.
///
/// Keeps a 59.94 Hz display from slowly drifting a 60 Hz fixed-step loop into
/// a dropped or doubled update.
const FIXED_STEP_SNAP: Duration = Duration::from_micros(250);

/// Shortest fixed step honoured (10 kHz). Shorter targets, including zero, are
/// raised to this so a tick always runs a bounded number of updates.
pub const MIN_FIXED_STEP: Duration = Duration::from_micros(100);

/// Step policy for a [`StepTimer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerConfig {
    /// Run updates in fixed increments of `target_elapsed`.
    pub fixed_time_step: bool,

    /// Update increment in fixed-step mode.
    pub target_elapsed: Duration,

    /// Upper bound on a single wall-clock delta (debugger breaks, stalls).
    pub max_delta: Duration,
}

impl TimerConfig {
    /// Fixed-step configuration at `hz` updates per second, capped at
    /// [`MIN_FIXED_STEP`].
    pub fn fixed(hz: u32) -> Self {
        Self {
            fixed_time_step: true,
            target_elapsed: (Duration::from_secs(1) / hz.max(1)).max(MIN_FIXED_STEP),
            ..Self::default()
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: false,
            target_elapsed: Duration::from_secs(1) / 60,
            max_delta: Duration::from_millis(100),
        }
    }
}

/// Frame timer with fixed or variable timestep.
///
/// `frame_count` counts updates, not ticks: in fixed-step mode a tick may run
/// zero or several updates.
#[derive(Debug, Clone)]
pub struct StepTimer {
    config: TimerConfig,

    last: Instant,
    left_over: Duration,

    elapsed: Duration,
    total: Duration,

    frame_count: u64,
    frames_per_second: u32,
    frames_this_second: u32,
    second_counter: Duration,
}

impl StepTimer {
    pub fn new(config: TimerConfig) -> Self {
        Self::starting_at(Instant::now(), config)
    }

    /// Creates a timer whose first delta is measured from `start`.
    pub fn starting_at(start: Instant, config: TimerConfig) -> Self {
        Self {
            config,
            last: start,
            left_over: Duration::ZERO,
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
            frame_count: 0,
            frames_per_second: 0,
            frames_this_second: 0,
            second_counter: Duration::ZERO,
        }
    }

    /// Time covered by the most recent update.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Simulated time since start (sum of all update deltas).
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn total_seconds(&self) -> f64 {
        self.total.as_secs_f64()
    }

    /// Number of updates run since start.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Updates counted over the last completed wall-clock second.
    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn set_fixed_time_step(&mut self, fixed: bool) {
        self.config.fixed_time_step = fixed;
    }

    /// Sets the fixed step; values below [`MIN_FIXED_STEP`] are raised to it.
    pub fn set_target_elapsed(&mut self, target: Duration) {
        if target < MIN_FIXED_STEP {
            log::warn!(
                "fixed step {target:?} is shorter than {MIN_FIXED_STEP:?}; using {MIN_FIXED_STEP:?}"
            );
        }
        self.config.target_elapsed = target.max(MIN_FIXED_STEP);
    }

    /// Negative or non-finite values fall back to [`MIN_FIXED_STEP`].
    pub fn set_target_elapsed_seconds(&mut self, seconds: f64) {
        self.set_target_elapsed(Duration::try_from_secs_f64(seconds).unwrap_or(MIN_FIXED_STEP));
    }

    /// Re-bases the wall clock so the time since the last tick is discarded.
    ///
    /// Call after an intentional pause (suspend, blocking load) so the next tick
    /// does not try to catch up.
    pub fn reset_elapsed_time(&mut self) {
        self.reset_elapsed_time_at(Instant::now());
    }

    pub fn reset_elapsed_time_at(&mut self, now: Instant) {
        self.last = now;
        self.left_over = Duration::ZERO;
        self.frames_per_second = 0;
        self.frames_this_second = 0;
        self.second_counter = Duration::ZERO;
    }

    /// Advances the timer to the current instant, calling `update` per the step policy.
    pub fn tick<F>(&mut self, update: F)
    where
        F: FnMut(&StepTimer),
    {
        self.tick_at(Instant::now(), update);
    }

    /// Advances the timer to `now`, calling `update` per the step policy.
    ///
    /// Returns the number of updates run.
    pub fn tick_at<F>(&mut self, now: Instant, mut update: F) -> u32
    where
        F: FnMut(&StepTimer),
    {
        let mut delta = now.saturating_duration_since(self.last);
        self.last = now;
        self.second_counter += delta;

        if delta > self.config.max_delta {
            log::trace!(
                "clamping frame delta {:.1}ms to {:.1}ms",
                delta.as_secs_f64() * 1000.0,
                self.config.max_delta.as_secs_f64() * 1000.0
            );
            delta = self.config.max_delta;
        }

        let last_frame_count = self.frame_count;
        let mut updates = 0u32;

        if self.config.fixed_time_step {
            // `config.target_elapsed` is a public field; re-check the floor.
            let target = self.config.target_elapsed.max(MIN_FIXED_STEP);

            if delta.abs_diff(target) < FIXED_STEP_SNAP {
                delta = target;
            }

            self.left_over += delta;

            while self.left_over >= target {
                self.elapsed = target;
                self.total += target;
                self.left_over -= target;
                self.frame_count += 1;
                updates += 1;

                update(self);
            }
        } else {
            self.elapsed = delta;
            self.total += delta;
            self.left_over = Duration::ZERO;
            self.frame_count += 1;
            updates += 1;

            update(self);
        }

        if self.frame_count != last_frame_count {
            self.frames_this_second += 1;
        }

        if self.second_counter >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_this_second;
            self.frames_this_second = 0;
            self.second_counter = Duration::from_nanos(
                (self.second_counter.as_nanos() % Duration::from_secs(1).as_nanos()) as u64,
            );
        }

        updates
    }
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn variable_step_runs_one_update_per_tick() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());

        let mut seen = Vec::new();
        let n = timer.tick_at(t0 + ms(16), |t| seen.push(t.elapsed()));

        assert_eq!(n, 1);
        assert_eq!(seen, vec![ms(16)]);
        assert_eq!(timer.frame_count(), 1);
        assert_eq!(timer.total(), ms(16));
    }

    #[test]
    fn variable_step_updates_even_with_zero_delta() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());

        assert_eq!(timer.tick_at(t0, |_| {}), 1);
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn delta_is_clamped_to_max_delta() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());

        timer.tick_at(t0 + Duration::from_secs(5), |_| {});

        assert_eq!(timer.elapsed(), ms(100));
        assert_eq!(timer.total(), ms(100));
    }

    #[test]
    fn fixed_step_accumulates_until_target() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::fixed(100)); // 10ms step

        assert_eq!(timer.tick_at(t0 + ms(4), |_| {}), 0);
        assert_eq!(timer.frame_count(), 0);

        assert_eq!(timer.tick_at(t0 + ms(8), |_| {}), 0);

        // 12ms accumulated: one step, 2ms carried over.
        assert_eq!(timer.tick_at(t0 + ms(12), |_| {}), 1);
        assert_eq!(timer.frame_count(), 1);
        assert_eq!(timer.elapsed(), ms(10));

        // 2 + 28 = 30ms: three steps.
        assert_eq!(timer.tick_at(t0 + ms(40), |_| {}), 3);
        assert_eq!(timer.frame_count(), 4);
        assert_eq!(timer.total(), ms(40));
    }

    #[test]
    fn fixed_step_snaps_near_target_deltas() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::fixed(100));

        // 9.9ms is within the snap window of 10ms.
        let updates = timer.tick_at(t0 + Duration::from_micros(9_900), |_| {});
        assert_eq!(updates, 1);
        assert_eq!(timer.total(), ms(10));
    }

    #[test]
    fn update_observes_advanced_timer() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::fixed(100));

        let mut totals = Vec::new();
        timer.tick_at(t0 + ms(20), |t| totals.push((t.frame_count(), t.total())));

        assert_eq!(totals, vec![(1, ms(10)), (2, ms(20))]);
    }

    #[test]
    fn reset_excludes_paused_time() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());
        timer.tick_at(t0 + ms(16), |_| {});

        // Long pause, then resume.
        let resumed = t0 + Duration::from_secs(30);
        timer.reset_elapsed_time_at(resumed);
        timer.tick_at(resumed + ms(16), |_| {});

        assert_eq!(timer.elapsed(), ms(16));
        assert_eq!(timer.total(), ms(32));
    }

    #[test]
    fn reset_discards_fixed_step_left_over() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::fixed(100));
        timer.tick_at(t0 + ms(7), |_| {});

        timer.reset_elapsed_time_at(t0 + ms(7));
        assert_eq!(timer.tick_at(t0 + ms(12), |_| {}), 0);
    }

    #[test]
    fn frames_per_second_counts_updates_per_wall_second() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());

        for i in 1..=10 {
            timer.tick_at(t0 + ms(100 * i), |_| {});
        }

        assert_eq!(timer.frames_per_second(), 10);
    }

    #[test]
    fn switching_to_fixed_step_at_runtime() {
        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());
        timer.set_fixed_time_step(true);
        timer.set_target_elapsed_seconds(0.05);

        assert_eq!(timer.tick_at(t0 + ms(100), |_| {}), 2);
        assert_eq!(timer.elapsed(), ms(50));
    }

    #[test]
    fn fixed_rate_beyond_timer_resolution_is_floored() {
        let t0 = Instant::now();
        let config = TimerConfig::fixed(u32::MAX);
        assert_eq!(config.target_elapsed, MIN_FIXED_STEP);

        let mut timer = StepTimer::starting_at(t0, config);
        assert_eq!(timer.tick_at(t0 + ms(16), |_| {}), 160);
    }

    #[test]
    fn zero_or_invalid_targets_fall_back_to_minimum_step() {
        let mut timer = StepTimer::new(TimerConfig::fixed(60));

        timer.set_target_elapsed(Duration::ZERO);
        assert_eq!(timer.config().target_elapsed, MIN_FIXED_STEP);

        timer.set_target_elapsed_seconds(-1.0);
        assert_eq!(timer.config().target_elapsed, MIN_FIXED_STEP);

        timer.set_target_elapsed_seconds(f64::NAN);
        assert_eq!(timer.config().target_elapsed, MIN_FIXED_STEP);
    }

    #[test]
    fn zero_target_in_config_does_not_stall_tick() {
        let t0 = Instant::now();
        let config = TimerConfig {
            fixed_time_step: true,
            target_elapsed: Duration::ZERO,
            ..TimerConfig::default()
        };
        let mut timer = StepTimer::starting_at(t0, config);

        assert_eq!(timer.tick_at(t0 + ms(1), |_| {}), 10);
        assert_eq!(timer.elapsed(), MIN_FIXED_STEP);
    }
}
