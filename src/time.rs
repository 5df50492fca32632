use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use smallvec::{smallvec, SmallVec};

const CACHED_DELTA_TIMES_COUNT: usize = 20;

/// Frame clock. `start_frame` is called once per rendered frame; everything
/// that animates reads `total_ms` from here instead of sampling the OS clock
/// itself, so one frame sees one consistent timestamp.
#[derive(Debug)]
pub struct Time {
    frame_count: usize,
    frame_time: Instant,
    delta_time: Duration,
    total_time: Duration,
    start_time: Instant,
    delta_times: VecDeque<Duration>,
    stats: TimeStats,
}

#[derive(Debug, Default)]
pub struct TimeStats {
    fps: Stats,
    delta_ms: Stats,
}

#[derive(Debug, Default)]
pub struct Stats {
    pub max: f64,
    pub min: f64,
    pub avg: f64,
    pub std: f64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let mut delta_times = VecDeque::new();
        delta_times.push_back(Duration::from_millis(10));
        Time {
            start_time: Instant::now(),
            total_time: Duration::ZERO,
            frame_count: 0,
            frame_time: Instant::now() - Duration::from_millis(10),
            delta_time: Duration::from_millis(10),
            delta_times,
            stats: TimeStats::default(),
        }
    }

    pub fn start_frame(&mut self) {
        self.total_time = Instant::now() - self.start_time;
        let this_frame = Instant::now();
        if self.delta_times.len() >= CACHED_DELTA_TIMES_COUNT {
            self.delta_times.pop_back();
        }
        self.delta_time = this_frame.duration_since(self.frame_time);
        self.delta_times.push_front(self.delta_time);
        self.frame_time = this_frame;
        self.frame_count += 1;
        self.stats.recalculate(&self.delta_times);
    }

    pub fn fps(&self) -> f64 {
        self.stats.fps.avg
    }

    pub fn total(&self) -> &Duration {
        &self.total_time
    }

    /// Milliseconds since startup, as sampled at `start_frame`.
    pub fn total_ms(&self) -> f64 {
        self.total_time.as_secs_f64() * 1000.0
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn stats(&self) -> &TimeStats {
        &self.stats
    }
}

impl TimeStats {
    pub fn fps(&self) -> &Stats {
        &self.fps
    }

    pub fn delta_ms(&self) -> &Stats {
        &self.delta_ms
    }
}

impl TimeStats {
    fn recalculate(&mut self, delta_times: &VecDeque<Duration>) {
        assert!(!delta_times.is_empty());
        assert!(delta_times.len() <= CACHED_DELTA_TIMES_COUNT);

        let mut delta_ms: SmallVec<[f64; CACHED_DELTA_TIMES_COUNT]> = smallvec![];
        let mut fps: SmallVec<[f64; CACHED_DELTA_TIMES_COUNT]> = smallvec![];
        for d in delta_times {
            let secs = d.as_secs_f64();
            delta_ms.push(secs * 1000.0);
            fps.push(1.0 / secs);
        }

        self.delta_ms = Stats::new(&delta_ms);
        self.fps = Stats::new(&fps);
    }
}

impl Stats {
    fn new(nums: &[f64]) -> Self {
        let mut max: f64 = f64::NAN;
        let mut min: f64 = f64::NAN;
        let mut sum: f64 = 0.0;
        let mut sqsum: f64 = 0.0;
        for e in nums {
            sum += *e;
            sqsum += *e * *e;
            if !(*e < max) {
                max = *e;
            }

            if !(*e > min) {
                min = *e;
            }
        }
        let len = nums.len() as f64;
        let avg = sum / len;
        let var = (sqsum / len) - ((sum / len) * (sum / len));
        let std = var.sqrt();
        Stats { max, min, avg, std }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_follow_recorded_frames() {
        let mut time = Time::new();
        for _ in 0..5 {
            std::thread::sleep(Duration::from_millis(2));
            time.start_frame();
        }
        assert_eq!(time.frame_count(), 5);
        assert!(time.fps() > 0.0);
        let delta_ms = time.stats().delta_ms();
        assert!(delta_ms.min <= delta_ms.avg);
        assert!(delta_ms.avg <= delta_ms.max);
        assert!(time.total_ms() > 0.0);
    }
}
