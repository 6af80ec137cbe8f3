//! Planning statistics

use std::collections::VecDeque;
use std::time::Duration;

/// One recorded planning cycle
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlanSample {
    duration: Duration,
    expansions: usize,
    succeeded: bool,
}

/// Rolling statistics over recent planning cycles
#[derive(Debug)]
pub struct PlanStats {
    /// Recent samples for averaging
    samples: VecDeque<PlanSample>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Average planning time in milliseconds
    avg_plan_time_ms: f32,
    /// Maximum planning time in milliseconds
    max_plan_time_ms: f32,
    /// Average expansions per search
    avg_expansions: f32,
    /// Share of recent searches that found a route
    success_rate: f32,
    /// Total plans attempted
    total_plans: u64,
    /// Total plans that fell back to direct motion
    total_failures: u64,
}

impl PlanStats {
    /// Create a new stats tracker
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(64),
            max_samples: 64,
            avg_plan_time_ms: 0.0,
            max_plan_time_ms: 0.0,
            avg_expansions: 0.0,
            success_rate: 0.0,
            total_plans: 0,
            total_failures: 0,
        }
    }

    /// Record one planning cycle
    pub fn record_plan(&mut self, duration: Duration, expansions: usize, succeeded: bool) {
        self.total_plans += 1;
        if !succeeded {
            self.total_failures += 1;
        }

        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(PlanSample {
            duration,
            expansions,
            succeeded,
        });

        self.update_stats();
    }

    fn update_stats(&mut self) {
        if self.samples.is_empty() {
            return;
        }

        let mut total = Duration::ZERO;
        let mut max = Duration::ZERO;
        let mut expansions = 0usize;
        let mut successes = 0usize;

        for sample in &self.samples {
            total += sample.duration;
            max = max.max(sample.duration);
            expansions += sample.expansions;
            successes += usize::from(sample.succeeded);
        }

        let count = self.samples.len() as f32;
        self.avg_plan_time_ms = total.as_secs_f32() * 1000.0 / count;
        self.max_plan_time_ms = max.as_secs_f32() * 1000.0;
        self.avg_expansions = expansions as f32 / count;
        self.success_rate = successes as f32 / count;
    }

    /// Average planning time in milliseconds
    pub fn avg_plan_time_ms(&self) -> f32 {
        self.avg_plan_time_ms
    }

    /// Maximum planning time in milliseconds
    pub fn max_plan_time_ms(&self) -> f32 {
        self.max_plan_time_ms
    }

    /// Average expansions per search
    pub fn avg_expansions(&self) -> f32 {
        self.avg_expansions
    }

    /// Share of recent searches that found a route, from 0 to 1
    pub fn success_rate(&self) -> f32 {
        self.success_rate
    }

    /// Total plans attempted
    pub fn total_plans(&self) -> u64 {
        self.total_plans
    }

    /// Total plans that failed
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Plans: {} ({} failed) | Time: {:.3}ms (max: {:.3}) | Expansions: {:.1} | Success: {:.0}%",
            self.total_plans,
            self.total_failures,
            self.avg_plan_time_ms,
            self.max_plan_time_ms,
            self.avg_expansions,
            self.success_rate * 100.0
        )
    }
}

impl Default for PlanStats {
    fn default() -> Self {
        Self::new()
    }
}
