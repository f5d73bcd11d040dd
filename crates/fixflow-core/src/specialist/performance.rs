//! Lifetime fix-attempt statistics per specialist.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::specialist::ExpertiseLevel;

/// Raw counters. `successes <= attempts` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub attempts: u64,
    pub successes: u64,
    pub confidence_sum: f64,
    pub last_recorded_at: Option<DateTime<Utc>>,
}

impl PerformanceRecord {
    /// `successes / attempts`, or 0 before the first attempt.
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }

    /// Mean recorded confidence, or 0 before the first attempt.
    pub fn average_confidence(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.confidence_sum / self.attempts as f64
        }
    }
}

/// Mutex-guarded record; concurrent `record` calls are serialized.
#[derive(Debug, Default)]
pub struct SpecialistPerformance {
    inner: Mutex<PerformanceRecord>,
}

impl SpecialistPerformance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed fix attempt.
    ///
    /// `confidence` is clamped to `[0, 1]`; NaN counts as 0.
    pub fn record(&self, success: bool, confidence: f64) {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        let mut record = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        record.attempts += 1;
        if success {
            record.successes += 1;
        }
        record.confidence_sum += confidence;
        record.last_recorded_at = Some(Utc::now());
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> PerformanceRecord {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Stats query result for one specialist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistStats {
    pub name: String,
    pub expertise_level: ExpertiseLevel,
    pub attempts: u64,
    pub successes: u64,
    pub success_rate: f64,
    pub average_confidence: f64,
    pub last_recorded_at: Option<DateTime<Utc>>,
}

impl SpecialistStats {
    pub fn from_record(name: &str, expertise_level: ExpertiseLevel, record: &PerformanceRecord) -> Self {
        Self {
            name: name.to_string(),
            expertise_level,
            attempts: record.attempts,
            successes: record.successes,
            success_rate: record.success_rate(),
            average_confidence: record.average_confidence(),
            last_recorded_at: record.last_recorded_at,
        }
    }
}
