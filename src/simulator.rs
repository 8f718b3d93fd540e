//! Simulator module - synthetic crib sensor for demos and tests

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::MonitorResult;
use crate::poll::ReadingSource;
use crate::reading::{PresenceState, Reading, SleepState, SoundState};

// ============================================================================
// CRIB SIMULATOR - Simulates periodic crib sensor snapshots
// ============================================================================

struct SimState {
    rng: StdRng,
    base_temp: f64,
    noise_amplitude: f64,
    crying_probability: f64,
    absence_probability: f64,
}

pub struct CribSimulator {
    state: Mutex<SimState>,
}

impl CribSimulator {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Mutex::new(SimState {
                rng: StdRng::seed_from_u64(seed),
                base_temp: 36.5,
                noise_amplitude: 0.3,
                crying_probability: 0.08,
                absence_probability: 0.02,
            }),
        }
    }

    /// Shift the temperature baseline, e.g. to simulate a fever onset.
    pub fn inject_fever(&self, delta: f64) {
        self.state.lock().base_temp += delta;
    }

    pub fn generate(&self) -> Reading {
        let mut state = self.state.lock();
        let noise_amplitude = state.noise_amplitude;
        let crying_probability = state.crying_probability;
        let absence_probability = state.absence_probability;
        let noise = state
            .rng
            .gen_range(-noise_amplitude..noise_amplitude);
        let temperature = state.base_temp + noise;

        let crying = state.rng.gen_bool(crying_probability);
        let absent = state.rng.gen_bool(absence_probability);
        let sleep = if crying {
            SleepState::Awake
        } else if state.rng.gen_bool(0.6) {
            SleepState::DeepSleep
        } else {
            SleepState::LightSleep
        };

        Reading {
            temperature,
            sound: if crying {
                SoundState::Crying
            } else {
                SoundState::Quiet
            },
            presence: if absent {
                PresenceState::Absent
            } else {
                PresenceState::Present
            },
            sleep,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl ReadingSource for CribSimulator {
    async fn current(&self) -> MonitorResult<Reading> {
        Ok(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_stay_near_baseline() {
        let sim = CribSimulator::new(42);
        for _ in 0..100 {
            let reading = sim.generate();
            assert!(reading.temperature > 36.0 && reading.temperature < 37.0);
        }
    }

    #[test]
    fn fever_injection_shifts_baseline() {
        let sim = CribSimulator::new(1);
        let before = sim.generate().temperature;
        sim.inject_fever(2.0);
        let after = sim.generate().temperature;
        assert!(after - before > 1.0);
    }
}
