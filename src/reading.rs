//! Reading module - Sensor snapshots and per-signal states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SENSOR READING
// ============================================================================

/// One timestamped snapshot of all monitored signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature: f64,
    pub sound: SoundState,
    pub presence: PresenceState,
    pub sleep: SleepState,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// SIGNAL STATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundState {
    Quiet,
    Crying,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceState {
    Present,
    Absent,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepState {
    Awake,
    LightSleep,
    DeepSleep,
    Unknown,
}

impl std::fmt::Display for SoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoundState::Quiet => write!(f, "Quiet"),
            SoundState::Crying => write!(f, "Crying"),
            SoundState::Unknown => write!(f, "Unknown"),
        }
    }
}

impl std::fmt::Display for PresenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceState::Present => write!(f, "Present"),
            PresenceState::Absent => write!(f, "Absent"),
            PresenceState::Unknown => write!(f, "Unknown"),
        }
    }
}

impl std::fmt::Display for SleepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SleepState::Awake => write!(f, "Awake"),
            SleepState::LightSleep => write!(f, "Light sleep"),
            SleepState::DeepSleep => write!(f, "Deep sleep"),
            SleepState::Unknown => write!(f, "Unknown"),
        }
    }
}

// ============================================================================
// SIGNALS
// ============================================================================

/// One independently tracked monitored dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Temperature,
    Sound,
    Presence,
    Sleep,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Temperature => write!(f, "Temperature"),
            Signal::Sound => write!(f, "Sound"),
            Signal::Presence => write!(f, "Presence"),
            Signal::Sleep => write!(f, "Sleep"),
        }
    }
}

/// Per-signal value union used at the history-store seam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalValue {
    Temperature(f64),
    Sound(SoundState),
    Presence(PresenceState),
    Sleep(SleepState),
}

impl SignalValue {
    pub fn signal(&self) -> Signal {
        match self {
            SignalValue::Temperature(_) => Signal::Temperature,
            SignalValue::Sound(_) => Signal::Sound,
            SignalValue::Presence(_) => Signal::Presence,
            SignalValue::Sleep(_) => Signal::Sleep,
        }
    }
}

impl std::fmt::Display for SignalValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalValue::Temperature(t) => write!(f, "{:.1}", t),
            SignalValue::Sound(s) => write!(f, "{}", s),
            SignalValue::Presence(p) => write!(f, "{}", p),
            SignalValue::Sleep(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// SLEEP AND ACTIVITY LOG ENTRIES
// ============================================================================

/// One recorded sleep session from the external history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub start: DateTime<Utc>,
    pub duration_hours: f64,
    pub interruptions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityLevel::Low => write!(f, "Low"),
            ActivityLevel::Medium => write!(f, "Medium"),
            ActivityLevel::High => write!(f, "High"),
        }
    }
}

/// One recorded activity observation from the external history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub level: ActivityLevel,
    pub timestamp: DateTime<Utc>,
}
