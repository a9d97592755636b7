//! Visual tuning parameters for the scene collaborator.
//!
//! Tuning is rerolled after every completed exchange; values are replaced,
//! never accumulated, and stay within the documented ranges. The random
//! source is injectable so the session controller stays deterministic under
//! test.

use std::time::{SystemTime, UNIX_EPOCH};

pub const BRIGHTNESS_MIN: f64 = 1.5;
pub const BRIGHTNESS_MAX: f64 = 2.5;
pub const SPIN_RATE_MIN: f64 = 0.2;
pub const SPIN_RATE_MAX: f64 = 0.5;

/// Source of uniform draws in `[0, 1)`.
pub trait TuningSource {
    fn unit(&mut self) -> f64;
}

/// Default source: a xorshift generator seeded from the operating system.
pub struct SystemTuningSource {
    state: u64,
}

impl SystemTuningSource {
    pub fn new() -> Self {
        Self {
            state: best_effort_seed(),
        }
    }
}

impl Default for SystemTuningSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TuningSource for SystemTuningSource {
    fn unit(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn best_effort_seed() -> u64 {
    let mut bytes = [0u8; 8];
    if getrandom::fill(&mut bytes).is_ok() {
        let seed = u64::from_le_bytes(bytes);
        if seed != 0 {
            return seed;
        }
    }

    #[cfg(unix)]
    {
        use std::io::Read;

        if let Ok(mut file) = std::fs::File::open("/dev/urandom") {
            if file.read_exact(&mut bytes).is_ok() {
                let seed = u64::from_le_bytes(bytes);
                if seed != 0 {
                    return seed;
                }
            }
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    (nanos ^ ((std::process::id() as u64) << 32)) | 1
}

/// Parameters modulating the scene collaborator: light intensity, rotation
/// speed, accent color, and ornament density.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTuning {
    pub brightness: f64,
    pub spin_rate: f64,
    pub accent_color: String,
    pub density: u32,
}

impl VisualTuning {
    pub fn initial(accent_color: impl Into<String>, density: u32) -> Self {
        Self {
            brightness: crate::core::constants::INITIAL_BRIGHTNESS,
            spin_rate: crate::core::constants::INITIAL_SPIN_RATE,
            accent_color: accent_color.into(),
            density,
        }
    }

    /// Replace brightness and spin rate with fresh draws. Accent color and
    /// density hold their configured values.
    pub fn reroll(&mut self, source: &mut dyn TuningSource) {
        self.brightness = BRIGHTNESS_MIN + source.unit() * (BRIGHTNESS_MAX - BRIGHTNESS_MIN);
        self.spin_rate = SPIN_RATE_MIN + source.unit() * (SPIN_RATE_MAX - SPIN_RATE_MIN);
    }
}

impl Default for VisualTuning {
    fn default() -> Self {
        Self::initial(
            crate::core::constants::DEFAULT_ACCENT_COLOR,
            crate::core::constants::DEFAULT_ORNAMENT_DENSITY,
        )
    }
}
