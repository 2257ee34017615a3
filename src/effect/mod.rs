//! Effect capability set
//!
//! Every visual effect implements [`Effect`]. The registry owns effects as
//! boxed trait objects and drives them only through this trait.

mod fill;
mod wave;

use core::fmt;

use embassy_time::Instant;
use serde_json::Value;

pub use fill::FillEffect;
pub use wave::WaveEffect;

use crate::PixelSurface;

/// Identifier assigned to an effect at registration
///
/// Ids start at 1 and grow by one per registration; they are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct EffectId(u16);

impl EffectId {
    /// Id of the first registered effect
    pub const FIRST: Self = Self(1);

    /// Wrap a raw id, `0` is not a valid id
    pub const fn new(raw: u16) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Convert an id read from storage or the wire
    pub fn from_i64(raw: i64) -> Option<Self> {
        u16::try_from(raw).ok().and_then(Self::new)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Following id, `None` after `u16::MAX`
    pub(crate) const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait Effect: Send {
    /// Stable display and lookup name
    fn name(&self) -> &str;

    /// Prepare for rendering, called once per activation
    fn setup(&mut self, surface: &mut dyn PixelSurface);

    /// Render a single frame
    ///
    /// Called once per render iteration while active. Must return within
    /// roughly one frame; effects doing network I/O are responsible for
    /// splitting it up.
    fn run(&mut self, _now: Instant, _surface: &mut dyn PixelSurface) {}

    /// Undo process-wide side effects before deactivation
    fn teardown(&mut self) {}

    /// React to an external command message
    fn handle_event(&mut self, _event: &Value) {}
}
