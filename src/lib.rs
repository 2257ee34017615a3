#![no_std]

extern crate alloc;

pub mod command;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod effect;
pub mod error;
#[cfg(feature = "esp32-log")]
pub mod logging;
pub mod manager;
pub mod overlay;
pub mod queue;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod screen;
pub mod status;
pub mod storage;

pub use command::{Button, ControlCommand};
pub use config::CoreConfig;
pub use controller::Controller;
pub use effect::{Effect, EffectId};
pub use error::{ScheduleError, StorageError};
pub use manager::{Overlay, PluginManager};
pub use queue::{CommandQueue, CommandReceiver, CommandSender, QueueFull};
pub use registry::{EffectDescriptor, EffectRegistry};
pub use report::StateReport;
pub use scheduler::{ScheduleEntry, ScheduleItem, ScheduleLoad, ScheduleTarget, Scheduler};
pub use screen::FrameBuffer;
pub use status::{StatusFlag, StatusGuard, SystemStatus};
pub use storage::{KeyValueStore, MemoryStore, NullStore};

pub use embassy_time::{Duration, Instant};

/// Width of the LED matrix in pixels.
pub const MATRIX_WIDTH: u8 = 16;

/// Height of the LED matrix in pixels.
pub const MATRIX_HEIGHT: u8 = 16;

/// Brightness used for overlays and fully lit pixels.
pub const MAX_BRIGHTNESS: u8 = 255;

/// Abstract pixel surface
///
/// Implement this trait to drive the physical matrix (or a simulated one).
/// Effects and the activation overlay draw exclusively through it.
pub trait PixelSurface {
    /// Set a single pixel. Out-of-range coordinates are ignored.
    fn set_pixel(&mut self, x: u8, y: u8, on: bool, brightness: u8);

    /// Turn every pixel off
    fn clear(&mut self);

    /// Current contents, one brightness byte per pixel in row-major order
    fn render_buffer(&self) -> &[u8];
}

/// Cooperative scheduling hook
///
/// Long waits inside the core are split into short slices and each slice is
/// handed to this trait, so the platform can run other tasks and feed its
/// watchdog. Implementations must return after roughly `slice` has elapsed.
pub trait TaskYield {
    /// Give up the CPU for about `slice`
    fn yield_for(&mut self, slice: Duration);
}
