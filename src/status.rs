//! Process-wide status flag shared by the render and control contexts.
//!
//! The control context writes the flag, the render context reads it every
//! frame. Stores use `Release` and loads use `Acquire`, so everything the
//! control context did before publishing `None` is visible to a render
//! context that observes `None`.

use core::sync::atomic::{AtomicU8, Ordering};

const STATUS_NONE: u8 = 0;
const STATUS_LOADING: u8 = 1;
const STATUS_UPDATE: u8 = 2;
const STATUS_WSBINARY: u8 = 3;

/// What the system is currently busy with
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum SystemStatus {
    /// Idle, the active effect may render
    None = STATUS_NONE,
    /// An activation is in progress
    Loading = STATUS_LOADING,
    /// A firmware update is being written
    Update = STATUS_UPDATE,
    /// A binary frame stream owns the display
    #[serde(rename = "WSBINARY")]
    WsBinary = STATUS_WSBINARY,
}

impl SystemStatus {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            STATUS_NONE => Self::None,
            STATUS_LOADING => Self::Loading,
            STATUS_UPDATE => Self::Update,
            STATUS_WSBINARY => Self::WsBinary,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Loading => "LOADING",
            Self::Update => "UPDATE",
            Self::WsBinary => "WSBINARY",
        }
    }

    /// Returns if the render context may call into the active effect
    pub const fn allows_render(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Atomic holder for [`SystemStatus`]
///
/// Usually placed in a `static` and shared by reference between contexts.
#[derive(Debug)]
pub struct StatusFlag {
    raw: AtomicU8,
}

impl StatusFlag {
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(STATUS_NONE),
        }
    }

    /// Read the current status
    pub fn load(&self) -> SystemStatus {
        // Only this type writes the atomic, so every stored value is valid
        SystemStatus::from_raw(self.raw.load(Ordering::Acquire)).unwrap_or(SystemStatus::None)
    }

    /// Publish a new status
    pub fn store(&self, status: SystemStatus) {
        self.raw.store(status as u8, Ordering::Release);
    }

    pub fn is(&self, status: SystemStatus) -> bool {
        self.load() == status
    }

    /// Mark an activation as started
    ///
    /// The returned guard restores [`SystemStatus::None`] when dropped.
    pub fn begin_loading(&self) -> StatusGuard<'_> {
        self.store(SystemStatus::Loading);
        StatusGuard { flag: self }
    }
}

impl Default for StatusFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the status at [`SystemStatus::Loading`] while alive
#[must_use = "dropping the guard immediately unblocks rendering"]
pub struct StatusGuard<'a> {
    flag: &'a StatusFlag,
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(SystemStatus::None);
    }
}
