//! Time-based effect rotation
//!
//! The scheduler walks an ordered list of `(effect, duration)` entries and
//! asks its [`ScheduleTarget`] to switch effects whenever the current entry's
//! duration has elapsed. It is a plain state machine driven by
//! [`Scheduler::update`] from the control loop; callers pass the current
//! time into every call.
//!
//! Three pieces of state survive a reboot independently: the serialized
//! schedule (stored verbatim as received), the index of the entry being
//! shown (written on every switch) and the active flag (written through a
//! debounce window to spare the flash).

use alloc::string::String;
use alloc::vec::Vec;

use embassy_time::{Duration, Instant};
use serde::Serialize;
use serde_json::Value;

use crate::config::CoreConfig;
use crate::debounce::PersistDebounce;
use crate::effect::EffectId;
use crate::error::ScheduleError;
use crate::storage::{
    self, KEY_SCHEDULE, KEY_SCHEDULE_ACTIVE, KEY_SCHEDULE_INDEX, KeyValueStore, Session,
};

/// Maximum number of schedule entries
pub const MAX_ENTRIES: usize = 256;

/// Longest accepted entry duration in seconds, keeps milliseconds in `u32`
pub const MAX_DURATION_SECS: u64 = 4_294_967;

/// One step of the rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub effect_id: EffectId,
    pub duration_ms: u32,
}

impl ScheduleEntry {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }
}

/// Outcome of loading a serialized schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleLoad {
    /// Entries now in the schedule
    pub loaded: usize,
    /// Entries with missing or mistyped fields
    pub skipped: usize,
    /// Valid entries beyond [`MAX_ENTRIES`]
    pub dropped: usize,
}

/// What the scheduler drives: effect activation plus storage access
pub trait ScheduleTarget {
    type Store: KeyValueStore;

    fn store_mut(&mut self) -> &mut Self::Store;

    /// Activate `id` on behalf of the scheduler
    fn switch_to_scheduled(&mut self, id: EffectId);
}

/// Wire form of a [`ScheduleEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleItem {
    #[serde(rename = "pluginId")]
    pub plugin_id: EffectId,
    /// Duration in seconds
    pub duration: u32,
}

impl From<&ScheduleEntry> for ScheduleItem {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            plugin_id: entry.effect_id,
            duration: entry.duration_ms / 1000,
        }
    }
}

/// Effect rotation state machine
#[derive(Debug, Clone)]
pub struct Scheduler {
    entries: heapless::Vec<ScheduleEntry, MAX_ENTRIES>,
    current_index: usize,
    active: bool,
    last_switch: Instant,
    persist: PersistDebounce,
    namespace: &'static str,
}

impl Scheduler {
    pub const fn new(config: &CoreConfig) -> Self {
        Self {
            entries: heapless::Vec::new(),
            current_index: 0,
            active: false,
            last_switch: Instant::from_ticks(0),
            persist: PersistDebounce::new(config.persist_debounce),
            namespace: config.namespace,
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Returns if the scheduler is cycling effects
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns if a write of the active flag is waiting for its window
    pub const fn has_pending_persist(&self) -> bool {
        self.persist.is_pending()
    }

    /// Append an entry, capping the duration
    pub fn add_entry(&mut self, effect_id: EffectId, duration_secs: u64) -> Result<(), ScheduleError> {
        if self.entries.is_full() {
            log::warn!(
                "scheduler: schedule limit reached ({} entries), skipping effect {}",
                MAX_ENTRIES,
                effect_id
            );
            return Err(ScheduleError::CapacityExceeded);
        }

        let secs = if duration_secs > MAX_DURATION_SECS {
            log::warn!(
                "scheduler: duration {}s too large, capping to {}s",
                duration_secs,
                MAX_DURATION_SECS
            );
            MAX_DURATION_SECS
        } else {
            duration_secs
        };
        // The cap keeps `secs * 1000` within u32
        let duration_ms = u32::try_from(secs * 1000).unwrap_or(u32::MAX);

        self.entries
            .push(ScheduleEntry {
                effect_id,
                duration_ms,
            })
            .map_err(|_| ScheduleError::CapacityExceeded)
    }

    /// Stop cycling and rewind, optionally forgetting the schedule
    ///
    /// With `erase_storage` the entries are dropped and the persisted
    /// schedule and active flag are wiped right away.
    pub fn clear<T: ScheduleTarget>(&mut self, erase_storage: bool, now: Instant, target: &mut T) {
        log::info!("scheduler: clearing schedule, erase storage: {}", erase_storage);

        self.current_index = 0;
        self.active = false;

        if !erase_storage {
            self.persist.request(now);
            return;
        }

        self.entries.clear();
        self.persist.cancel();
        let result = Session::open(target.store_mut(), self.namespace, false).and_then(|mut session| {
            session.put_string(KEY_SCHEDULE, "")?;
            session.put_i32(KEY_SCHEDULE_ACTIVE, 0)
        });
        if let Err(err) = result {
            log::warn!("scheduler: failed to erase stored schedule: {}", err);
        }
    }

    /// Start cycling from the first entry
    ///
    /// Returns `false` without changing anything when the schedule is empty.
    pub fn start<T: ScheduleTarget>(&mut self, now: Instant, target: &mut T) -> bool {
        if self.entries.is_empty() {
            log::warn!("scheduler: cannot start an empty schedule");
            return false;
        }

        self.current_index = 0;
        self.last_switch = now;
        self.active = true;
        self.persist.request(now);
        self.switch_to_current(target);
        true
    }

    /// Stop cycling, keeping the schedule and position
    pub fn stop(&mut self, now: Instant) {
        self.active = false;
        self.persist.request(now);
    }

    /// Control loop tick
    ///
    /// Flushes a due persistence request, then switches to the next entry if
    /// the current one has run for its full duration.
    pub fn update<T: ScheduleTarget>(&mut self, now: Instant, target: &mut T) {
        self.flush_if_due(now, target);

        if !self.active || self.entries.is_empty() {
            return;
        }

        let Some(entry) = self.entries.get(self.current_index) else {
            log::warn!("scheduler: index {} out of bounds, resetting", self.current_index);
            self.current_index = 0;
            self.last_switch = now;
            return;
        };

        if now.saturating_duration_since(self.last_switch) >= entry.duration() {
            self.current_index = (self.current_index + 1) % self.entries.len();
            self.last_switch = now;
            self.switch_to_current(target);
        }
    }

    /// Replace the schedule with a serialized one
    ///
    /// The input is a JSON list of `{"pluginId": int, "duration": seconds}`
    /// objects. Entries with missing or mistyped fields are skipped. Any
    /// previous schedule is discarded and cycling stops, even on failure.
    /// Input that is a list is stored verbatim so it can be restored at boot.
    /// Input that is not leaves every stored value untouched.
    pub fn set_from_json<T: ScheduleTarget>(
        &mut self,
        json: &str,
        now: Instant,
        target: &mut T,
    ) -> Result<ScheduleLoad, ScheduleError> {
        let was_active = self.active;
        let items = self.reset_and_parse(json)?;
        if was_active {
            self.persist.request(now);
        }

        if let Err(err) = Session::open(target.store_mut(), self.namespace, false)
            .and_then(|mut session| session.put_string(KEY_SCHEDULE, json))
        {
            log::warn!("scheduler: failed to persist schedule: {}", err);
        }

        self.fill(&items)
    }

    /// Restore persisted state at boot
    ///
    /// When the schedule was cycling, the effect at the stored position is
    /// activated immediately instead of waiting for a duration to elapse.
    pub fn restore<T: ScheduleTarget>(&mut self, now: Instant, target: &mut T) {
        let (stored_active, stored_index, json) =
            match Session::open(target.store_mut(), self.namespace, true) {
                Ok(session) => (
                    session.get_i32(KEY_SCHEDULE_ACTIVE, 0),
                    session.get_i32(KEY_SCHEDULE_INDEX, 0),
                    session.get_string(KEY_SCHEDULE),
                ),
                Err(err) => {
                    log::warn!("scheduler: cannot read stored state: {}", err);
                    return;
                }
            };

        let loaded = self.reset_and_parse(&json).and_then(|items| self.fill(&items));
        if let Err(err) = loaded {
            if !json.is_empty() {
                log::warn!("scheduler: stored schedule unusable: {}", err);
            }
        }

        if stored_active != 1 || self.entries.is_empty() {
            return;
        }

        self.current_index = match usize::try_from(stored_index) {
            Ok(index) if index < self.entries.len() => {
                log::info!("scheduler: resuming from index {}/{}", index, self.entries.len());
                index
            }
            _ => {
                log::warn!("scheduler: stored index {} invalid, starting from 0", stored_index);
                0
            }
        };
        self.active = true;
        self.last_switch = now;
        self.switch_to_current(target);
    }

    /// Serialize the current entries in the wire format
    pub fn to_json(&self) -> String {
        let wire: Vec<ScheduleItem> = self.entries.iter().map(ScheduleItem::from).collect();
        serde_json::to_string(&wire).unwrap_or_else(|_| String::from("[]"))
    }

    fn reset_and_parse(&mut self, json: &str) -> Result<Vec<Value>, ScheduleError> {
        self.current_index = 0;
        self.active = false;
        self.entries.clear();

        if json.is_empty() {
            return Err(ScheduleError::Empty);
        }

        match serde_json::from_str::<Value>(json) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => {
                log::warn!("scheduler: schedule is not a list");
                Err(ScheduleError::NotAList)
            }
            Err(err) => {
                log::warn!("scheduler: JSON parsing failed: {}", err);
                Err(ScheduleError::Malformed)
            }
        }
    }

    fn fill(&mut self, items: &[Value]) -> Result<ScheduleLoad, ScheduleError> {
        let mut load = ScheduleLoad::default();
        log::info!("scheduler: parsing schedule, items: {}", items.len());

        for item in items {
            let effect_id = item
                .get("pluginId")
                .and_then(Value::as_i64)
                .and_then(EffectId::from_i64);
            let duration = item.get("duration").and_then(Value::as_u64);
            let (Some(effect_id), Some(duration)) = (effect_id, duration) else {
                load.skipped += 1;
                continue;
            };
            if self.add_entry(effect_id, duration).is_err() {
                load.dropped += 1;
            }
        }

        load.loaded = self.entries.len();
        log::info!("scheduler: total items loaded: {}", load.loaded);
        if load.loaded == 0 {
            return Err(ScheduleError::Empty);
        }
        Ok(load)
    }

    fn flush_if_due<T: ScheduleTarget>(&mut self, now: Instant, target: &mut T) {
        if self.persist.take_due(now) {
            storage::persist_i32(
                target.store_mut(),
                self.namespace,
                KEY_SCHEDULE_ACTIVE,
                i32::from(self.active),
            );
        }
    }

    fn switch_to_current<T: ScheduleTarget>(&mut self, target: &mut T) {
        let Some(entry) = self.entries.get(self.current_index).copied() else {
            log::warn!("scheduler: invalid index {}", self.current_index);
            return;
        };
        log::info!(
            "scheduler: switching to index {}/{}, effect {}",
            self.current_index,
            self.entries.len(),
            entry.effect_id
        );

        storage::persist_i32(
            target.store_mut(),
            self.namespace,
            KEY_SCHEDULE_INDEX,
            i32::try_from(self.current_index).unwrap_or(0),
        );
        target.switch_to_scheduled(entry.effect_id);
    }
}
