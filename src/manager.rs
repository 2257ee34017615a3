//! Activation protocol
//!
//! [`PluginManager`] owns the registry together with the display, the
//! storage and the cooperative yield hook, and performs every effect switch
//! through the same sequence:
//!
//! 1. publish [`SystemStatus::Loading`](crate::status::SystemStatus) so the
//!    render context stops calling into effects
//! 2. tear down the active effect and forget it
//! 3. optionally show the new effect's id for a moment
//! 4. mark the target active and set it up
//! 5. persist the new id (best effort)
//! 6. publish `None` again
//!
//! A missing target never panics: the manager logs it and is left without an
//! active effect, which callers may repair by falling back to the first one.

use alloc::boxed::Box;

use embassy_time::Instant;
use serde_json::Value;

use crate::config::CoreConfig;
use crate::effect::{Effect, EffectId};
use crate::registry::{EffectDescriptor, EffectRegistry};
use crate::scheduler::ScheduleTarget;
use crate::status::StatusFlag;
use crate::storage::{self, KEY_CURRENT_PLUGIN, KeyValueStore, Session};
use crate::{PixelSurface, TaskYield};

/// Whether an activation shows the effect id overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Show,
    Skip,
}

impl Overlay {
    /// Skip the overlay while the scheduler rotates effects
    pub const fn unless_cycling(schedule_active: bool) -> Self {
        if schedule_active { Self::Skip } else { Self::Show }
    }
}

/// Owns all effects and switches between them
pub struct PluginManager<'a, S, D, Y> {
    registry: EffectRegistry,
    status: &'a StatusFlag,
    store: S,
    display: D,
    pacer: Y,
    config: CoreConfig,
}

impl<'a, S, D, Y> PluginManager<'a, S, D, Y>
where
    S: KeyValueStore,
    D: PixelSurface,
    Y: TaskYield,
{
    pub fn new(status: &'a StatusFlag, store: S, display: D, pacer: Y, config: CoreConfig) -> Self {
        Self {
            registry: EffectRegistry::new(),
            status,
            store,
            display,
            pacer,
            config,
        }
    }

    /// Register an effect, returning its id
    pub fn register(&mut self, effect: Box<dyn Effect>) -> Option<EffectId> {
        self.registry.register(effect)
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn active_effect(&self) -> Option<&EffectDescriptor> {
        self.registry.active_effect()
    }

    pub fn count(&self) -> usize {
        self.registry.count()
    }

    pub fn status(&self) -> &'a StatusFlag {
        self.status
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Boot-time entry point, restores the persisted effect
    pub fn init(&mut self) {
        self.display.clear();
        log::info!("manager: initializing with {} effects", self.registry.count());

        self.activate_persisted(Overlay::Show);

        if self.registry.active_id().is_none() {
            log::error!("manager: CRITICAL: no active effect after initialization");
        }
    }

    /// Activate the first effect registered under `name`
    ///
    /// The previous effect is torn down before the lookup, so an unknown name
    /// leaves no effect active.
    pub fn activate_by_name(&mut self, name: &str, overlay: Overlay) {
        log::info!("manager: activating effect by name: {}", name);
        let target = self.registry.find_by_name(name);
        if target.is_none() {
            log::warn!("manager: effect named {} not found", name);
        }
        self.switch_to(target, overlay);
    }

    /// Activate the effect with `id`
    ///
    /// Unknown ids leave the current effect running. If nothing is active
    /// either, the first registered effect is activated instead.
    pub fn activate_by_id(&mut self, id: EffectId, overlay: Overlay) {
        if let Some(descriptor) = self.registry.get(id) {
            log::info!("manager: activating effect {} ({})", id, descriptor.name());
            self.switch_to(Some(id), overlay);
            return;
        }

        log::warn!("manager: effect with id {} not found", id);
        if self.registry.active_id().is_none() {
            if let Some(first) = self.registry.first_id() {
                log::info!("manager: activating first effect as fallback");
                self.switch_to(Some(first), overlay);
            }
        }
    }

    /// Activate the effect after the current one, wrapping to the first
    pub fn activate_next(&mut self, overlay: Overlay) {
        let next = match self.registry.active_id() {
            Some(current) if usize::from(current.get()) < self.registry.count() => {
                current.next().unwrap_or(EffectId::FIRST)
            }
            _ => EffectId::FIRST,
        };
        self.activate_by_id(next, overlay);
    }

    /// Activate the effect stored by the last successful activation
    pub fn activate_persisted(&mut self, overlay: Overlay) {
        let Some(first) = self.registry.first_id() else {
            log::warn!("manager: no effects registered");
            return;
        };

        let id = self.persisted_id().unwrap_or(first);
        self.activate_by_id(id, overlay);

        if self.registry.active_id().is_none() {
            log::warn!("manager: failed to activate persisted effect, activating first effect");
            self.activate_by_id(first, overlay);
        }
    }

    /// Id saved by the last activation
    ///
    /// Defaults to the first registered effect when nothing valid is stored.
    /// Returns `None` only when no effect is registered.
    pub fn persisted_id(&mut self) -> Option<EffectId> {
        let first = self.registry.first_id()?;
        let raw = match Session::open(&mut self.store, self.config.namespace, true) {
            Ok(session) => session.get_i32(KEY_CURRENT_PLUGIN, i32::from(first.get())),
            Err(err) => {
                log::warn!("manager: cannot read persisted effect: {}", err);
                return Some(first);
            }
        };
        Some(EffectId::from_i64(i64::from(raw)).unwrap_or(first))
    }

    /// Render one frame of the active effect
    ///
    /// Does nothing while the status flag blocks rendering. Returns if the
    /// active effect was run.
    pub fn run_active(&mut self, now: Instant) -> bool {
        if !self.status.load().allows_render() {
            return false;
        }
        let Some(active) = self.registry.active_effect_mut() else {
            return false;
        };
        active.effect_mut().run(now, &mut self.display);
        true
    }

    /// Forward an external command message to the active effect
    pub fn dispatch_event(&mut self, event: &Value) -> bool {
        let Some(active) = self.registry.active_effect_mut() else {
            return false;
        };
        active.effect_mut().handle_event(event);
        true
    }

    fn switch_to(&mut self, target: Option<EffectId>, overlay: Overlay) {
        let status = self.status;
        let _loading = status.begin_loading();

        if let Some(previous) = self.registry.active_effect_mut() {
            log::info!("manager: tearing down {}", previous.name());
            previous.effect_mut().teardown();
        }
        self.registry.clear_active();

        let Some(id) = target.filter(|&id| self.registry.set_active(id)) else {
            return;
        };

        if overlay == Overlay::Show {
            crate::overlay::show_effect_id(&mut self.display, &mut self.pacer, &self.config, id);
        }

        if let Some(descriptor) = self.registry.get_mut(id) {
            log::info!("manager: setting up {}", descriptor.name());
            descriptor.effect_mut().setup(&mut self.display);
        }

        storage::persist_i32(
            &mut self.store,
            self.config.namespace,
            KEY_CURRENT_PLUGIN,
            i32::from(id.get()),
        );
    }
}

impl<S, D, Y> ScheduleTarget for PluginManager<'_, S, D, Y>
where
    S: KeyValueStore,
    D: PixelSurface,
    Y: TaskYield,
{
    type Store = S;

    fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn switch_to_scheduled(&mut self, id: EffectId) {
        self.activate_by_id(id, Overlay::Skip);
    }
}
