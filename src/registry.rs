//! Effect registry
//!
//! Owns every effect instance for the lifetime of the process, assigns ids
//! and remembers which effect is active. Switching effects is the job of
//! [`PluginManager`](crate::manager::PluginManager); the registry only does
//! bookkeeping.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::effect::{Effect, EffectId};

/// A registered effect and its id
pub struct EffectDescriptor {
    id: EffectId,
    effect: Box<dyn Effect>,
}

impl EffectDescriptor {
    pub const fn id(&self) -> EffectId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.effect.name()
    }

    pub fn effect_mut(&mut self) -> &mut dyn Effect {
        self.effect.as_mut()
    }
}

/// All registered effects, in registration order
pub struct EffectRegistry {
    effects: Vec<EffectDescriptor>,
    active: Option<EffectId>,
    /// `None` once every id has been handed out
    next_id: Option<EffectId>,
}

impl EffectRegistry {
    pub const fn new() -> Self {
        Self {
            effects: Vec::new(),
            active: None,
            next_id: Some(EffectId::FIRST),
        }
    }

    /// Take ownership of `effect` and assign it the next id
    ///
    /// Returns `None` and drops the effect once all ids are taken.
    pub fn register(&mut self, effect: Box<dyn Effect>) -> Option<EffectId> {
        let Some(id) = self.next_id else {
            log::warn!("registry: effect ids exhausted, dropping {}", effect.name());
            return None;
        };
        self.next_id = id.next();
        log::debug!("registry: registered {} as {}", effect.name(), id);
        self.effects.push(EffectDescriptor { id, effect });
        Some(id)
    }

    /// Number of registered effects
    pub fn count(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.effects.iter()
    }

    /// Id of the first registered effect
    pub fn first_id(&self) -> Option<EffectId> {
        self.effects.first().map(EffectDescriptor::id)
    }

    pub fn get(&self, id: EffectId) -> Option<&EffectDescriptor> {
        self.effects.iter().find(|descriptor| descriptor.id == id)
    }

    pub fn get_mut(&mut self, id: EffectId) -> Option<&mut EffectDescriptor> {
        self.effects.iter_mut().find(|descriptor| descriptor.id == id)
    }

    /// Find an effect by name
    ///
    /// Names are not required to be unique; the earliest registration wins.
    pub fn find_by_name(&self, name: &str) -> Option<EffectId> {
        self.effects
            .iter()
            .find(|descriptor| descriptor.name() == name)
            .map(EffectDescriptor::id)
    }

    pub const fn active_id(&self) -> Option<EffectId> {
        self.active
    }

    /// Currently active effect
    pub fn active_effect(&self) -> Option<&EffectDescriptor> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_effect_mut(&mut self) -> Option<&mut EffectDescriptor> {
        let id = self.active?;
        self.get_mut(id)
    }

    /// Mark `id` as active, ignored for unknown ids
    pub(crate) fn set_active(&mut self, id: EffectId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub(crate) fn clear_active(&mut self) {
        self.active = None;
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
