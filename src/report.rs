//! Snapshot of the core state for control surfaces

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;

use crate::effect::EffectId;
use crate::registry::EffectRegistry;
use crate::scheduler::{ScheduleItem, Scheduler};
use crate::status::SystemStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectInfo {
    pub id: EffectId,
    pub name: String,
}

/// Current effect, registered effects and schedule position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    pub status: SystemStatus,
    pub active_effect: Option<EffectInfo>,
    pub effects: Vec<EffectInfo>,
    pub schedule: Vec<ScheduleItem>,
    pub schedule_active: bool,
    pub schedule_index: usize,
}

impl StateReport {
    pub fn capture(status: SystemStatus, registry: &EffectRegistry, scheduler: &Scheduler) -> Self {
        let info = |id: EffectId, name: &str| EffectInfo {
            id,
            name: String::from(name),
        };
        Self {
            status,
            active_effect: registry
                .active_effect()
                .map(|descriptor| info(descriptor.id(), descriptor.name())),
            effects: registry
                .iter()
                .map(|descriptor| info(descriptor.id(), descriptor.name()))
                .collect(),
            schedule: scheduler.entries().iter().map(ScheduleItem::from).collect(),
            schedule_active: scheduler.is_active(),
            schedule_index: scheduler.current_index(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
