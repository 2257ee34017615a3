//! Control context orchestrator
//!
//! The [`Controller`] owns the plugin manager and the scheduler and is the
//! single entry point for everything that changes the active effect. Because
//! every activation goes through `&mut self`, one activation always runs to
//! completion before the next can start.
//!
//! Platforms with a separate render task share the controller behind a lock
//! of their choice and call [`Controller::render`] from that task; the
//! [`StatusFlag`](crate::status::StatusFlag) additionally blocks rendering
//! while bulk operations (updates, binary streams) own the display.

use alloc::boxed::Box;

use embassy_time::Instant;

use crate::command::{Button, ControlCommand};
use crate::effect::{Effect, EffectId};
use crate::error::ScheduleError;
use crate::manager::{Overlay, PluginManager};
use crate::queue::CommandReceiver;
use crate::report::StateReport;
use crate::scheduler::{ScheduleLoad, Scheduler};
use crate::status::SystemStatus;
use crate::storage::KeyValueStore;
use crate::{PixelSurface, TaskYield};

pub struct Controller<'a, S, D, Y, const QUEUE: usize> {
    manager: PluginManager<'a, S, D, Y>,
    scheduler: Scheduler,
    commands: CommandReceiver<'a, QUEUE>,
}

impl<'a, S, D, Y, const QUEUE: usize> Controller<'a, S, D, Y, QUEUE>
where
    S: KeyValueStore,
    D: PixelSurface,
    Y: TaskYield,
{
    pub fn new(manager: PluginManager<'a, S, D, Y>, commands: CommandReceiver<'a, QUEUE>) -> Self {
        let scheduler = Scheduler::new(manager.config());
        Self {
            manager,
            scheduler,
            commands,
        }
    }

    pub fn register(&mut self, effect: Box<dyn Effect>) -> Option<EffectId> {
        self.manager.register(effect)
    }

    pub fn manager(&self) -> &PluginManager<'a, S, D, Y> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut PluginManager<'a, S, D, Y> {
        &mut self.manager
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Restore the persisted effect, then the persisted schedule
    ///
    /// Call once after every effect is registered.
    pub fn boot(&mut self, now: Instant) {
        self.manager.init();
        self.scheduler.restore(now, &mut self.manager);
    }

    /// One control loop iteration
    ///
    /// Executes queued commands, then advances the scheduler unless the
    /// system is busy.
    pub fn tick(&mut self, now: Instant) {
        while let Some(command) = self.commands.take() {
            if let Err(err) = self.execute(command, now) {
                log::warn!("controller: command failed: {}", err);
            }
        }

        if self.manager.status().is(SystemStatus::None) {
            self.scheduler.update(now, &mut self.manager);
        }
    }

    /// Render context entry point
    pub fn render(&mut self, now: Instant) -> bool {
        self.manager.run_active(now)
    }

    pub fn report(&self) -> StateReport {
        StateReport::capture(
            self.manager.status().load(),
            self.manager.registry(),
            &self.scheduler,
        )
    }

    /// Apply a single command immediately
    pub fn execute(&mut self, command: ControlCommand, now: Instant) -> Result<(), ScheduleError> {
        let overlay = Overlay::unless_cycling(self.scheduler.is_active());
        match command {
            ControlCommand::ActivateById(id) => self.manager.activate_by_id(id, overlay),
            ControlCommand::ActivateByName(name) => self.manager.activate_by_name(&name, overlay),
            ControlCommand::ActivateNext => self.manager.activate_next(overlay),
            ControlCommand::ActivatePersisted => self.manager.activate_persisted(overlay),
            ControlCommand::StartSchedule => {
                if !self.scheduler.start(now, &mut self.manager) {
                    return Err(ScheduleError::Empty);
                }
            }
            ControlCommand::StopSchedule => self.scheduler.stop(now),
            ControlCommand::ClearSchedule { erase_storage } => {
                self.scheduler.clear(erase_storage, now, &mut self.manager);
            }
            ControlCommand::SetSchedule(json) => {
                self.set_schedule(&json, now)?;
            }
            ControlCommand::Event(event) => {
                if !self.manager.dispatch_event(&event) {
                    log::warn!("controller: no active effect for event");
                }
            }
            ControlCommand::Button(button) => self.press(button, now),
        }
        Ok(())
    }

    /// Replace the schedule, see [`Scheduler::set_from_json`]
    pub fn set_schedule(&mut self, json: &str, now: Instant) -> Result<ScheduleLoad, ScheduleError> {
        self.scheduler.set_from_json(json, now, &mut self.manager)
    }

    /// Handle a press on the physical button
    ///
    /// Ignored while an activation is in progress.
    pub fn press(&mut self, button: Button, now: Instant) {
        if self.manager.status().is(SystemStatus::Loading) {
            return;
        }
        match button {
            Button::Single => {
                self.scheduler.clear(false, now, &mut self.manager);
                self.manager.activate_next(Overlay::Show);
            }
            Button::Long => self.manager.activate_persisted(Overlay::Show),
        }
    }
}
