//! Control surface commands
//!
//! Transports (HTTP, WebSocket, the physical button) translate requests into
//! [`ControlCommand`]s and post them to a
//! [`CommandQueue`](crate::queue::CommandQueue). The control loop
//! drains the queue and maps each command onto activation and scheduler
//! calls, see [`Controller`](crate::controller::Controller).

use alloc::string::String;

use serde_json::Value;

use crate::effect::EffectId;

/// Request coming from a control surface
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Switch to the effect with this id
    ActivateById(EffectId),
    /// Switch to the first effect with this name
    ActivateByName(String),
    /// Switch to the effect after the active one
    ActivateNext,
    /// Switch back to the last persisted effect
    ActivatePersisted,
    /// Start cycling the schedule from its first entry
    StartSchedule,
    /// Stop cycling, keeping the schedule
    StopSchedule,
    /// Stop cycling and rewind, optionally erasing the stored schedule
    ClearSchedule { erase_storage: bool },
    /// Replace the schedule with a serialized one
    SetSchedule(String),
    /// Forward a message to the active effect
    Event(Value),
    /// A press on the physical button
    Button(Button),
}

/// Press patterns recognized on the physical button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Short press: stop the schedule and show the next effect
    Single,
    /// Held press: return to the persisted effect
    Long,
}

impl ControlCommand {
    /// Parse a WebSocket style request
    ///
    /// Understands `{"event": "plugin", "plugin": id}`,
    /// `{"event": "plugin", "name": "..."}`, `{"event": "schedule", ...}`
    /// with `"action"` of `start`, `stop`, `clear` or `set` (the latter with a
    /// `"schedule"` list) and forwards every other object to the active
    /// effect.
    pub fn from_message(message: Value) -> Option<Self> {
        let event = message.get("event").and_then(Value::as_str)?;
        match event {
            "plugin" => {
                if let Some(id) = message.get("plugin").and_then(Value::as_i64) {
                    return EffectId::from_i64(id).map(Self::ActivateById);
                }
                let name = message.get("name").and_then(Value::as_str)?;
                Some(Self::ActivateByName(String::from(name)))
            }
            "schedule" => match message.get("action").and_then(Value::as_str)? {
                "start" => Some(Self::StartSchedule),
                "stop" => Some(Self::StopSchedule),
                "clear" => Some(Self::ClearSchedule {
                    erase_storage: message.get("erase").and_then(Value::as_bool).unwrap_or(true),
                }),
                "set" => {
                    let schedule = message.get("schedule")?;
                    Some(Self::SetSchedule(serde_json::to_string(schedule).ok()?))
                }
                _ => None,
            },
            "next" => Some(Self::ActivateNext),
            "persisted" => Some(Self::ActivatePersisted),
            _ => Some(Self::Event(message)),
        }
    }
}
