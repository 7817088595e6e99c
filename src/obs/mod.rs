//! Remote control of the capture tool (OBS) over obs-websocket
//!
//! Only hotkey triggering is used: reset, start and stop are bound to keys
//! in OBS and fired with `TriggerHotkeyByKeySequence`.

pub mod client;
pub mod control;
pub mod messages;

pub use client::ObsClient;
pub use control::{Action, Hotkeys, LoggingControl, RemoteControl};
