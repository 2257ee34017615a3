//! Serial log output for ESP32 firmware
//!
//! The core logs through the `log` facade. Firmware built with the
//! `esp32-log` feature calls [`init`] once at boot to print records over the
//! serial port; other hosts install a logger of their choice.

use log::LevelFilter;

/// Print log records up to `level` over the serial port
pub fn init(level: LevelFilter) {
    esp_println::logger::init_logger(level);
}
