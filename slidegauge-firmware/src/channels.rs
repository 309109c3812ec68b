//! Inter-task signals
//!
//! The distance itself travels through the core `Mailbox`; this is only
//! the doorbell that wakes the display task instead of spinning on the
//! freshness flag.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Rung by the sample task after each published distance
///
/// Repeated rings before the display task wakes collapse into one; the
/// display task then takes whatever is newest in the mailbox.
pub static SAMPLE_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
