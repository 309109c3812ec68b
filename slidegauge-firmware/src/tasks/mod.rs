//! Embassy tasks
//!
//! The sample task runs at interrupt priority, the display task in thread
//! mode. They share only the core `Mailbox` and the `SAMPLE_READY` signal.

pub mod display;
pub mod sample;

#[cfg(not(feature = "foreground"))]
pub use display::display_task;
#[cfg(feature = "foreground")]
pub use display::foreground_task;
pub use display::{GaugeDisplay, Lcd};
#[cfg(not(feature = "foreground"))]
pub use sample::{sample_task, Trigger};
pub use sample::{PotSampler, RpAdc};
