//! Consumer side: mailbox to display
//!
//! Each cycle reads the pending distance, clears the freshness flag, then
//! formats the value and writes it to the display. The clear happens
//! before the (slow) display write, so a trigger that fires while the
//! display is busy leaves its value fresh for the next cycle.

use core::convert::Infallible;

use crate::config::DisplayConfig;
use crate::convert::Calibration;
use crate::distance::Distance;
use crate::format::format;
use crate::mailbox::Receiver;
use crate::traits::{Cursor, DisplayError, Sampler, TextDisplay, TextDisplayExt};

/// Row used for the splash title
pub const TITLE_ROW: u8 = 0;

/// Row used for the splash greeting
pub const GREETING_ROW: u8 = 1;

/// Background display loop
pub struct Consumer<'a, D> {
    receiver: Receiver<'a>,
    display: D,
    at: Cursor,
    shown: u32,
}

impl<'a, D: TextDisplay> Consumer<'a, D> {
    /// Create a consumer writing distances at `at`
    pub fn new(receiver: Receiver<'a>, display: D, at: Cursor) -> Self {
        Self {
            receiver,
            display,
            at,
            shown: 0,
        }
    }

    /// Run one cycle if a fresh value is waiting
    ///
    /// Returns the distance shown, or `None` when nothing was pending.
    pub fn poll(&mut self) -> Result<Option<Distance>, DisplayError> {
        let Some(value) = self.receiver.peek() else {
            return Ok(None);
        };
        self.receiver.clear();

        show(&mut self.display, self.at, value)?;
        self.shown = self.shown.wrapping_add(1);
        Ok(Some(value))
    }

    /// Spin on the freshness flag forever, showing each new value
    ///
    /// Only returns on a display error.
    pub fn run_blocking(&mut self) -> Result<Infallible, DisplayError> {
        loop {
            let value = self.receiver.wait_blocking();
            show(&mut self.display, self.at, value)?;
            self.shown = self.shown.wrapping_add(1);
        }
    }

    /// Number of values written to the display
    pub fn shown(&self) -> u32 {
        self.shown
    }

    /// Get access to the display
    pub fn display(&self) -> &D {
        &self.display
    }
}

/// Format a distance and write it at `at`
pub fn show<D: TextDisplay + ?Sized>(
    display: &mut D,
    at: Cursor,
    value: Distance,
) -> Result<(), DisplayError> {
    display.write_at(at, &format(value))
}

/// Sample, convert and display in the caller's context
///
/// Used when no periodic trigger is running. There is no change filter:
/// every call with a valid reading writes to the display. Returns `None`
/// without touching the display while the sampler has no reading.
pub fn render_direct<S, D>(
    sampler: &mut S,
    calibration: &Calibration,
    display: &mut D,
    at: Cursor,
) -> Result<Option<Distance>, DisplayError>
where
    S: Sampler + ?Sized,
    D: TextDisplay + ?Sized,
{
    let Some(sample) = sampler.try_sample() else {
        return Ok(None);
    };
    let value = calibration.convert(sample);
    show(display, at, value)?;
    Ok(Some(value))
}

/// Write the title and greeting lines
pub fn show_splash<D: TextDisplay + ?Sized>(
    display: &mut D,
    config: &DisplayConfig,
) -> Result<(), DisplayError> {
    display.write_at(Cursor::new(0, TITLE_ROW), &config.title)?;
    display.write_at(Cursor::new(0, GREETING_ROW), &config.greeting)
}
