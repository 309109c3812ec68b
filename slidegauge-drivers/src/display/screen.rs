//! Character screen buffer
//!
//! An in-memory text grid that implements `TextDisplay`. Used as the
//! display for headless runs; the firmware logs its contents whenever a
//! flush follows a change.

use slidegauge_core::config::{TEXT_COLS, TEXT_ROWS};
use slidegauge_core::traits::{Cursor, DisplayError, TextDisplay};

/// Number of character rows
pub const SCREEN_ROWS: usize = TEXT_ROWS as usize;

/// Number of character columns
pub const SCREEN_COLS: usize = TEXT_COLS as usize;

/// Text-mode screen buffer
#[derive(Clone)]
pub struct Screen {
    /// One ASCII byte per cell, blank is a space
    cells: [[u8; SCREEN_COLS]; SCREEN_ROWS],
    col: u8,
    row: u8,
    /// Rows changed since the last `mark_clean`
    dirty: u8,
    flushes: u32,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new blank screen
    pub const fn new() -> Self {
        Self {
            cells: [[b' '; SCREEN_COLS]; SCREEN_ROWS],
            col: 0,
            row: 0,
            dirty: (1 << SCREEN_ROWS) - 1,
            flushes: 0,
        }
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for row in self.cells.iter_mut() {
            row.fill(b' ');
        }
        self.col = 0;
        self.row = 0;
        self.dirty = (1 << SCREEN_ROWS) - 1;
    }

    /// Get the content of a specific row, trailing blanks included
    pub fn line(&self, row: usize) -> Option<&str> {
        let cells = self.cells.get(row)?;
        core::str::from_utf8(cells).ok()
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        (0..SCREEN_ROWS).filter_map(|row| self.line(row))
    }

    /// Current cursor position
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.col, self.row)
    }

    /// Check if any row changed since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Mark screen as clean (after logging it)
    pub fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    /// Number of `flush` calls received
    pub fn flushes(&self) -> u32 {
        self.flushes
    }
}

impl TextDisplay for Screen {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col as usize >= SCREEN_COLS || row as usize >= SCREEN_ROWS {
            return Err(DisplayError::InvalidPosition);
        }
        self.col = col;
        self.row = row;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        let row = &mut self.cells[self.row as usize];
        for ch in text.chars() {
            let col = self.col as usize;
            if col >= SCREEN_COLS {
                break;
            }
            row[col] = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                b'?'
            };
            self.col += 1;
        }
        self.dirty |= 1 << self.row;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes = self.flushes.wrapping_add(1);
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                defmt::write!(f, " | ");
            }
            defmt::write!(f, "{=str}", line);
        }
        defmt::write!(f, "]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidegauge_core::consumer::{show, show_splash};
    use slidegauge_core::config::DisplayConfig;
    use slidegauge_core::traits::TextDisplayExt;
    use slidegauge_core::Distance;

    #[test]
    fn test_new_screen_is_blank() {
        let screen = Screen::new();
        assert_eq!(screen.lines().count(), SCREEN_ROWS);
        assert!(screen.lines().all(|l| l == "              "));
        assert!(screen.is_dirty());
    }

    #[test]
    fn test_write_at_position() {
        let mut screen = Screen::new();
        screen.write_at(Cursor::new(3, 2), "abc").unwrap();
        assert_eq!(screen.line(2), Some("   abc        "));
        assert_eq!(screen.cursor(), Cursor::new(6, 2));
        assert_eq!(screen.flushes(), 1);
    }

    #[test]
    fn test_overwrite_keeps_rest_of_row() {
        let mut screen = Screen::new();
        screen.write_at(Cursor::new(0, 0), "Slidegauge").unwrap();
        screen.write_at(Cursor::new(0, 0), "Hi").unwrap();
        assert_eq!(screen.line(0), Some("Hiidegauge    "));
    }

    #[test]
    fn test_truncates_and_replaces_non_ascii() {
        let mut screen = Screen::new();
        screen.write_at(Cursor::new(10, 1), "µm\tlong").unwrap();
        assert_eq!(screen.line(1), Some("          ?m?l"));
    }

    #[test]
    fn test_invalid_cursor() {
        let mut screen = Screen::new();
        assert_eq!(screen.set_cursor(14, 0), Err(DisplayError::InvalidPosition));
        assert_eq!(screen.set_cursor(0, 6), Err(DisplayError::InvalidPosition));
    }

    #[test]
    fn test_gauge_layout() {
        let mut screen = Screen::new();
        show_splash(&mut screen, &DisplayConfig::default()).unwrap();
        show(&mut screen, Cursor::new(0, 2), Distance::from_thousandths(2210)).unwrap();

        assert_eq!(screen.line(0), Some("Slidegauge    "));
        assert_eq!(screen.line(1), Some("Hello         "));
        assert_eq!(screen.line(2), Some("2.210 cm      "));
    }

    #[test]
    fn test_write_marks_dirty() {
        let mut screen = Screen::new();
        screen.mark_clean();
        assert!(!screen.is_dirty());

        screen.set_cursor(0, 3).unwrap();
        screen.write_str("").unwrap();
        assert!(screen.is_dirty());
    }

    #[test]
    fn test_clear() {
        let mut screen = Screen::new();
        screen.write_at(Cursor::new(5, 5), "z").unwrap();
        screen.mark_clean();
        screen.clear();
        assert!(screen.is_dirty());
        assert_eq!(screen.line(5), Some("              "));
        assert_eq!(screen.cursor(), Cursor::default());
    }
}
