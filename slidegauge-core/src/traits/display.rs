//! Text display trait
//!
//! The gauge only needs two primitives: move the cursor to a character
//! cell and write a string there. Any character LCD, framebuffer or log
//! sink can implement it; a headless [`NullDisplay`] is provided.

/// Errors that can occur when driving a display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus or pin error talking to the display
    Communication,
    /// Cursor outside the character grid
    InvalidPosition,
    /// Display used before initialization
    NotInitialized,
}

/// Character cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    /// Column in characters (0-based)
    pub col: u8,
    /// Row in characters (0-based)
    pub row: u8,
}

impl Cursor {
    /// Create a cursor position
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }
}

/// Character-cell text output
pub trait TextDisplay {
    /// Move the cursor to a character cell
    ///
    /// - `col`: Column in characters (0-based)
    /// - `row`: Row in characters (0-based)
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Write text at the cursor, advancing it
    ///
    /// Text that runs past the end of the row is truncated.
    fn write_str(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Push buffered content to the hardware
    ///
    /// Unbuffered displays can keep the default no-op.
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

impl<D: TextDisplay + ?Sized> TextDisplay for &mut D {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        (**self).set_cursor(col, row)
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).write_str(text)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        (**self).flush()
    }
}

/// Helper methods for common display operations
pub trait TextDisplayExt: TextDisplay {
    /// Write text at a position and flush
    fn write_at(&mut self, at: Cursor, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(at.col, at.row)?;
        self.write_str(text)?;
        self.flush()
    }
}

// Blanket implementation for all TextDisplay types
impl<T: TextDisplay + ?Sized> TextDisplayExt for T {}

/// Display that discards everything (headless operation)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl TextDisplay for NullDisplay {
    fn set_cursor(&mut self, _col: u8, _row: u8) -> Result<(), DisplayError> {
        Ok(())
    }

    fn write_str(&mut self, _text: &str) -> Result<(), DisplayError> {
        Ok(())
    }
}
