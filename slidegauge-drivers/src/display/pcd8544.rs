//! PCD8544 LCD Driver
//!
//! Driver for the 84x48 Nokia 5110 LCD over SPI, with separate data/command
//! and reset lines. Text is rendered into a local frame buffer with the
//! `embedded-graphics` 5x8 font in 6x8 cells (14 chars x 6 rows); only
//! banks touched since the last flush are sent.

use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use slidegauge_core::traits::{DisplayError, TextDisplay};

/// Display dimensions
pub const WIDTH: usize = 84;
pub const HEIGHT: usize = 48;
const BANKS: usize = HEIGHT / 8;

/// Character cell size
const CELL_WIDTH: usize = 6;
const CELL_HEIGHT: usize = 8;

/// Text grid
pub const COLS: u8 = (WIDTH / CELL_WIDTH) as u8;
pub const ROWS: u8 = BANKS as u8;

/// Operating voltage (contrast) used by `new`
pub const DEFAULT_CONTRAST: u8 = 0x31;

/// PCD8544 commands
#[allow(dead_code)]
mod cmd {
    pub const FUNCTION_SET: u8 = 0x20;
    pub const POWER_DOWN: u8 = 0x04;
    pub const VERTICAL: u8 = 0x02;
    pub const EXTENDED: u8 = 0x01;

    // Basic instruction set
    pub const DISPLAY_BLANK: u8 = 0x08;
    pub const DISPLAY_NORMAL: u8 = 0x0C;
    pub const DISPLAY_ALL_ON: u8 = 0x09;
    pub const DISPLAY_INVERSE: u8 = 0x0D;
    pub const SET_Y_ADDR: u8 = 0x40;
    pub const SET_X_ADDR: u8 = 0x80;

    // Extended instruction set
    pub const SET_TEMP_COEFF: u8 = 0x04;
    pub const SET_BIAS: u8 = 0x10;
    pub const SET_VOP: u8 = 0x80;
}

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pcd8544Error<SpiE, PinE> {
    /// SPI transfer failed
    Spi(SpiE),
    /// DC or RST pin could not be driven
    Pin(PinE),
}

impl<SpiE, PinE> From<Pcd8544Error<SpiE, PinE>> for DisplayError {
    fn from(_: Pcd8544Error<SpiE, PinE>) -> Self {
        DisplayError::Communication
    }
}

/// 1 bit per pixel frame buffer, organized as 8-pixel banks
pub struct FrameBuffer {
    banks: [[u8; WIDTH]; BANKS],
    /// Bit per bank changed since the last flush
    dirty: u8,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a blank buffer
    pub const fn new() -> Self {
        Self {
            banks: [[0; WIDTH]; BANKS],
            dirty: 0,
        }
    }

    /// Blank every pixel
    pub fn clear(&mut self) {
        for bank in self.banks.iter_mut() {
            bank.fill(0);
        }
        self.dirty = (1 << BANKS) - 1;
    }

    /// Raw bytes of one bank (bit 0 is the top pixel)
    pub fn bank(&self, index: usize) -> Option<&[u8; WIDTH]> {
        self.banks.get(index)
    }

    /// Read one pixel
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.banks[y / 8][x] & (1 << (y % 8)) != 0
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let byte = &mut self.banks[y / 8][x];
        let mask = 1 << (y % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        self.dirty |= 1 << (y / 8);
    }

    /// Blank one character cell
    fn clear_cell(&mut self, col: u8, row: u8) {
        let x = col as usize * CELL_WIDTH;
        self.banks[row as usize][x..x + CELL_WIDTH].fill(0);
        self.dirty |= 1 << row;
    }

    /// Render one glyph into a cell
    fn draw_char(&mut self, col: u8, row: u8, ch: char) {
        self.clear_cell(col, row);

        let mut utf8 = [0u8; 4];
        let glyph = ch.encode_utf8(&mut utf8);
        let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
        let origin = Point::new(
            (col as usize * CELL_WIDTH) as i32,
            (row as usize * CELL_HEIGHT) as i32,
        );
        Text::with_baseline(glyph, origin, style, Baseline::Top)
            .draw(self)
            .ok();
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if x < WIDTH && y < HEIGHT {
                    self.set_pixel(x, y, color.is_on());
                }
            }
        }
        Ok(())
    }
}

/// PCD8544 LCD driver
pub struct Pcd8544<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
    contrast: u8,
    frame: FrameBuffer,
    col: u8,
    row: u8,
    initialized: bool,
}

impl<SPI, DC, RST, PinE> Pcd8544<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = PinE>,
    RST: OutputPin<Error = PinE>,
{
    /// Create a new PCD8544 driver
    ///
    /// Call [`init`](Self::init) before flushing.
    pub fn new(spi: SPI, dc: DC, rst: RST) -> Self {
        Self {
            spi,
            dc,
            rst,
            contrast: DEFAULT_CONTRAST,
            frame: FrameBuffer::new(),
            col: 0,
            row: 0,
            initialized: false,
        }
    }

    /// Reset and configure the controller, then blank the screen
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Pcd8544Error<SPI::Error, PinE>> {
        self.rst.set_low().map_err(Pcd8544Error::Pin)?;
        delay.delay_us(10);
        self.rst.set_high().map_err(Pcd8544Error::Pin)?;

        self.command(&[
            cmd::FUNCTION_SET | cmd::EXTENDED,
            cmd::SET_VOP | (self.contrast & 0x7F),
            cmd::SET_TEMP_COEFF,
            cmd::SET_BIAS | 0x04, // 1:48
            cmd::FUNCTION_SET,
            cmd::DISPLAY_NORMAL,
        ])?;

        self.initialized = true;
        self.frame.clear();
        self.flush_frame()
    }

    /// Set the operating voltage (0-127)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Pcd8544Error<SPI::Error, PinE>> {
        self.contrast = contrast & 0x7F;
        if !self.initialized {
            return Ok(());
        }
        self.command(&[
            cmd::FUNCTION_SET | cmd::EXTENDED,
            cmd::SET_VOP | self.contrast,
            cmd::FUNCTION_SET,
        ])
    }

    /// Frame buffer, for drawing with `embedded-graphics`
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Send command bytes (DC low)
    fn command(&mut self, bytes: &[u8]) -> Result<(), Pcd8544Error<SPI::Error, PinE>> {
        self.dc.set_low().map_err(Pcd8544Error::Pin)?;
        self.spi.write(bytes).map_err(Pcd8544Error::Spi)
    }

    /// Send display data (DC high)
    fn data(&mut self, bytes: &[u8]) -> Result<(), Pcd8544Error<SPI::Error, PinE>> {
        self.dc.set_high().map_err(Pcd8544Error::Pin)?;
        self.spi.write(bytes).map_err(Pcd8544Error::Spi)
    }

    /// Send every dirty bank
    fn flush_frame(&mut self) -> Result<(), Pcd8544Error<SPI::Error, PinE>> {
        for bank in 0..BANKS {
            if self.frame.dirty & (1 << bank) == 0 {
                continue;
            }
            self.command(&[cmd::SET_Y_ADDR | bank as u8, cmd::SET_X_ADDR])?;
            let row = self.frame.banks[bank];
            self.data(&row)?;
            self.frame.dirty &= !(1 << bank);
        }
        Ok(())
    }
}

impl<SPI, DC, RST, PinE> TextDisplay for Pcd8544<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = PinE>,
    RST: OutputPin<Error = PinE>,
{
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= COLS || row >= ROWS {
            return Err(DisplayError::InvalidPosition);
        }
        self.col = col;
        self.row = row;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for ch in text.chars() {
            if self.col >= COLS {
                break;
            }
            let ch = if ch.is_ascii() && !ch.is_ascii_control() {
                ch
            } else {
                '?'
            };
            self.frame.draw_char(self.col, self.row, ch);
            self.col += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        self.flush_frame().map_err(DisplayError::from)
    }
}
