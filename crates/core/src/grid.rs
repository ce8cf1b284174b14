//! Pixel grid container: two byte streams stored in a 3-pixel-wide RGB image.
//!
//! The grid has shape (rows, 3, 3): each row is three pixels of three
//! channels, 9 bytes. Row 0 is the header; rows 1.. carry the data.
//!
//! # Header Row
//!
//! ```text
//!            channel 0   channel 1   channel 2
//! pixel 0 |  p.d3      | p.d2      | p.d1      |
//! pixel 1 |  p.d0      | SIGNATURE | t.d3      |
//! pixel 2 |  t.d2      | t.d1      | t.d0      |
//! ```
//!
//! `p` is the payload length, `t` the table length, each written as four
//! base-255 digits, most significant first (`d0 = len % 255`, then divide
//! by 255 and repeat). The radix is 255, not 256. SIGNATURE is never written
//! and must read back as 0.
//!
//! # Data Rows
//!
//! Slots are visited row by row, pixel by pixel, channel by channel. The
//! longer stream is `top` (the payload on a tie), the shorter `bottom`.
//! While both have bytes left, channels 0 and 1 take `top` and channel 2
//! takes `bottom`. Once either runs out, every slot takes from the other.
//! Slots past the end of both streams stay zero.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use log::debug;

use crate::error::{ContainerError, Error, Result};

/// Pixels per grid row.
pub const PIXELS_PER_ROW: usize = 3;

/// Channels per pixel.
pub const CHANNELS: usize = 3;

/// Bytes per grid row.
pub const ROW_BYTES: usize = PIXELS_PER_ROW * CHANNELS;

/// Header digit radix.
const RADIX: u64 = 255;

/// Largest length four header digits can hold: the top digit may use the
/// full byte range, the lower three stay below 255.
pub const MAX_LEN: u64 = RADIX * RADIX * RADIX * RADIX + RADIX * RADIX * RADIX - 1;

/// (pixel, channel) of the payload length digits, most significant first.
const PAYLOAD_LEN_SLOTS: [(usize, usize); 4] = [(0, 0), (0, 1), (0, 2), (1, 0)];

/// (pixel, channel) of the table length digits, most significant first.
const TABLE_LEN_SLOTS: [(usize, usize); 4] = [(1, 2), (2, 0), (2, 1), (2, 2)];

/// (pixel, channel) of the header signature byte.
const SIGNATURE_SLOT: (usize, usize) = (1, 1);

/// Channel reserved for `bottom` while both streams have bytes left.
const BOTTOM_CHANNEL: usize = 2;

/// A (rows, 3, 3) byte grid.
///
/// # Invariants
/// - `data.len() == rows * ROW_BYTES`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    rows: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Allocate a zeroed grid.
    pub fn zeroed(rows: usize) -> Self {
        Self {
            rows,
            data: vec![0; rows * ROW_BYTES],
        }
    }

    /// Wrap raw row-major bytes.
    ///
    /// # Errors
    /// `ContainerError::BadShape` unless `data` is a non-empty multiple of 9 bytes.
    pub fn from_raw(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() || data.len() % ROW_BYTES != 0 {
            return Err(ContainerError::BadShape {
                width: PIXELS_PER_ROW as u32,
                height: (data.len() / ROW_BYTES) as u32,
            }
            .into());
        }
        Ok(Self {
            rows: data.len() / ROW_BYTES,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, row: usize, pixel: usize, channel: usize) -> u8 {
        self.data[offset(row, pixel, channel)]
    }

    pub fn set(&mut self, row: usize, pixel: usize, channel: usize, value: u8) {
        self.data[offset(row, pixel, channel)] = value;
    }

    /// Convert to an RGB image 3 pixels wide and `rows` pixels tall.
    pub fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(PIXELS_PER_ROW as u32, self.rows as u32, self.data.clone()).ok_or_else(
            || {
                ContainerError::BadShape {
                    width: PIXELS_PER_ROW as u32,
                    height: self.rows as u32,
                }
                .into()
            },
        )
    }

    /// Read a grid back from an RGB image.
    ///
    /// # Errors
    /// `ContainerError::BadShape` if the image is not 3 pixels wide or is empty.
    pub fn from_image(image: &RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width as usize != PIXELS_PER_ROW || height == 0 {
            return Err(ContainerError::BadShape { width, height }.into());
        }
        Self::from_raw(image.as_raw().clone())
    }

    /// Save as PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image()?.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Load from any image file the `image` crate can read, converted to RGB8.
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgb8();
        Self::from_image(&image)
    }
}

fn offset(row: usize, pixel: usize, channel: usize) -> usize {
    row * ROW_BYTES + pixel * CHANNELS + channel
}

/// Which stream a data slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Top,
    Bottom,
}

/// Slot-by-slot lane assignment for a `top`/`bottom` pair.
///
/// Encoder and decoder share this walk, so the two sides cannot disagree.
#[derive(Debug, Clone)]
pub struct SlotPlan {
    top_left: usize,
    bottom_left: usize,
    slot: usize,
}

impl SlotPlan {
    pub fn new(top_len: usize, bottom_len: usize) -> Self {
        Self {
            top_left: top_len,
            bottom_left: bottom_len,
            slot: 0,
        }
    }
}

impl Iterator for SlotPlan {
    type Item = Lane;

    fn next(&mut self) -> Option<Lane> {
        let lane = match (self.top_left > 0, self.bottom_left > 0) {
            (true, true) if self.slot % CHANNELS == BOTTOM_CHANNEL => Lane::Bottom,
            (true, _) => Lane::Top,
            (false, true) => Lane::Bottom,
            (false, false) => return None,
        };

        match lane {
            Lane::Top => self.top_left -= 1,
            Lane::Bottom => self.bottom_left -= 1,
        }
        self.slot += 1;
        Some(lane)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.top_left + self.bottom_left;
        (n, Some(n))
    }
}

/// The two byte streams a container carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Padded Huffman payload
    pub payload: Vec<u8>,
    /// Serialized code table
    pub table: Vec<u8>,
}

impl Container {
    pub fn new(payload: Vec<u8>, table: Vec<u8>) -> Self {
        Self { payload, table }
    }

    /// Grid rows needed for streams of these lengths, header included.
    pub fn rows_for(payload_len: usize, table_len: usize) -> usize {
        (payload_len + table_len).div_ceil(ROW_BYTES) + 1
    }

    /// Payload is `top` unless the table is strictly longer.
    fn payload_is_top(payload_len: usize, table_len: usize) -> bool {
        payload_len >= table_len
    }

    /// Lay both streams out in a new grid.
    ///
    /// # Errors
    /// `ContainerError::LengthOverflow` if either length exceeds [`MAX_LEN`].
    pub fn pack(&self) -> Result<PixelGrid> {
        let payload_digits = encode_len(self.payload.len())?;
        let table_digits = encode_len(self.table.len())?;

        let rows = Self::rows_for(self.payload.len(), self.table.len());
        let mut grid = PixelGrid::zeroed(rows);

        for (&(pixel, channel), &digit) in PAYLOAD_LEN_SLOTS.iter().zip(&payload_digits) {
            grid.set(0, pixel, channel, digit);
        }
        for (&(pixel, channel), &digit) in TABLE_LEN_SLOTS.iter().zip(&table_digits) {
            grid.set(0, pixel, channel, digit);
        }

        let (top, bottom) = if Self::payload_is_top(self.payload.len(), self.table.len()) {
            (&self.payload, &self.table)
        } else {
            (&self.table, &self.payload)
        };

        let mut top_bytes = top.iter();
        let mut bottom_bytes = bottom.iter();
        let data = &mut grid.data[ROW_BYTES..];
        for (slot, lane) in SlotPlan::new(top.len(), bottom.len()).enumerate() {
            let source = match lane {
                Lane::Top => top_bytes.next(),
                Lane::Bottom => bottom_bytes.next(),
            };
            // The plan never yields more slots of a lane than that stream has
            if let Some(&byte) = source {
                data[slot] = byte;
            }
        }

        debug!(
            "packed container: payload={} table={} rows={}",
            self.payload.len(),
            self.table.len(),
            rows
        );
        Ok(grid)
    }

    /// Extract both streams from a grid.
    ///
    /// The signature is checked before any other header byte is read.
    ///
    /// # Errors
    /// - `Error::InvalidSignature` if header channel (0,1,1) is nonzero
    /// - `ContainerError::Truncated` if the grid is shorter than its header says
    pub fn unpack(grid: &PixelGrid) -> Result<Self> {
        let (sig_pixel, sig_channel) = SIGNATURE_SLOT;
        let signature = grid.get(0, sig_pixel, sig_channel);
        if signature != 0 {
            return Err(Error::InvalidSignature { found: signature });
        }

        let payload_len = decode_len(read_digits(grid, &PAYLOAD_LEN_SLOTS))?;
        let table_len = decode_len(read_digits(grid, &TABLE_LEN_SLOTS))?;

        let required = payload_len
            .checked_add(table_len)
            .map(|total| total.div_ceil(ROW_BYTES) + 1)
            .ok_or(ContainerError::LengthOverflow {
                len: payload_len,
                max: MAX_LEN,
            })?;
        if grid.rows() < required {
            return Err(ContainerError::Truncated {
                required,
                actual: grid.rows(),
            }
            .into());
        }

        let payload_is_top = Self::payload_is_top(payload_len, table_len);
        let (top_len, bottom_len) = if payload_is_top {
            (payload_len, table_len)
        } else {
            (table_len, payload_len)
        };

        let mut top = Vec::with_capacity(top_len);
        let mut bottom = Vec::with_capacity(bottom_len);
        let data = &grid.as_bytes()[ROW_BYTES..];
        for (slot, lane) in SlotPlan::new(top_len, bottom_len).enumerate() {
            match lane {
                Lane::Top => top.push(data[slot]),
                Lane::Bottom => bottom.push(data[slot]),
            }
        }

        debug!(
            "unpacked container: payload={} table={} rows={}",
            payload_len,
            table_len,
            grid.rows()
        );

        Ok(if payload_is_top {
            Self::new(top, bottom)
        } else {
            Self::new(bottom, top)
        })
    }
}

fn read_digits(grid: &PixelGrid, slots: &[(usize, usize); 4]) -> [u8; 4] {
    slots.map(|(pixel, channel)| grid.get(0, pixel, channel))
}

/// Split a length into four base-255 digits, most significant first.
///
/// # Errors
/// `ContainerError::LengthOverflow` if `len > MAX_LEN`.
pub fn encode_len(len: usize) -> Result<[u8; 4]> {
    let value = len as u64;
    if value > MAX_LEN {
        return Err(ContainerError::LengthOverflow { len, max: MAX_LEN }.into());
    }

    let d0 = value % RADIX;
    let rest = value / RADIX;
    let d1 = rest % RADIX;
    let rest = rest / RADIX;
    let d2 = rest % RADIX;
    let d3 = rest / RADIX;

    Ok([d3 as u8, d2 as u8, d1 as u8, d0 as u8])
}

/// Inverse of [`encode_len`].
pub fn decode_len(digits: [u8; 4]) -> Result<usize> {
    let value = digits
        .iter()
        .fold(0u64, |acc, &digit| acc * RADIX + digit as u64);
    usize::try_from(value).map_err(|_| {
        ContainerError::LengthOverflow {
            len: usize::MAX,
            max: MAX_LEN,
        }
        .into()
    })
}
