//! Pixel formats and per-pixel conversion.
//!
//! All conversions go through premultiplied RGBA (`[r, g, b, a]`). Formats
//! without alpha read as opaque and drop alpha on write, which for
//! premultiplied input is the same as compositing onto black.

/// Native window format code for 32-bit RGBA.
pub const WINDOW_FORMAT_RGBA_8888: i32 = 1;
/// Native window format code for 32-bit RGB with an ignored alpha byte.
pub const WINDOW_FORMAT_RGBX_8888: i32 = 2;
/// Native window format code for 16-bit RGB565.
pub const WINDOW_FORMAT_RGB_565: i32 = 4;

/// Layout of a pixel in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 16-bit little-endian `rrrrrggggggbbbbb`.
    Rgb565,
    /// Bytes `R, G, B, A`, color premultiplied by alpha.
    Rgba8888Premultiplied,
    /// A native-endian `0xAARRGGBB` word, premultiplied. Stored little-endian,
    /// so the bytes are `B, G, R, A`.
    Argb32Premultiplied,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Rgba8888Premultiplied | PixelFormat::Argb32Premultiplied => 4,
        }
    }

    /// Bits per pixel.
    pub fn depth(&self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }

    pub fn has_alpha(&self) -> bool {
        !matches!(self, PixelFormat::Rgb565)
    }

    /// Maps a locked buffer's format code to a layout. Only RGB565 is 16-bit;
    /// every other code, known or not, is treated as 32-bit premultiplied RGBA.
    pub fn from_native_code(code: i32) -> PixelFormat {
        match code {
            WINDOW_FORMAT_RGB_565 => PixelFormat::Rgb565,
            _ => PixelFormat::Rgba8888Premultiplied,
        }
    }

    /// The native code that requests this layout from a native window.
    pub fn native_code(&self) -> i32 {
        match self {
            PixelFormat::Rgb565 => WINDOW_FORMAT_RGB_565,
            PixelFormat::Rgba8888Premultiplied | PixelFormat::Argb32Premultiplied => WINDOW_FORMAT_RGBA_8888,
        }
    }

    /// Backing-store format for a configured image depth: 16 selects RGB565,
    /// anything else premultiplied ARGB32.
    pub fn for_depth(depth: u32) -> PixelFormat {
        if depth == 16 {
            PixelFormat::Rgb565
        } else {
            PixelFormat::Argb32Premultiplied
        }
    }

    /// Decodes one pixel into premultiplied RGBA.
    pub fn read(&self, bytes: &[u8]) -> [u8; 4] {
        match self {
            PixelFormat::Rgb565 => {
                let v = u16::from_le_bytes([bytes[0], bytes[1]]);
                let r = ((v >> 11) & 0x1f) as u8;
                let g = ((v >> 5) & 0x3f) as u8;
                let b = (v & 0x1f) as u8;
                [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 0xff]
            }
            PixelFormat::Rgba8888Premultiplied => [bytes[0], bytes[1], bytes[2], bytes[3]],
            PixelFormat::Argb32Premultiplied => [bytes[2], bytes[1], bytes[0], bytes[3]],
        }
    }

    /// Encodes premultiplied RGBA into `out`, which holds exactly one pixel.
    pub fn write(&self, rgba: [u8; 4], out: &mut [u8]) {
        let [r, g, b, a] = rgba;
        match self {
            PixelFormat::Rgb565 => {
                let v = (((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3);
                out[..2].copy_from_slice(&v.to_le_bytes());
            }
            PixelFormat::Rgba8888Premultiplied => out[..4].copy_from_slice(&[r, g, b, a]),
            PixelFormat::Argb32Premultiplied => out[..4].copy_from_slice(&[b, g, r, a]),
        }
    }
}
