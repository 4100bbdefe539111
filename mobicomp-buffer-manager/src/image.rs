//! Owned raster images.
//!
//! An [`Image`] is a row-major pixel grid with an explicit byte stride. Window
//! backing stores are images shared with the compositor as [`SharedImage`];
//! a locked native buffer is wrapped in an image for the duration of a
//! compositing pass.

use std::sync::{Arc, RwLock};

use mobicomp_core::types::{PointInt, RectInt, SizeInt};
use thiserror::Error;

use crate::format::PixelFormat;

/// Premultiplied transparent black.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A backing store shared between a window and the compositor.
pub type SharedImage = Arc<RwLock<Image>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Stride of {stride} bytes is too small for {width} pixels of {bytes_per_pixel} bytes")]
    StrideTooSmall { stride: usize, width: u32, bytes_per_pixel: usize },
    #[error("Pixel buffer holds {actual} bytes, {expected} required")]
    BufferTooSmall { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// A fully transparent image with a tightly packed stride.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let stride = width as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            stride,
            format,
            data: vec![0; stride * height as usize],
        }
    }

    /// An image with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, format: PixelFormat, rgba: [u8; 4]) -> Self {
        let mut image = Self::new(width, height, format);
        image.fill(rgba);
        image
    }

    /// Takes ownership of existing pixel memory laid out with `stride` bytes per row.
    pub fn wrap(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let bytes_per_pixel = format.bytes_per_pixel();
        if stride < width as usize * bytes_per_pixel {
            return Err(ImageError::StrideTooSmall { stride, width, bytes_per_pixel });
        }
        let expected = stride * height as usize;
        if data.len() < expected {
            return Err(ImageError::BufferTooSmall { expected, actual: data.len() });
        }
        Ok(Self { width, height, stride, format, data })
    }

    /// Gives the pixel memory back, for example to post it to a native window.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn into_shared(self) -> SharedImage {
        Arc::new(RwLock::new(self))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> SizeInt {
        SizeInt::new(self.width, self.height)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// `(0, 0, width, height)`.
    pub fn rect(&self) -> RectInt {
        RectInt::from_size(self.size())
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize * self.format.bytes_per_pixel()
    }

    /// Reads a pixel as premultiplied RGBA, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = self.offset(x, y);
        Some(self.format.read(&self.data[at..at + self.format.bytes_per_pixel()]))
    }

    /// Writes a pixel; writes outside the image are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let at = self.offset(x, y);
        let bpp = self.format.bytes_per_pixel();
        self.format.write(rgba, &mut self.data[at..at + bpp]);
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        self.fill_rect(self.rect(), rgba);
    }

    /// Overwrites `rect` (clipped to the image) with `rgba`.
    pub fn fill_rect(&mut self, rect: RectInt, rgba: [u8; 4]) {
        let Some(area) = rect.intersection(&self.rect()) else { return };
        let bpp = self.format.bytes_per_pixel();
        let mut encoded = [0u8; 4];
        self.format.write(rgba, &mut encoded);
        let pixel = &encoded[..bpp];

        for y in area.top()..area.bottom() {
            let start = self.offset(area.x() as u32, y as u32);
            let row = &mut self.data[start..start + area.width() as usize * bpp];
            for chunk in row.chunks_exact_mut(bpp) {
                chunk.copy_from_slice(pixel);
            }
        }
    }

    /// Copies `src_rect` of `src` so that its top-left corner lands on `dst`.
    ///
    /// Source pixels replace destination pixels; nothing is blended. Pixels
    /// are converted when the formats differ. The copy is clipped to both
    /// images, and the area actually written is returned in destination
    /// coordinates.
    pub fn blit(&mut self, dst: PointInt, src: &Image, src_rect: RectInt) -> RectInt {
        let Some(src_clip) = src_rect.intersection(&src.rect()) else {
            return RectInt::EMPTY;
        };
        let dx = dst.x - src_rect.x();
        let dy = dst.y - src_rect.y();
        let Some(dst_rect) = src_clip.translate(dx, dy).intersection(&self.rect()) else {
            return RectInt::EMPTY;
        };

        let sx0 = (dst_rect.x() - dx) as u32;
        let sy0 = (dst_rect.y() - dy) as u32;
        let width = dst_rect.width();
        let src_bpp = src.format.bytes_per_pixel();
        let dst_bpp = self.format.bytes_per_pixel();

        for row in 0..dst_rect.height() {
            let src_start = src.offset(sx0, sy0 + row);
            let src_row = &src.data[src_start..src_start + width as usize * src_bpp];
            let dst_start = self.offset(dst_rect.x() as u32, dst_rect.y() as u32 + row);
            let dst_row = &mut self.data[dst_start..dst_start + width as usize * dst_bpp];

            if src.format == self.format {
                dst_row.copy_from_slice(src_row);
            } else {
                for (s, d) in src_row.chunks_exact(src_bpp).zip(dst_row.chunks_exact_mut(dst_bpp)) {
                    self.format.write(src.format.read(s), d);
                }
            }
        }
        dst_rect
    }
}
