use bytemuck::{Pod, Zeroable};

/// One reconstructed pixel. Laid out blue, green, red, padding so that a
/// framebuffer can be handed to a presenter as packed 32-bit pixels.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Pixel {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub reserved: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            blue,
            green,
            red,
            reserved: 0,
        }
    }
}

/// Row-major, top-left origin.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// The pixels as packed B, G, R, padding bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Writes a pixel. Coordinates outside the buffer are dropped, never
    /// clamped or wrapped. Returns whether the write landed.
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) -> bool {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = pixel;
            true
        } else {
            false
        }
    }

    pub fn row(&self, y: usize) -> &[Pixel] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }
}
