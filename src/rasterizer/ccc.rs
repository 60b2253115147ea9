//! Color cell compressed textures
//!
//! The texture is split into 4x4 blocks. Each block stores two packed colors
//! and a 16-bit selector picking one of them per texel, averaging three bits
//! per texel. Blocks are laid out in Morton order like plain textures.

use super::color::{decode_555, encode_555, BlendMode, Color};
use super::real::interleave_16_bits;
use super::texture::{Sampler, Texture};
use super::types::UPoint;

const BLOCK_DIM: u32 = 4;

/// One 4x4 cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CccBlock {
    /// Bit `y * 4 + x` selects `colors[1]` when set
    pub selector: u16,
    pub colors: [u16; 2],
}

/// Texture compressed into color cells
#[derive(Debug, Clone, PartialEq)]
pub struct CccTexture {
    blocks: Vec<CccBlock>,
    dimension: u32,
    dim_mask: u32,
    blend_modes: [BlendMode; 2],
}

impl Default for CccTexture {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            dimension: 0,
            dim_mask: 0,
            blend_modes: [BlendMode::Transparent, BlendMode::Solid],
        }
    }
}

fn average(colors: &[Color], blend: BlendMode) -> Color {
    let n = colors.len().max(1) as u32;
    let sum = |f: fn(&Color) -> u8| colors.iter().map(|c| f(c) as u32).sum::<u32>() / n;
    Color::with_blend(sum(|c| c.r) as u8, sum(|c| c.g) as u8, sum(|c| c.b) as u8, blend)
}

/// Splits 16 texels into two groups and encodes each group's mean color.
fn compress_block(texels: &[Color; 16]) -> CccBlock {
    let visible = texels.iter().filter(|c| c.blend != BlendMode::Transparent).count();
    let mixed_stencil = visible != 0 && visible != texels.len();

    let mut selector = 0u16;
    if mixed_stencil {
        // opaque texels must never bleed into holes
        for (i, c) in texels.iter().enumerate() {
            if c.blend != BlendMode::Transparent {
                selector |= 1 << i;
            }
        }
    } else {
        let mean = texels.iter().map(|c| c.illum() as u32).sum::<u32>() / 16;
        for (i, c) in texels.iter().enumerate() {
            if c.illum() as u32 > mean {
                selector |= 1 << i;
            }
        }
    }

    let (mut lo, mut hi) = (Vec::with_capacity(16), Vec::with_capacity(16));
    for (i, c) in texels.iter().enumerate() {
        if selector & (1 << i) != 0 { hi.push(*c) } else { lo.push(*c) }
    }
    let blend_of = |group: &[Color]| group.first().map(|c| c.blend).unwrap_or(BlendMode::Solid);
    let c0 = average(&lo, blend_of(&lo));
    let c1 = if hi.is_empty() { c0 } else { average(&hi, blend_of(&hi)) };

    CccBlock { selector, colors: [encode_555(c0), encode_555(c1)] }
}

impl CccTexture {
    pub const MIN_DIMENSION: u32 = BLOCK_DIM;

    pub fn new() -> Self {
        Self::default()
    }

    /// Compresses `tex`. Textures smaller than one block yield an empty result.
    pub fn from_texture(tex: &Texture) -> Self {
        let dimension = tex.width();
        if dimension < Self::MIN_DIMENSION {
            log::warn!("Cannot compress {}x{} texture into 4x4 cells", dimension, dimension);
            return Self::default();
        }

        let blocks_per_side = dimension / BLOCK_DIM;
        let mut blocks = vec![CccBlock::default(); (blocks_per_side * blocks_per_side) as usize];
        for by in 0..blocks_per_side {
            for bx in 0..blocks_per_side {
                let mut texels = [Color::default(); 16];
                for (i, t) in texels.iter_mut().enumerate() {
                    let x = bx * BLOCK_DIM + i as u32 % BLOCK_DIM;
                    let y = by * BLOCK_DIM + i as u32 / BLOCK_DIM;
                    *t = tex.get_color(UPoint::new(x, y));
                }
                let index = interleave_16_bits(bx as u16, by as u16) as usize;
                blocks[index] = compress_block(&texels);
            }
        }

        Self {
            blocks,
            dimension,
            dim_mask: dimension - 1,
            blend_modes: tex.blend_modes(),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimension
    }

    pub fn height(&self) -> u32 {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[CccBlock] {
        &self.blocks
    }

    pub fn blend_modes(&self) -> [BlendMode; 2] {
        self.blend_modes
    }

    pub fn set_blend_modes(&mut self, modes: [BlendMode; 2]) {
        self.blend_modes = modes;
    }

    /// Texel at integer coordinates, wrapping outside the texture.
    pub fn get_color(&self, p: UPoint) -> Color {
        if self.is_empty() {
            return Color::default();
        }
        let x = p.x & self.dim_mask;
        let y = p.y & self.dim_mask;
        let block = &self.blocks[interleave_16_bits((x / BLOCK_DIM) as u16, (y / BLOCK_DIM) as u16) as usize];
        let bit = (y % BLOCK_DIM) * BLOCK_DIM + x % BLOCK_DIM;
        let which = ((block.selector >> bit) & 1) as usize;
        decode_555(block.colors[which], self.blend_modes)
    }

    /// Expands back into an uncompressed texture.
    pub fn decompress(&self) -> Texture {
        let mut tex = Texture::with_dimension(self.dimension);
        tex.set_blend_modes(self.blend_modes);
        for y in 0..self.dimension {
            for x in 0..self.dimension {
                let p = UPoint::new(x, y);
                tex.set_color(p, self.get_color(p));
            }
        }
        tex
    }
}

impl Sampler for CccTexture {
    fn dimension(&self) -> u32 {
        self.dimension
    }

    fn texel(&self, p: UPoint) -> Color {
        self.get_color(p)
    }
}
