// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use prism_core::asset::Asset;
use prism_core::renderer::{ResourceLoadError, SamplerParams, TextureFormat};

/// A decoded 2D image.
///
/// Pixel content and sampler parameters carry independent change counters:
/// the texture cache re-uploads pixels only when `data_version` moved and
/// re-applies parameters only when `sampler_version` moved.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    format: TextureFormat,
    pixels: Vec<u8>,
    sampler: SamplerParams,
    data_version: u64,
    sampler_version: u64,
}

impl Asset for Texture {}

fn check_len(
    width: u32,
    height: u32,
    format: TextureFormat,
    pixels: &[u8],
) -> Result<(), ResourceLoadError> {
    let expected = width as usize * height as usize * format.bytes_per_pixel();
    if pixels.len() != expected {
        return Err(ResourceLoadError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

impl Texture {
    /// Creates a texture from tightly packed pixel rows.
    pub fn new(
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: Vec<u8>,
    ) -> Result<Self, ResourceLoadError> {
        check_len(width, height, format, &pixels)?;
        Ok(Self {
            width,
            height,
            format,
            pixels,
            sampler: SamplerParams::default(),
            data_version: 0,
            sampler_version: 0,
        })
    }

    /// Creates a 1x1 RGBA texture.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8,
            pixels: rgba.to_vec(),
            sampler: SamplerParams::NEAREST_CLAMP,
            data_version: 0,
            sampler_version: 0,
        }
    }

    /// Builder-style sampler override. Does not count as a change.
    pub fn with_sampler(mut self, sampler: SamplerParams) -> Self {
        self.sampler = sampler;
        self
    }

    /// Swaps in new pixel content as a whole, bumping the data counter once.
    pub fn replace_pixels(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: Vec<u8>,
    ) -> Result<(), ResourceLoadError> {
        check_len(width, height, format, &pixels)?;
        self.width = width;
        self.height = height;
        self.format = format;
        self.pixels = pixels;
        self.data_version += 1;
        Ok(())
    }

    /// Edits pixels in place; the data counter is bumped once afterwards.
    pub fn modify_pixels(&mut self, edit: impl FnOnce(&mut [u8])) {
        edit(&mut self.pixels);
        self.data_version += 1;
    }

    /// Changes the sampler parameters. An identical value is not a change.
    pub fn set_sampler(&mut self, sampler: SamplerParams) {
        if self.sampler != sampler {
            self.sampler = sampler;
            self.sampler_version += 1;
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel channel layout.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Tightly packed pixel rows.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Current wrap and filter parameters.
    pub fn sampler(&self) -> &SamplerParams {
        &self.sampler
    }

    /// Counter advanced on every pixel change.
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Counter advanced on every sampler change.
    pub fn sampler_version(&self) -> u64 {
        self.sampler_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::FilterMode;

    #[test]
    fn rejects_short_pixel_buffers() {
        let err = Texture::new(2, 2, TextureFormat::Rgba8, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            ResourceLoadError::InvalidPixelData {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn counters_advance_independently() {
        let mut tex = Texture::solid([255, 0, 0, 255]);
        tex.replace_pixels(1, 1, TextureFormat::Rgb8, vec![0, 255, 0])
            .expect("valid pixels");
        assert_eq!((tex.data_version(), tex.sampler_version()), (1, 0));

        let sampler = SamplerParams {
            mag_filter: FilterMode::Linear,
            ..*tex.sampler()
        };
        tex.set_sampler(sampler);
        tex.set_sampler(sampler);
        assert_eq!((tex.data_version(), tex.sampler_version()), (1, 1));
    }
}
