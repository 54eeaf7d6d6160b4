use strata_core::{GraphicsDevice, TextureId};
use strata_renderer::{WgpuDevice, WgpuInitError};

use crate::scene::SceneTextures;
use crate::settings::OutputSettings;

const SWATCH: u32 = 16;

const WINDOW_SWATCHES: [[u8; 4]; 4] = [
    [232, 236, 241, 255],
    [40, 44, 52, 255],
    [250, 246, 227, 255],
    [24, 64, 96, 255],
];

/// Opens an offscreen wgpu device sized to the output and uploads one solid
/// texture per scene layer.
pub(crate) fn offscreen_device(
    output: &OutputSettings,
    windows: usize,
) -> Result<(Box<dyn GraphicsDevice>, SceneTextures), WgpuInitError> {
    let mut device = WgpuDevice::offscreen(output.width, output.height)?;
    let wallpaper = solid_texture(&mut device, [30, 34, 48, 255]);
    let windows = (0..windows)
        .map(|i| solid_texture(&mut device, WINDOW_SWATCHES[i % WINDOW_SWATCHES.len()]))
        .collect();
    Ok((Box::new(device), SceneTextures { wallpaper, windows }))
}

fn solid_texture(device: &mut WgpuDevice, rgba: [u8; 4]) -> TextureId {
    let pixels = rgba.repeat((SWATCH * SWATCH) as usize);
    device.create_texture_rgba(SWATCH, SWATCH, &pixels)
}
