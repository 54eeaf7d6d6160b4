// Synthetic desktop: wallpaper, stacked windows, a dock of tiles and a top
// panel, with one window sliding across the output every frame.

use strata_core::{Color, Rect, Size, TextureId};
use strata_pass::{
    BatchedPassElement, BorderElement, RectElement, RenderPass, ShadowElement, SurfaceElement, TextureElement,
};

const WINDOW_ROUND: f32 = 10.0;
const SHADOW_RANGE: f32 = 18.0;
const BORDER_WIDTH: f32 = 1.0;
const PANEL_HEIGHT: f32 = 32.0;
const DOCK_TILES: usize = 24;
const TILE_SIZE: f32 = 40.0;
const TILE_GAP: f32 = 8.0;
const SLIDE_STEP: f32 = 12.0;

const SHADOW_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.45);
const BORDER_COLOR: Color = Color::new(0.35, 0.38, 0.45, 1.0);
const PANEL_COLOR: Color = Color::new(0.12, 0.12, 0.16, 0.7);

pub const WINDOW_COUNT: usize = 4;

/// Textures the scene samples, created by whichever device runs it.
#[derive(Debug, Clone)]
pub struct SceneTextures {
    pub wallpaper: TextureId,
    pub windows: Vec<TextureId>,
}

impl SceneTextures {
    /// Plain ids for devices that don't sample real textures.
    pub fn numbered(windows: usize) -> Self {
        Self {
            wallpaper: TextureId(1),
            windows: (0..windows).map(|i| TextureId(i as u32 + 2)).collect(),
        }
    }
}

struct Window {
    rect: Rect,
    texture: TextureId,
}

pub struct Scene {
    size: Size,
    textures: SceneTextures,
    windows: Vec<Window>,
    blur: bool,
    direction: f32,
    frame: u64,
}

impl Scene {
    /// `size` is logical.
    pub fn new(size: Size, textures: SceneTextures, blur: bool) -> Self {
        let windows = textures
            .windows
            .iter()
            .enumerate()
            .map(|(i, &texture)| {
                let offset = i as f32 * 60.0;
                Window {
                    rect: Rect::new(120.0 + offset, 90.0 + offset, size.width * 0.45, size.height * 0.5),
                    texture,
                }
            })
            .collect();
        Self {
            size,
            textures,
            windows,
            blur,
            direction: 1.0,
            frame: 0,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances one frame and returns the logical boxes that changed.
    pub fn step(&mut self) -> Vec<Rect> {
        self.frame += 1;
        let mut damage = vec![self.clock_rect()];

        let width = self.size.width;
        let direction = &mut self.direction;
        if let Some(top) = self.windows.last_mut() {
            let before = top.rect.expand(SHADOW_RANGE);
            let mut x = top.rect.x + SLIDE_STEP * *direction;
            if x < 0.0 || x + top.rect.width > width {
                *direction = -*direction;
                x = top.rect.x + SLIDE_STEP * *direction;
            }
            top.rect.x = x;
            damage.push(before.union(top.rect.expand(SHADOW_RANGE)));
        }
        damage
    }

    pub fn build_pass(&self) -> RenderPass {
        let mut pass = RenderPass::new();
        let screen = Rect::from_size(self.size);
        pass.add_element(TextureElement::new(self.textures.wallpaper, screen).opaque());

        for window in &self.windows {
            pass.add_element(
                ShadowElement::new(window.rect, SHADOW_COLOR, SHADOW_RANGE).rounded(WINDOW_ROUND, 2.0),
            );
            pass.add_element(
                SurfaceElement::new(window.texture, window.rect)
                    .rounded(WINDOW_ROUND, 2.0)
                    .opaque_texture(),
            );
            pass.add_element(
                BorderElement::new(window.rect, BORDER_COLOR, BORDER_WIDTH).rounded(WINDOW_ROUND, 2.0),
            );
        }

        pass.add_element(self.dock());

        let panel = Rect::new(0.0, 0.0, self.size.width, PANEL_HEIGHT);
        let panel = RectElement::new(panel, PANEL_COLOR);
        pass.add_element(if self.blur { panel.blurred(false) } else { panel });
        pass.add_element(RectElement::new(self.clock_rect(), self.clock_color()).rounded(4.0, 2.0));
        pass
    }

    fn dock(&self) -> BatchedPassElement {
        let width = DOCK_TILES as f32 * (TILE_SIZE + TILE_GAP) - TILE_GAP;
        let x = (self.size.width - width) / 2.0;
        let y = self.size.height - TILE_SIZE - TILE_GAP * 2.0;

        let mut dock = BatchedPassElement::new();
        let backdrop = Rect::new(x - TILE_GAP, y - TILE_GAP, width + TILE_GAP * 2.0, TILE_SIZE + TILE_GAP * 2.0);
        dock.add_element(Box::new(ShadowElement::new(backdrop, SHADOW_COLOR, 12.0).rounded(12.0, 2.0)));
        for i in 0..DOCK_TILES {
            let shade = i as f32 / DOCK_TILES as f32;
            let tile = Rect::new(x + i as f32 * (TILE_SIZE + TILE_GAP), y, TILE_SIZE, TILE_SIZE);
            let color = Color::new(0.2 + shade * 0.6, 0.5, 0.9 - shade * 0.6, 1.0);
            dock.add_element(Box::new(RectElement::new(tile, color).rounded(8.0, 2.0)));
        }
        dock
    }

    fn clock_rect(&self) -> Rect {
        Rect::new(self.size.width - 120.0, 6.0, 100.0, PANEL_HEIGHT - 12.0)
    }

    fn clock_color(&self) -> Color {
        let pulse = (self.frame % 60) as f32 / 60.0;
        Color::new(0.9, 0.9 * pulse, 0.3, 1.0)
    }
}
