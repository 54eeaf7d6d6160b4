// Core types and traits shared by the strata crates.
// Geometry and regions, colors, output description, and the GraphicsDevice
// capability trait every backend implements.

mod region;

pub use region::{IRect, Region};

// ──────────────────────────────────────────────
// Geometry
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in logical or pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Scales position and size around the origin.
    pub fn scale(self, factor: f32) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Grows the rect by `amount` on every side. Negative values shrink it,
    /// never below zero size.
    pub fn expand(self, amount: f32) -> Self {
        let width = self.width + amount * 2.0;
        let height = self.height + amount * 2.0;
        let x = if width < 0.0 { self.center().x } else { self.x - amount };
        let y = if height < 0.0 { self.center().y } else { self.y - amount };
        Self::new(x, y, width.max(0.0), height.max(0.0))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(self, other: Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Smallest rect covering both. An empty operand is ignored.
    pub fn union(self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Smallest integer pixel rect containing this rect.
    pub fn round_out(self) -> IRect {
        IRect::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.right().ceil() as i32,
            self.bottom().ceil() as i32,
        )
    }
}

// ──────────────────────────────────────────────
// Colors
// ──────────────────────────────────────────────

/// RGBA color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// `[r*a, g*a, b*a, a]`, the layout batch renderers upload.
    pub fn premultiplied(&self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }
}

// ──────────────────────────────────────────────
// Identity
// ──────────────────────────────────────────────

/// A texture known to the device. `TextureId::NONE` marks untextured draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TextureId(pub u32);

impl TextureId {
    pub const NONE: Self = Self(0);
}

/// A render target. `FramebufferId::MAIN` is the output being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FramebufferId(pub u32);

impl FramebufferId {
    pub const MAIN: Self = Self(0);
}

/// A GPU buffer handle handed out by [`GraphicsDevice::create_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

// ──────────────────────────────────────────────
// Output
// ──────────────────────────────────────────────

/// The output being rendered: its transformed size in pixels and its scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    pub size: Size,
    pub scale: f32,
}

impl Monitor {
    pub fn new(size: Size, scale: f32) -> Self {
        Self { size, scale }
    }

    /// Pixel bounds of the output.
    pub fn bounds(&self) -> IRect {
        Rect::from_size(self.size).round_out()
    }

    pub fn logical_size(&self) -> Size {
        Size::new(self.size.width / self.scale, self.size.height / self.scale)
    }
}

// ──────────────────────────────────────────────
// Graphics device
// ──────────────────────────────────────────────

/// Pipeline classes the engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Single rounded rect positioned through uniforms.
    Quad,
    /// Many rects in one vertex buffer sharing round/rounding power.
    BatchedQuad,
    /// Unit quad expanded per instance.
    InstancedQuad,
    Texture,
    Border,
    Shadow,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 6] = [
        ShaderKind::Quad,
        ShaderKind::BatchedQuad,
        ShaderKind::InstancedQuad,
        ShaderKind::Texture,
        ShaderKind::Border,
        ShaderKind::Shadow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShaderKind::Quad => "quad",
            ShaderKind::BatchedQuad => "batched_quad",
            ShaderKind::InstancedQuad => "instanced_quad",
            ShaderKind::Texture => "texture",
            ShaderKind::Border => "border",
            ShaderKind::Shadow => "shadow",
        }
    }
}

impl std::fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
    Instance,
}

/// Where a blurred background comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurSource {
    /// Blur what has been drawn so far, at draw time.
    Live,
    /// Sample the blur framebuffer computed by a pre-blur element.
    Precomputed,
}

/// One-time capability answers. Queried once when renderers initialise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub instancing: bool,
    pub live_blur: bool,
}

/// Per-draw uniform state. Colors are premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShaderUniforms {
    /// Shape rect in pixels. Ignored by the batched and instanced kinds,
    /// which carry geometry per vertex or per instance.
    pub rect: Rect,
    pub color: [f32; 4],
    pub round: f32,
    pub rounding_power: f32,
    pub alpha: f32,
    /// Border thickness in pixels.
    pub thickness: f32,
    /// Shadow range in pixels.
    pub range: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to compile {kind} shader: {message}")]
    ShaderCompile { kind: ShaderKind, message: String },
    #[error("{0} shader is not supported by this device")]
    UnsupportedShader(ShaderKind),
    #[error("buffer allocation failed: {0}")]
    BufferAllocation(String),
}

/// The graphics backend the engine draws through.
/// Only setup calls can fail; draw-time calls never return errors.
pub trait GraphicsDevice {
    fn capabilities(&self) -> DeviceCapabilities;

    fn compile_shader(&mut self, kind: ShaderKind) -> Result<(), DeviceError>;

    fn create_buffer(&mut self, usage: BufferUsage) -> Result<BufferId, DeviceError>;
    fn destroy_buffer(&mut self, buffer: BufferId);
    /// Replaces the buffer contents with `bytes` (streaming update).
    fn upload_buffer(&mut self, buffer: BufferId, bytes: &[u8]);

    fn begin_frame(&mut self, monitor: &Monitor);
    fn end_frame(&mut self);

    fn bind_shader(&mut self, kind: ShaderKind);
    fn set_uniforms(&mut self, uniforms: &ShaderUniforms);
    fn bind_vertex_buffers(&mut self, vertex: &[BufferId], index: BufferId);
    fn bind_texture(&mut self, texture: TextureId);
    fn bind_framebuffer(&mut self, target: FramebufferId);
    fn set_scissor(&mut self, scissor: Option<IRect>);

    fn draw_indexed(&mut self, index_count: u32);
    fn draw_indexed_instanced(&mut self, index_count: u32, instances: u32);

    /// Fills the scissored area with `color`, ignoring blending.
    fn clear(&mut self, color: Color);
    /// Draws a blurred copy of the background inside `rect` (pixels).
    /// Only called when `capabilities().live_blur` is set.
    fn blur_background(&mut self, rect: Rect, round: f32, rounding_power: f32, source: BlurSource);
}
