// GraphicsDevice that records every call instead of touching a GPU.
// Backs the test suites, the benches and `strata` runs without --gpu.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use strata_core::{
    BlurSource, BufferId, BufferUsage, Color, DeviceCapabilities, DeviceError, FramebufferId,
    GraphicsDevice, IRect, Monitor, Rect, ShaderKind, ShaderUniforms, TextureId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CompileShader(ShaderKind),
    CreateBuffer(BufferId, BufferUsage),
    DestroyBuffer(BufferId),
    Upload { buffer: BufferId, bytes: usize },
    BeginFrame(Monitor),
    EndFrame,
    BindShader(ShaderKind),
    SetUniforms(ShaderUniforms),
    BindVertexBuffers { vertex: Vec<BufferId>, index: BufferId },
    BindTexture(TextureId),
    BindFramebuffer(FramebufferId),
    SetScissor(Option<IRect>),
    Draw { shader: Option<ShaderKind>, index_count: u32 },
    DrawInstanced { shader: Option<ShaderKind>, index_count: u32, instances: u32 },
    Clear(Color),
    BlurBackground { rect: Rect, source: BlurSource },
}

/// Shared view of everything a [`HeadlessDevice`] was asked to do.
/// Stays readable after the device has been moved into a render context.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Rc<RefCell<Vec<DeviceCommand>>>,
}

impl CommandLog {
    fn push(&self, command: DeviceCommand) {
        self.commands.borrow_mut().push(command);
    }

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.commands.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.commands.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Non-instanced plus instanced draws, excluding clears.
    pub fn draw_calls(&self) -> usize {
        self.count(|c| matches!(c, DeviceCommand::Draw { .. } | DeviceCommand::DrawInstanced { .. }))
    }

    pub fn draws_with(&self, kind: ShaderKind) -> usize {
        self.count(|c| match c {
            DeviceCommand::Draw { shader, .. } | DeviceCommand::DrawInstanced { shader, .. } => {
                *shader == Some(kind)
            }
            _ => false,
        })
    }

    /// Instance counts of every instanced draw, in order.
    pub fn instanced_draws(&self) -> Vec<u32> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::DrawInstanced { instances, .. } => Some(*instances),
                _ => None,
            })
            .collect()
    }

    /// Buffers created and not yet destroyed.
    pub fn live_buffers(&self) -> HashSet<BufferId> {
        let mut live = HashSet::new();
        for command in self.commands.borrow().iter() {
            match command {
                DeviceCommand::CreateBuffer(id, _) => {
                    live.insert(*id);
                }
                DeviceCommand::DestroyBuffer(id) => {
                    live.remove(id);
                }
                _ => {}
            }
        }
        live
    }

    pub fn uploads_to(&self, buffer: BufferId) -> Vec<usize> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::Upload { buffer: b, bytes } if *b == buffer => Some(*bytes),
                _ => None,
            })
            .collect()
    }
}

pub struct HeadlessDevice {
    capabilities: DeviceCapabilities,
    failing: HashSet<ShaderKind>,
    fail_buffers: bool,
    next_buffer: u32,
    buffers: HashSet<BufferId>,
    bound_shader: Option<ShaderKind>,
    log: CommandLog,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Device that supports instancing and live blur.
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities {
            instancing: true,
            live_blur: true,
        })
    }

    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            failing: HashSet::new(),
            fail_buffers: false,
            next_buffer: 1,
            buffers: HashSet::new(),
            bound_shader: None,
            log: CommandLog::default(),
        }
    }

    /// Makes `compile_shader(kind)` fail.
    pub fn fail_shader(mut self, kind: ShaderKind) -> Self {
        self.failing.insert(kind);
        self
    }

    /// Makes every `create_buffer` fail.
    pub fn fail_buffers(mut self) -> Self {
        self.fail_buffers = true;
        self
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn compile_shader(&mut self, kind: ShaderKind) -> Result<(), DeviceError> {
        if self.failing.contains(&kind) {
            return Err(DeviceError::ShaderCompile {
                kind,
                message: "rejected by headless device".into(),
            });
        }
        if kind == ShaderKind::InstancedQuad && !self.capabilities.instancing {
            return Err(DeviceError::UnsupportedShader(kind));
        }
        self.log.push(DeviceCommand::CompileShader(kind));
        Ok(())
    }

    fn create_buffer(&mut self, usage: BufferUsage) -> Result<BufferId, DeviceError> {
        if self.fail_buffers {
            return Err(DeviceError::BufferAllocation("headless allocation disabled".into()));
        }
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(id);
        self.log.push(DeviceCommand::CreateBuffer(id, usage));
        Ok(id)
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        if !self.buffers.remove(&buffer) {
            log::warn!("destroying unknown buffer {:?}", buffer);
            return;
        }
        self.log.push(DeviceCommand::DestroyBuffer(buffer));
    }

    fn upload_buffer(&mut self, buffer: BufferId, bytes: &[u8]) {
        self.log.push(DeviceCommand::Upload {
            buffer,
            bytes: bytes.len(),
        });
    }

    fn begin_frame(&mut self, monitor: &Monitor) {
        self.log.push(DeviceCommand::BeginFrame(*monitor));
    }

    fn end_frame(&mut self) {
        self.bound_shader = None;
        self.log.push(DeviceCommand::EndFrame);
    }

    fn bind_shader(&mut self, kind: ShaderKind) {
        self.bound_shader = Some(kind);
        self.log.push(DeviceCommand::BindShader(kind));
    }

    fn set_uniforms(&mut self, uniforms: &ShaderUniforms) {
        self.log.push(DeviceCommand::SetUniforms(*uniforms));
    }

    fn bind_vertex_buffers(&mut self, vertex: &[BufferId], index: BufferId) {
        self.log.push(DeviceCommand::BindVertexBuffers {
            vertex: vertex.to_vec(),
            index,
        });
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.log.push(DeviceCommand::BindTexture(texture));
    }

    fn bind_framebuffer(&mut self, target: FramebufferId) {
        self.log.push(DeviceCommand::BindFramebuffer(target));
    }

    fn set_scissor(&mut self, scissor: Option<IRect>) {
        self.log.push(DeviceCommand::SetScissor(scissor));
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.log.push(DeviceCommand::Draw {
            shader: self.bound_shader,
            index_count,
        });
    }

    fn draw_indexed_instanced(&mut self, index_count: u32, instances: u32) {
        self.log.push(DeviceCommand::DrawInstanced {
            shader: self.bound_shader,
            index_count,
            instances,
        });
    }

    fn clear(&mut self, color: Color) {
        self.log.push(DeviceCommand::Clear(color));
    }

    fn blur_background(&mut self, rect: Rect, _round: f32, _rounding_power: f32, source: BlurSource) {
        self.log.push(DeviceCommand::BlurBackground { rect, source });
    }
}
