// GraphicsDevice backed by wgpu. Calls are recorded into a frame list while
// the frame is built; end_frame uploads the staged buffer data and uniforms
// and encodes the list into one render pass per framebuffer run.

use std::collections::HashMap;
use std::sync::Arc;

use strata_core::{
    BlurSource, BufferId, BufferUsage, Color, DeviceCapabilities, DeviceError, FramebufferId,
    GraphicsDevice, IRect, Monitor, Rect, ShaderKind, ShaderUniforms, TextureId,
};

use crate::init::{self, UNIFORM_BLOCK_SIZE};
use crate::vertex::UniformBlock;

const INITIAL_BUFFER_SIZE: u64 = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum WgpuInitError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// Byte range of one upload inside a streamed buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BufferSlice {
    buffer: BufferId,
    start: u64,
    end: u64,
}

/// CPU staging for one device buffer. Uploads append; the whole staging area
/// is written to the GPU once per frame.
struct StreamBuffer {
    usage: wgpu::BufferUsages,
    gpu: wgpu::Buffer,
    capacity: u64,
    staging: Vec<u8>,
    latest: (u64, u64),
    dirty: bool,
}

impl StreamBuffer {
    fn new(device: &wgpu::Device, usage: wgpu::BufferUsages) -> Self {
        Self {
            usage,
            gpu: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stream_buffer"),
                size: INITIAL_BUFFER_SIZE,
                usage,
                mapped_at_creation: false,
            }),
            capacity: INITIAL_BUFFER_SIZE,
            staging: Vec::new(),
            latest: (0, 0),
            dirty: false,
        }
    }

    fn pad(&mut self) {
        let aligned = align_up(self.staging.len() as u64, wgpu::COPY_BUFFER_ALIGNMENT);
        self.staging.resize(aligned as usize, 0);
    }

    fn stage(&mut self, bytes: &[u8]) {
        self.pad();
        let start = self.staging.len() as u64;
        self.staging.extend_from_slice(bytes);
        self.latest = (start, start + bytes.len() as u64);
        self.pad();
        self.dirty = true;
    }

    /// Keeps only the most recent upload, moved to offset 0, so data
    /// uploaded once (unit quads) stays valid across frames.
    fn rebase(&mut self) {
        let (start, end) = self.latest;
        if start == 0 && self.staging.len() as u64 <= align_up(end, wgpu::COPY_BUFFER_ALIGNMENT) {
            return;
        }
        let kept = self.staging[start as usize..end as usize].to_vec();
        self.staging = kept;
        self.latest = (0, end - start);
        self.pad();
        self.dirty = true;
    }

    fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if !self.dirty || self.staging.is_empty() {
            return;
        }
        let needed = self.staging.len() as u64;
        if needed > self.capacity {
            let new_cap = needed.next_power_of_two().max(INITIAL_BUFFER_SIZE);
            self.gpu = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stream_buffer"),
                size: new_cap,
                usage: self.usage,
                mapped_at_creation: false,
            });
            self.capacity = new_cap;
        }
        queue.write_buffer(&self.gpu, 0, &self.staging);
        self.dirty = false;
    }

    fn latest_slice(&self, buffer: BufferId) -> BufferSlice {
        BufferSlice {
            buffer,
            start: self.latest.0,
            end: self.latest.1,
        }
    }
}

/// One uniform block per draw in a dynamically offset uniform buffer.
struct UniformArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u64,
    stride: u64,
    staging: Vec<u8>,
}

impl UniformArena {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, stride: u64) -> Self {
        let capacity = INITIAL_BUFFER_SIZE;
        let (buffer, bind_group) = Self::allocate(device, layout, capacity);
        Self {
            buffer,
            bind_group,
            capacity,
            stride,
            staging: Vec::new(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_BLOCK_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn push(&mut self, block: &UniformBlock) -> u32 {
        let offset = self.staging.len() as u64;
        self.staging.extend_from_slice(bytemuck::bytes_of(block));
        self.staging.resize((offset + self.stride) as usize, 0);
        offset as u32
    }

    fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) {
        if self.staging.is_empty() {
            return;
        }
        let needed = self.staging.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            let (buffer, bind_group) = Self::allocate(device, layout, self.capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }
}

struct RenderTarget {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    /// Set when the device allocated the texture itself.
    texture: Option<wgpu::Texture>,
}

impl RenderTarget {
    fn offscreen(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            width,
            height,
            texture: Some(texture),
        }
    }

    /// Scissor clamped to the target, or None when nothing is left.
    fn clamp(&self, scissor: Option<IRect>) -> Option<(u32, u32, u32, u32)> {
        let full = IRect::new(0, 0, self.width as i32, self.height as i32);
        let rect = match scissor {
            Some(s) => s.intersection(&full)?,
            None => full,
        };
        if rect.is_empty() {
            return None;
        }
        Some((rect.x1 as u32, rect.y1 as u32, rect.width() as u32, rect.height() as u32))
    }
}

struct DrawCommand {
    target: FramebufferId,
    shader: ShaderKind,
    uniform_offset: u32,
    vertex: Vec<BufferSlice>,
    index: BufferSlice,
    texture: Option<TextureId>,
    scissor: Option<IRect>,
    index_count: u32,
    instances: u32,
}

enum FrameCommand {
    Draw(DrawCommand),
    Clear {
        target: FramebufferId,
        uniform_offset: u32,
        scissor: Option<IRect>,
    },
}

impl FrameCommand {
    fn target(&self) -> FramebufferId {
        match self {
            FrameCommand::Draw(draw) => draw.target,
            FrameCommand::Clear { target, .. } => *target,
        }
    }
}

#[derive(Default)]
struct DrawState {
    target: FramebufferId,
    shader: Option<ShaderKind>,
    uniform_offset: Option<u32>,
    vertex: Vec<BufferSlice>,
    index: Option<BufferSlice>,
    texture: Option<TextureId>,
    scissor: Option<IRect>,
}

pub struct WgpuDevice {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipelines: HashMap<ShaderKind, wgpu::RenderPipeline>,
    clear_pipeline: wgpu::RenderPipeline,
    uniforms: UniformArena,
    buffers: HashMap<BufferId, StreamBuffer>,
    next_buffer: u32,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    next_texture: u32,
    targets: HashMap<FramebufferId, RenderTarget>,
    next_target: u32,
    commands: Vec<FrameCommand>,
    state: DrawState,
    frames: u64,
}

impl WgpuDevice {
    /// Wraps an existing device. `main` becomes `FramebufferId::MAIN`.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        main: wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        let mut this = Self::bare(device, queue, format);
        this.targets.insert(
            FramebufferId::MAIN,
            RenderTarget {
                view: main,
                width,
                height,
                texture: None,
            },
        );
        this
    }

    /// Creates its own adapter and device and renders into an offscreen
    /// texture of the given pixel size.
    pub fn offscreen(width: u32, height: u32) -> Result<Self, WgpuInitError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(WgpuInitError::NoAdapter)?;
        log::info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("strata_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let format = wgpu::TextureFormat::Rgba8Unorm;
        let device = Arc::new(device);
        let target = RenderTarget::offscreen(&device, format, width.max(1), height.max(1));
        let mut this = Self::bare(device, Arc::new(queue), format);
        this.targets.insert(FramebufferId::MAIN, target);
        Ok(this)
    }

    fn bare(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, format: wgpu::TextureFormat) -> Self {
        let uniform_layout = init::uniform_layout(&device);
        let texture_layout = init::texture_layout(&device);
        let sampler = init::sampler(&device);
        let clear_pipeline = init::create_clear_pipeline(&device, format, &uniform_layout);
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniforms = UniformArena::new(&device, &uniform_layout, align_up(UNIFORM_BLOCK_SIZE, alignment));

        Self {
            device,
            queue,
            format,
            uniform_layout,
            texture_layout,
            sampler,
            pipelines: HashMap::new(),
            clear_pipeline,
            uniforms,
            buffers: HashMap::new(),
            next_buffer: 1,
            textures: HashMap::new(),
            next_texture: 1,
            targets: HashMap::new(),
            next_target: 1,
            commands: Vec::new(),
            state: DrawState::default(),
            frames: 0,
        }
    }

    /// Replaces the main target, e.g. with the next swapchain image.
    pub fn set_main_target(&mut self, view: wgpu::TextureView, width: u32, height: u32) {
        self.targets.insert(
            FramebufferId::MAIN,
            RenderTarget {
                view,
                width,
                height,
                texture: None,
            },
        );
    }

    /// The offscreen main texture, when the device owns one.
    pub fn main_texture(&self) -> Option<&wgpu::Texture> {
        self.targets.get(&FramebufferId::MAIN)?.texture.as_ref()
    }

    /// Allocates an offscreen framebuffer the pass can switch to.
    pub fn create_framebuffer(&mut self, width: u32, height: u32) -> FramebufferId {
        let id = FramebufferId(self.next_target);
        self.next_target += 1;
        let target = RenderTarget::offscreen(&self.device, self.format, width.max(1), height.max(1));
        self.targets.insert(id, target);
        id
    }

    /// Makes `view` sampleable through `bind_texture`.
    pub fn register_texture(&mut self, view: &wgpu::TextureView) -> TextureId {
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bg"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, bind_group);
        id
    }

    /// Uploads premultiplied RGBA8 pixels into a new texture.
    pub fn create_texture_rgba(&mut self, width: u32, height: u32, pixels: &[u8]) -> TextureId {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("surface_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.register_texture(&view)
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames
    }

    fn target_size(&self) -> [f32; 2] {
        self.targets
            .get(&self.state.target)
            .map(|t| [t.width as f32, t.height as f32])
            .unwrap_or([1.0, 1.0])
    }

    fn current_uniforms(&mut self) -> u32 {
        match self.state.uniform_offset {
            Some(offset) => offset,
            None => {
                let block = UniformBlock::new(self.target_size(), &ShaderUniforms::default());
                let offset = self.uniforms.push(&block);
                self.state.uniform_offset = Some(offset);
                offset
            }
        }
    }

    fn record_draw(&mut self, index_count: u32, instances: u32) {
        let Some(shader) = self.state.shader else {
            log::warn!("draw without a bound shader skipped");
            return;
        };
        let Some(index) = self.state.index else {
            log::warn!("{} draw without an index buffer skipped", shader);
            return;
        };
        let uniform_offset = self.current_uniforms();
        self.commands.push(FrameCommand::Draw(DrawCommand {
            target: self.state.target,
            shader,
            uniform_offset,
            vertex: self.state.vertex.clone(),
            index,
            texture: self.state.texture,
            scissor: self.state.scissor,
            index_count,
            instances,
        }));
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut start = 0;
        while start < self.commands.len() {
            let target_id = self.commands[start].target();
            let end = self.commands[start..]
                .iter()
                .position(|c| c.target() != target_id)
                .map_or(self.commands.len(), |n| start + n);
            if let Some(target) = self.targets.get(&target_id) {
                self.encode_run(encoder, target, &self.commands[start..end]);
            } else {
                log::warn!("framebuffer {:?} is unknown, {} commands dropped", target_id, end - start);
            }
            start = end;
        }
    }

    fn encode_run(&self, encoder: &mut wgpu::CommandEncoder, target: &RenderTarget, commands: &[FrameCommand]) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("strata_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for command in commands {
            match command {
                FrameCommand::Clear { uniform_offset, scissor, .. } => {
                    let Some((x, y, w, h)) = target.clamp(*scissor) else {
                        continue;
                    };
                    pass.set_scissor_rect(x, y, w, h);
                    pass.set_pipeline(&self.clear_pipeline);
                    pass.set_bind_group(0, &self.uniforms.bind_group, &[*uniform_offset]);
                    pass.draw(0..3, 0..1);
                }
                FrameCommand::Draw(draw) => {
                    let Some((x, y, w, h)) = target.clamp(draw.scissor) else {
                        continue;
                    };
                    let Some(pipeline) = self.pipelines.get(&draw.shader) else {
                        continue;
                    };
                    pass.set_scissor_rect(x, y, w, h);
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, &self.uniforms.bind_group, &[draw.uniform_offset]);
                    if draw.shader == ShaderKind::Texture {
                        let Some(bind_group) = draw.texture.and_then(|t| self.textures.get(&t)) else {
                            continue;
                        };
                        pass.set_bind_group(1, bind_group, &[]);
                    }
                    let mut bound = true;
                    for (slot, slice) in draw.vertex.iter().enumerate() {
                        match self.buffers.get(&slice.buffer) {
                            Some(buf) if slice.start < slice.end => {
                                pass.set_vertex_buffer(slot as u32, buf.gpu.slice(slice.start..slice.end))
                            }
                            _ => bound = false,
                        }
                    }
                    let Some(index) = self.buffers.get(&draw.index.buffer) else {
                        continue;
                    };
                    if !bound || draw.index.start >= draw.index.end {
                        continue;
                    }
                    pass.set_index_buffer(
                        index.gpu.slice(draw.index.start..draw.index.end),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..draw.index_count, 0, 0..draw.instances);
                }
            }
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            instancing: true,
            live_blur: false,
        }
    }

    fn compile_shader(&mut self, kind: ShaderKind) -> Result<(), DeviceError> {
        if self.pipelines.contains_key(&kind) {
            return Ok(());
        }
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = init::create_pipeline(
            &self.device,
            kind,
            self.format,
            &self.uniform_layout,
            &self.texture_layout,
        );
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(DeviceError::ShaderCompile {
                kind,
                message: err.to_string(),
            });
        }
        self.pipelines.insert(kind, pipeline);
        Ok(())
    }

    fn create_buffer(&mut self, usage: BufferUsage) -> Result<BufferId, DeviceError> {
        let usages = match usage {
            BufferUsage::Vertex | BufferUsage::Instance => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        } | wgpu::BufferUsages::COPY_DST;

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = StreamBuffer::new(&self.device, usages);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(DeviceError::BufferAllocation(err.to_string()));
        }

        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(id, buffer);
        Ok(id)
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        match self.buffers.remove(&buffer) {
            Some(buf) => buf.gpu.destroy(),
            None => log::warn!("destroying unknown buffer {:?}", buffer),
        }
    }

    fn upload_buffer(&mut self, buffer: BufferId, bytes: &[u8]) {
        match self.buffers.get_mut(&buffer) {
            Some(buf) => buf.stage(bytes),
            None => log::warn!("upload to unknown buffer {:?}", buffer),
        }
    }

    fn begin_frame(&mut self, monitor: &Monitor) {
        let width = monitor.size.width.round().max(1.0) as u32;
        let height = monitor.size.height.round().max(1.0) as u32;
        let resize = self
            .targets
            .get(&FramebufferId::MAIN)
            .is_some_and(|main| main.texture.is_some() && (main.width, main.height) != (width, height));
        if resize {
            let target = RenderTarget::offscreen(&self.device, self.format, width, height);
            self.targets.insert(FramebufferId::MAIN, target);
        }

        for buffer in self.buffers.values_mut() {
            buffer.rebase();
        }
        self.uniforms.staging.clear();
        self.commands.clear();
        self.state = DrawState::default();
    }

    fn end_frame(&mut self) {
        for buffer in self.buffers.values_mut() {
            buffer.sync(&self.device, &self.queue);
        }
        self.uniforms.sync(&self.device, &self.queue, &self.uniform_layout);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("strata_frame"),
        });
        self.encode(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));
        self.frames += 1;
        log::trace!("frame {} submitted with {} commands", self.frames, self.commands.len());

        self.commands.clear();
        self.state = DrawState::default();
    }

    fn bind_shader(&mut self, kind: ShaderKind) {
        self.state.shader = Some(kind);
    }

    fn set_uniforms(&mut self, uniforms: &ShaderUniforms) {
        let block = UniformBlock::new(self.target_size(), uniforms);
        self.state.uniform_offset = Some(self.uniforms.push(&block));
    }

    fn bind_vertex_buffers(&mut self, vertex: &[BufferId], index: BufferId) {
        self.state.vertex = vertex
            .iter()
            .filter_map(|id| self.buffers.get(id).map(|b| b.latest_slice(*id)))
            .collect();
        self.state.index = self.buffers.get(&index).map(|b| b.latest_slice(index));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.state.texture = Some(texture);
    }

    fn bind_framebuffer(&mut self, target: FramebufferId) {
        self.state.target = target;
    }

    fn set_scissor(&mut self, scissor: Option<IRect>) {
        self.state.scissor = scissor;
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.record_draw(index_count, 1);
    }

    fn draw_indexed_instanced(&mut self, index_count: u32, instances: u32) {
        self.record_draw(index_count, instances);
    }

    fn clear(&mut self, color: Color) {
        let uniforms = ShaderUniforms {
            color: color.premultiplied(),
            ..Default::default()
        };
        let block = UniformBlock::new(self.target_size(), &uniforms);
        let uniform_offset = self.uniforms.push(&block);
        self.commands.push(FrameCommand::Clear {
            target: self.state.target,
            uniform_offset,
            scissor: self.state.scissor,
        });
    }

    fn blur_background(&mut self, _rect: Rect, _round: f32, _rounding_power: f32, source: BlurSource) {
        // Live blur is not advertised, and there is no precomputed blur
        // framebuffer to sample yet.
        log::trace!("blur_background({:?}) ignored", source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(64, 256), 256);
        assert_eq!(align_up(257, 256), 512);
    }
}
