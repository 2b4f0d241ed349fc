//! wgpu implementation of the [`RenderContext`] seam.
//!
//! Every draw records its own render pass (loading the previous contents of
//! the frame target) and is submitted right away, so a later
//! `write_buffer` to the same vertex buffer can never overtake the draw
//! that consumed the earlier contents.

use crate::{color::Color, context::GraphicsContext, vertex::Vertex};
use ahash::AHashMap as HashMap;
use image::{RgbaImage, imageops::FilterType};
use parking_lot::Mutex;
use sprig_core::profiling::profile_function;
use sprig_test_utils::{
    BlendMode, BufferId, ContextError, DrawCommand, FilterMode, ProgramId, ProgramSource,
    RenderContext, TextureId, TextureUpload,
};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Run `$body` inside a validation error scope when error checks are on,
/// logging any captured error with the call site. Evaluates to `$body`.
macro_rules! gpu_check {
    ($ctx:expr, $what:expr, $body:expr) => {{
        if $ctx.error_checks {
            $ctx.graphics
                .device
                .push_error_scope(wgpu::ErrorFilter::Validation);
        }
        let result = $body;
        if $ctx.error_checks {
            if let Some(error) = pollster::block_on($ctx.graphics.device.pop_error_scope()) {
                tracing::error!(file = file!(), line = line!(), "GPU error in {}: {}", $what, error);
            }
        }
        result
    }};
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct GpuProgram {
    alpha_pipeline: wgpu::RenderPipeline,
    replace_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    globals: wgpu::BindGroup,
}

struct FrameTarget {
    view: wgpu::TextureView,
    pending_clear: Option<wgpu::Color>,
}

#[derive(Default)]
struct State {
    textures: HashMap<TextureId, GpuTexture>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    programs: HashMap<ProgramId, GpuProgram>,
    frame: Option<FrameTarget>,
}

/// GPU-backed [`RenderContext`] drawing into a caller-supplied target view.
///
/// Draws are only accepted between [`begin_frame`](Self::begin_frame) and
/// [`end_frame`](Self::end_frame).
pub struct WgpuRenderContext {
    graphics: Arc<GraphicsContext>,
    target_format: wgpu::TextureFormat,
    error_checks: bool,
    globals_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    next_id: AtomicU64,
    state: Mutex<State>,
}

impl WgpuRenderContext {
    pub fn new(
        graphics: Arc<GraphicsContext>,
        target_format: wgpu::TextureFormat,
        error_checks: bool,
    ) -> Self {
        let device = &graphics.device;
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            graphics,
            target_format,
            error_checks,
            globals_layout,
            texture_layout,
            next_id: AtomicU64::new(1),
            state: Mutex::new(State::default()),
        }
    }

    pub fn graphics(&self) -> &Arc<GraphicsContext> {
        &self.graphics
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Direct subsequent draws at `view`, cleared to `clear` before the first one.
    pub fn begin_frame(&self, view: wgpu::TextureView, clear: Option<Color>) {
        let mut state = self.state.lock();
        if state.frame.is_some() {
            tracing::warn!("begin_frame called while a frame is active; replacing its target");
        }
        state.frame = Some(FrameTarget {
            view,
            pending_clear: clear.map(Color::to_wgpu),
        });
    }

    /// Finish the frame. A frame without draws still gets its clear.
    pub fn end_frame(&self) {
        let Some(frame) = self.state.lock().frame.take() else {
            tracing::warn!("end_frame called without an active frame");
            return;
        };
        if let Some(clear) = frame.pending_clear {
            let mut encoder =
                self.graphics
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Sprite Clear Encoder"),
                    });
            let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Clear Pass"),
                color_attachments: &[Some(color_attachment(&frame.view, Some(clear)))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.graphics.queue.submit(std::iter::once(encoder.finish()));
        }
    }

    fn create_pipeline(
        &self,
        label: Option<&str>,
        layout: &wgpu::PipelineLayout,
        vertex: (&wgpu::ShaderModule, &str),
        fragment: (&wgpu::ShaderModule, &str),
        blend: wgpu::BlendState,
    ) -> wgpu::RenderPipeline {
        self.graphics
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label,
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: vertex.0,
                    entry_point: Some(vertex.1),
                    buffers: &[Vertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: fragment.0,
                    entry_point: Some(fragment.1),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.target_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
    }
}

fn color_attachment(
    view: &wgpu::TextureView,
    clear: Option<wgpu::Color>,
) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: match clear {
                Some(color) => wgpu::LoadOp::Clear(color),
                None => wgpu::LoadOp::Load,
            },
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    }
}

fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

/// Base level followed by successively halved levels, box-filtered on the CPU.
fn mip_chain(upload: &TextureUpload<'_>) -> Vec<RgbaImage> {
    let Some(base) = RgbaImage::from_raw(upload.width, upload.height, upload.pixels.to_vec())
    else {
        tracing::error!(
            "texture {:?}: {} bytes of pixels do not match {}x{} RGBA",
            upload.label,
            upload.pixels.len(),
            upload.width,
            upload.height
        );
        return Vec::new();
    };

    let levels = upload.mip_level_count();
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);
    for _ in 1..levels {
        let Some(prev) = chain.last() else { break };
        let (w, h) = ((prev.width() / 2).max(1), (prev.height() / 2).max(1));
        let next = image::imageops::resize(prev, w, h, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

impl RenderContext for WgpuRenderContext {
    fn create_texture(&self, upload: &TextureUpload<'_>) -> TextureId {
        profile_function!();
        let device = &self.graphics.device;
        let levels = mip_chain(upload);

        let texture = gpu_check!(self, "create_texture", {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: upload.label,
                size: wgpu::Extent3d {
                    width: upload.width.max(1),
                    height: upload.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: upload.mip_level_count(),
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            for (mip_level, level) in levels.iter().enumerate() {
                self.graphics.queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &texture,
                        mip_level: mip_level as u32,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    level.as_raw(),
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(4 * level.width()),
                        rows_per_image: Some(level.height()),
                    },
                    wgpu::Extent3d {
                        width: level.width(),
                        height: level.height(),
                        depth_or_array_layers: 1,
                    },
                );
            }
            texture
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: upload.label,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter_mode(upload.filter.mag),
            min_filter: filter_mode(upload.filter.min),
            mipmap_filter: filter_mode(upload.filter.mipmap),
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: upload.label,
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let id = TextureId(self.next_id());
        self.state.lock().textures.insert(
            id,
            GpuTexture {
                _texture: texture,
                bind_group,
            },
        );
        id
    }

    fn destroy_texture(&self, texture: TextureId) {
        if self.state.lock().textures.remove(&texture).is_none() {
            tracing::warn!("destroy_texture: unknown texture {texture:?}");
        }
    }

    fn create_program(&self, source: &ProgramSource<'_>) -> Result<ProgramId, ContextError> {
        profile_function!();
        let device = &self.graphics.device;
        let compile_error = |message: String| ContextError::ShaderCompile {
            label: source.label.map(str::to_string),
            message,
        };

        // Shader compilation errors are always captured: they are returned, not just logged.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: source.label,
            source: wgpu::ShaderSource::Wgsl(source.vertex.source.into()),
        });
        let fragment = if source.fragment.source == source.vertex.source {
            None
        } else {
            Some(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: source.label,
                source: wgpu::ShaderSource::Wgsl(source.fragment.source.into()),
            }))
        };
        let fragment = fragment.as_ref().unwrap_or(&vertex);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: source.label,
            bind_group_layouts: &[&self.globals_layout, &self.texture_layout],
            push_constant_ranges: &[],
        });
        let stages = (
            (&vertex, source.vertex.entry_point),
            (fragment, source.fragment.entry_point),
        );
        let alpha_pipeline = self.create_pipeline(
            source.label,
            &layout,
            stages.0,
            stages.1,
            wgpu::BlendState::ALPHA_BLENDING,
        );
        let replace_pipeline = self.create_pipeline(
            source.label,
            &layout,
            stages.0,
            stages.1,
            wgpu::BlendState::REPLACE,
        );
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(compile_error(error.to_string()));
        }

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mat_view_proj"),
            size: std::mem::size_of::<[[f32; 4]; 4]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Globals"),
            layout: &self.globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let id = ProgramId(self.next_id());
        self.state.lock().programs.insert(
            id,
            GpuProgram {
                alpha_pipeline,
                replace_pipeline,
                uniform_buffer,
                globals,
            },
        );
        Ok(id)
    }

    fn set_view_projection(&self, program: ProgramId, matrix: [[f32; 4]; 4]) {
        let state = self.state.lock();
        let Some(program) = state.programs.get(&program) else {
            tracing::warn!("set_view_projection: unknown program {program:?}");
            return;
        };
        gpu_check!(self, "set_view_projection", {
            self.graphics
                .queue
                .write_buffer(&program.uniform_buffer, 0, bytemuck::bytes_of(&matrix));
        });
    }

    fn create_vertex_buffer(&self, label: Option<&str>, size: u64) -> BufferId {
        let buffer = gpu_check!(self, "create_vertex_buffer", {
            self.graphics.device.create_buffer(&wgpu::BufferDescriptor {
                label,
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        let id = BufferId(self.next_id());
        self.state.lock().buffers.insert(id, buffer);
        id
    }

    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8]) {
        profile_function!();
        let state = self.state.lock();
        let Some(target) = state.buffers.get(&buffer) else {
            tracing::warn!("write_buffer: unknown buffer {buffer:?}");
            return;
        };
        gpu_check!(self, "write_buffer", {
            self.graphics.queue.write_buffer(target, offset, data);
        });
    }

    fn destroy_buffer(&self, buffer: BufferId) {
        if self.state.lock().buffers.remove(&buffer).is_none() {
            tracing::warn!("destroy_buffer: unknown buffer {buffer:?}");
        }
    }

    fn draw(&self, command: &DrawCommand) {
        profile_function!();
        let mut state = self.state.lock();
        let State {
            textures,
            buffers,
            programs,
            frame,
        } = &mut *state;

        let Some(frame) = frame.as_mut() else {
            tracing::warn!("draw issued outside begin_frame/end_frame; dropped");
            return;
        };
        let (Some(program), Some(buffer), Some(texture)) = (
            programs.get(&command.program),
            buffers.get(&command.vertex_buffer),
            textures.get(&command.texture),
        ) else {
            tracing::warn!("draw references an unknown resource: {command:?}");
            return;
        };
        if command.depth_test {
            tracing::warn!("depth testing is not available on the sprite target; ignored");
        }

        gpu_check!(self, "draw", {
            let mut encoder =
                self.graphics
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Sprite Batch Encoder"),
                    });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Sprite Batch Pass"),
                    color_attachments: &[Some(color_attachment(
                        &frame.view,
                        frame.pending_clear.take(),
                    ))],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass.set_pipeline(match command.blend {
                    BlendMode::Alpha => &program.alpha_pipeline,
                    BlendMode::Replace => &program.replace_pipeline,
                });
                pass.set_bind_group(0, &program.globals, &[]);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(
                    command.first_vertex..command.first_vertex + command.vertex_count,
                    0..1,
                );
            }
            self.graphics.queue.submit(std::iter::once(encoder.finish()));
        });
    }
}
