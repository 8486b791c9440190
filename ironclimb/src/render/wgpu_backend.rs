use anyhow::{anyhow, Result};
use wgpu::{
    vertex_attr_array, Buffer, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, CompositeAlphaMode, DeviceDescriptor, FragmentState, Instance,
    LoadOp, MultisampleState, Operations, PipelineLayoutDescriptor, PresentMode, PrimitiveState,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    RequestAdapterOptions, ShaderModuleDescriptor, ShaderSource, SurfaceConfiguration,
    TextureFormat, TextureUsages, TextureViewDescriptor, VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use glyphon::{
    Attrs, Buffer as GlyphonBuffer, Cache, Color as GlyphonColor, Family, FontSystem, Metrics,
    Resolution, Shaping, SwashCache, TextArea, TextAtlas, TextBounds,
    TextRenderer as GlyphonTextRenderer, Viewport,
};

use crate::canvas::{Canvas, Color, TextAlign};
use crate::render::batch::{build_batches, QuadVertex, TextItem};

/// Initial room in the quad vertex buffer, in vertices.
const INITIAL_VERTEX_CAPACITY: usize = 6 * 2048;

/// Draws a [`Canvas`] to the window surface.
///
/// The canvas is laid out in a fixed virtual resolution that is stretched to
/// the surface, so gameplay coordinates do not depend on the window size.
pub struct Renderer<'window> {
    backend: WgpuBackend<'window>,
}

impl<'window> Renderer<'window> {
    pub fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let backend = WgpuBackend::new(window, vsync)?;
        Ok(Self { backend })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.backend.resize(new_size);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (
            self.backend.surface_config.width,
            self.backend.surface_config.height,
        )
    }

    /// Submit one frame.
    pub fn render(&mut self, canvas: &Canvas) -> Result<()> {
        self.backend.render(canvas)
    }
}

struct QuadPipeline {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    capacity: usize,
}

struct TextSystem {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    renderer: GlyphonTextRenderer,
    viewport: Viewport,
    // Kept alive alongside the atlas and viewport built from it.
    #[allow(dead_code)]
    cache: Cache,
}

struct WgpuBackend<'window> {
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: SurfaceConfiguration,
    present_mode: PresentMode,
    quad_pipeline: QuadPipeline,
    text: TextSystem,
}

/// One shaped line of text, positioned in surface pixels.
struct ShapedLine {
    buffer: GlyphonBuffer,
    left: f32,
    top: f32,
    color: GlyphonColor,
}

impl<'window> WgpuBackend<'window> {
    fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("ironclimb-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let size = window.inner_size();
        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;

        let present_mode = choose_present_mode(&capabilities.present_modes, vsync);
        let alpha_mode = choose_alpha_mode(&capabilities.alpha_modes);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let quad_pipeline = create_quad_pipeline(&device, format);
        let text = create_text_system(&device, &queue, format);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            present_mode,
            quad_pipeline,
            text,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface_config.present_mode = self.present_mode;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn acquire(&mut self) -> Result<wgpu::SurfaceTexture> {
        loop {
            match self.surface.get_current_texture() {
                Ok(surface_texture) => return Ok(surface_texture),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("surface lost, reconfiguring");
                    self.surface.configure(&self.device, &self.surface_config);
                }
                Err(wgpu::SurfaceError::Timeout) => continue,
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    return Err(anyhow!("Surface ran out of memory"));
                }
                Err(wgpu::SurfaceError::Other) => {
                    return Err(anyhow!("Surface error: Other"));
                }
            }
        }
    }

    fn render(&mut self, canvas: &Canvas) -> Result<()> {
        let surface_texture = self.acquire()?;
        let view = surface_texture
            .texture
            .create_view(&TextureViewDescriptor::default());

        let (width, height) = (self.surface_config.width, self.surface_config.height);
        self.text.viewport.update(&self.queue, Resolution { width, height });

        let virtual_size = canvas.size();
        let scale_x = width as f32 / virtual_size.x.max(1.0);
        let scale_y = height as f32 / virtual_size.y.max(1.0);
        let clear = canvas.clear_color();

        // Each batch is submitted on its own so the shared vertex and text
        // buffers can be rewritten for the next one.
        for (index, batch) in build_batches(canvas).iter().enumerate() {
            self.upload_quads(&batch.vertices);
            let lines = self.shape_texts(&batch.texts, scale_x, scale_y);
            let areas = lines.iter().map(|line| TextArea {
                buffer: &line.buffer,
                left: line.left,
                top: line.top,
                scale: scale_y,
                bounds: TextBounds {
                    left: 0,
                    top: 0,
                    right: width as i32,
                    bottom: height as i32,
                },
                default_color: line.color,
                custom_glyphs: &[],
            });
            let text = &mut self.text;
            text.renderer.prepare(
                &self.device,
                &self.queue,
                &mut text.font_system,
                &mut text.atlas,
                &text.viewport,
                areas,
                &mut text.swash_cache,
            )?;

            let mut encoder = self
                .device
                .create_command_encoder(&CommandEncoderDescriptor {
                    label: Some("frame-encoder"),
                });
            {
                let load = if index == 0 {
                    LoadOp::Clear(wgpu::Color {
                        r: clear.r as f64,
                        g: clear.g as f64,
                        b: clear.b as f64,
                        a: clear.a as f64,
                    })
                } else {
                    LoadOp::Load
                };
                let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("canvas-pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    multiview_mask: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                if !batch.vertices.is_empty() {
                    pass.set_pipeline(&self.quad_pipeline.pipeline);
                    pass.set_vertex_buffer(0, self.quad_pipeline.vertex_buffer.slice(..));
                    pass.draw(0..batch.vertices.len() as u32, 0..1);
                }
                self.text
                    .renderer
                    .render(&self.text.atlas, &self.text.viewport, &mut pass)?;
            }
            self.queue.submit(Some(encoder.finish()));
        }

        surface_texture.present();
        self.text.atlas.trim();
        Ok(())
    }

    fn upload_quads(&mut self, vertices: &[QuadVertex]) {
        if vertices.is_empty() {
            return;
        }
        if vertices.len() > self.quad_pipeline.capacity {
            let capacity = vertices.len().next_power_of_two();
            self.quad_pipeline.vertex_buffer = create_vertex_buffer(&self.device, capacity);
            self.quad_pipeline.capacity = capacity;
        }
        self.queue.write_buffer(
            &self.quad_pipeline.vertex_buffer,
            0,
            bytemuck::cast_slice(vertices),
        );
    }

    /// Shape every line of every text item and place it in surface pixels.
    fn shape_texts(&mut self, items: &[TextItem<'_>], scale_x: f32, scale_y: f32) -> Vec<ShapedLine> {
        let font_system = &mut self.text.font_system;
        let attrs = Attrs::new().family(Family::SansSerif);
        let mut lines = Vec::new();
        for item in items {
            let line_height = item.size * 1.2;
            for (row, line) in item.text.lines().enumerate() {
                let mut buffer =
                    GlyphonBuffer::new(font_system, Metrics::new(item.size, line_height));
                buffer.set_text(font_system, line, &attrs, Shaping::Advanced, None);
                buffer.shape_until_scroll(font_system, false);

                let line_width = buffer
                    .layout_runs()
                    .map(|run| run.line_w)
                    .fold(0.0_f32, f32::max);
                let x = match item.align {
                    TextAlign::Left => item.position.x,
                    TextAlign::Center => item.position.x - line_width / 2.0,
                    TextAlign::Right => item.position.x - line_width,
                };
                let y = item.position.y + row as f32 * line_height;
                lines.push(ShapedLine {
                    buffer,
                    left: x * scale_x,
                    top: y * scale_y,
                    color: to_glyphon_color(item.color),
                });
            }
        }
        lines
    }
}

fn to_glyphon_color(color: Color) -> GlyphonColor {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
    GlyphonColor::rgba(
        channel(color.r),
        channel(color.g),
        channel(color.b),
        channel(color.a),
    )
}

fn create_text_system(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: TextureFormat,
) -> TextSystem {
    let cache = Cache::new(device);
    let mut atlas = TextAtlas::new(device, queue, &cache, format);
    let renderer = GlyphonTextRenderer::new(&mut atlas, device, MultisampleState::default(), None);
    let viewport = Viewport::new(device, &cache);
    TextSystem {
        font_system: FontSystem::new(),
        swash_cache: SwashCache::new(),
        atlas,
        renderer,
        viewport,
        cache,
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("quad-vertex-buffer"),
        size: (capacity * std::mem::size_of::<QuadVertex>()) as wgpu::BufferAddress,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_quad_pipeline(device: &wgpu::Device, surface_format: TextureFormat) -> QuadPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("quad-shader"),
        source: ShaderSource::Wgsl(include_str!("quad.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("quad-pipeline-layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("quad-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attr_array![0 => Float32x2, 1 => Float32x4],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    QuadPipeline {
        pipeline,
        vertex_buffer: create_vertex_buffer(device, INITIAL_VERTEX_CAPACITY),
        capacity: INITIAL_VERTEX_CAPACITY,
    }
}

fn choose_present_mode(modes: &[PresentMode], vsync: bool) -> PresentMode {
    if vsync {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Fifo | PresentMode::FifoRelaxed))
            .unwrap_or(PresentMode::Fifo)
    } else {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Immediate | PresentMode::Mailbox))
            .unwrap_or(PresentMode::Fifo)
    }
}

fn choose_alpha_mode(modes: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    modes
        .iter()
        .copied()
        .find(|mode| matches!(mode, CompositeAlphaMode::Auto))
        .unwrap_or_else(|| modes.first().copied().unwrap_or(CompositeAlphaMode::Opaque))
}
