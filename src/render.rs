use glam::{Mat4, Vec3};
use std::rc::Rc;
use viewer_core::constants::*;
use viewer_core::{PerspectiveCamera, SceneGraph};
use web_sys as web;

mod helpers;
mod mesh;
mod targets;
use mesh::{DrawItem, Vertex};
use targets::DepthTarget;

static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    dir_light: [f32; 4],
    spot_pos: [f32; 4],
    spot_params: [f32; 4],
    ambient: [f32; 4],
}

impl GlobalUniforms {
    fn new(camera: &PerspectiveCamera) -> Self {
        let dir = (-DIRECTIONAL_LIGHT_POSITION).normalize();
        let ambient = hex_to_linear_rgb(AMBIENT_LIGHT_COLOR).map(|c| c * AMBIENT_LIGHT_INTENSITY);
        // penumbra 1 fades all the way to the cone axis
        let inner = SPOT_LIGHT_ANGLE * (1.0 - SPOT_LIGHT_PENUMBRA);
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            dir_light: dir.extend(DIRECTIONAL_LIGHT_INTENSITY).to_array(),
            spot_pos: SPOT_LIGHT_POSITION.extend(SPOT_LIGHT_INTENSITY).to_array(),
            spot_params: [SPOT_LIGHT_ANGLE.cos(), inner.cos(), SPOT_LIGHT_RANGE, 0.0],
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
        }
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    depth: DepthTarget,
    pipeline: wgpu::RenderPipeline,
    object_layout: wgpu::BindGroupLayout,
    globals: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    ground: DrawItem,
    model: Vec<DrawItem>,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // Browsers usually expose only non-sRGB canvas formats; render through an sRGB view
        let view_format = format.add_srgb_suffix();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: if view_format != format {
                vec![view_format]
            } else {
                vec![]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = DepthTarget::new(&device, width, height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let globals_layout = helpers::uniform_layout(&device, "globals_bgl");
        let object_layout = helpers::uniform_layout(&device, "object_bgl");
        let pipeline = create_scene_pipeline(
            &device,
            &shader,
            &[&globals_layout, &object_layout],
            view_format,
        );
        let (globals, globals_bg) = helpers::uniform_binding(
            &device,
            &globals_layout,
            "globals",
            std::mem::size_of::<GlobalUniforms>() as u64,
        );

        let ground = DrawItem::new(
            &device,
            &object_layout,
            Rc::new(mesh::ground_plane(&device, GROUND_SIZE)),
            Mat4::from_translation(Vec3::new(0.0, GROUND_Y, 0.0)),
            {
                let [r, g, b] = hex_to_linear_rgb(GROUND_COLOR);
                [r, g, b, 1.0]
            },
        );

        let [r, g, b] = hex_to_linear_rgb(CLEAR_COLOR);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format,
            depth,
            pipeline,
            object_layout,
            globals,
            globals_bg,
            ground,
            model: Vec::new(),
            width,
            height,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
        })
    }

    /// Upload the loaded model's meshes. Replaces any previous upload.
    pub fn upload_model(&mut self, scene: &SceneGraph) {
        self.model = mesh::build_model_draws(&self.device, &self.object_layout, scene);
        log::info!("[gpu] model uploaded: {} draws", self.model.len());
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.reconfigure();
        }
    }

    fn reconfigure(&mut self) {
        self.config.width = self.width;
        self.config.height = self.height;
        self.surface.configure(&self.device, &self.config);
        self.depth.recreate(&self.device, self.width, self.height);
    }

    /// Draw the ground and the model (placed by `model_root`) from `camera`.
    pub fn render(
        &mut self,
        camera: &PerspectiveCamera,
        model_root: Mat4,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.view_format),
            ..Default::default()
        });

        let globals = GlobalUniforms::new(camera);
        self.queue
            .write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));
        self.ground.write(&self.queue, Mat4::IDENTITY);
        for item in &self.model {
            item.write(&self.queue, model_root);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.globals_bg, &[]);
            self.ground.draw(&mut rpass);
            for item in &self.model {
                item.draw(&mut rpass);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene_pl"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            // ground is double sided and asset winding is not trusted
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: helpers::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

/// Logs and swallows init failures; the page keeps its DOM overlay without WebGPU.
pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<GpuState> {
    match GpuState::new(canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}
