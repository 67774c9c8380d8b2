//! The shading-program provider: the enumerated pipeline set every pass
//! selects from, plus the bind group layouts and samplers they share.
//!
//! Render state that the underlying API splits across shaders, rasterizer,
//! blend, and depth objects is baked here into one pipeline per combination
//! the renderer actually uses: each lit shader kind in both culling modes,
//! the depth-only paths for the shadow pass, and the fixed-function portal /
//! marker / transparent paths.

use crate::gpu::{DEPTH_FORMAT, GpuContext};
use crate::texture::Texture;

/// The lit-model shader assignments, in the fixed order the lit passes walk
/// the model buckets. The generic pixel-lighting shader is last so models
/// default into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderKind {
    Wiggle,
    NormalMap,
    Fade,
    PixelLighting,
}

impl ShaderKind {
    pub const COUNT: usize = 4;
    /// Bucket walk order for the lit passes.
    pub const ALL: [ShaderKind; Self::COUNT] = [
        ShaderKind::Wiggle,
        ShaderKind::NormalMap,
        ShaderKind::Fade,
        ShaderKind::PixelLighting,
    ];

    pub fn index(self) -> usize {
        match self {
            ShaderKind::Wiggle => 0,
            ShaderKind::NormalMap => 1,
            ShaderKind::Fade => 2,
            ShaderKind::PixelLighting => 3,
        }
    }

    fn vertex_entry(self) -> &'static str {
        match self {
            ShaderKind::Wiggle => "vs_wiggle",
            _ => "vs_lit",
        }
    }

    fn fragment_entry(self) -> &'static str {
        match self {
            ShaderKind::Wiggle => "fs_wiggle",
            ShaderKind::NormalMap => "fs_normal_map",
            ShaderKind::Fade => "fs_fade",
            ShaderKind::PixelLighting => "fs_lit",
        }
    }

    /// Whether this kind binds a secondary texture slot.
    pub fn dual_texture(self) -> bool {
        matches!(self, ShaderKind::NormalMap | ShaderKind::Fade)
    }
}

/// Where a new model should be batched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderAssignment {
    Wiggle,
    NormalMap,
    Fade,
    PixelLighting,
    /// Alpha-blended; routed to the dedicated transparent bucket.
    Transparent,
}

impl ShaderAssignment {
    /// The lit bucket this assignment maps to, or `None` for transparent.
    pub fn lit_kind(self) -> Option<ShaderKind> {
        match self {
            ShaderAssignment::Wiggle => Some(ShaderKind::Wiggle),
            ShaderAssignment::NormalMap => Some(ShaderKind::NormalMap),
            ShaderAssignment::Fade => Some(ShaderKind::Fade),
            ShaderAssignment::PixelLighting => Some(ShaderKind::PixelLighting),
            ShaderAssignment::Transparent => None,
        }
    }
}

/// Every render pipeline and shared layout/sampler the passes use.
pub struct Pipelines {
    /// Frame uniforms + shadow atlas + comparison sampler (lit passes).
    pub frame_layout: wgpu::BindGroupLayout,
    /// Frame uniforms only (shadow passes, where the atlas is the target).
    pub frame_depth_layout: wgpu::BindGroupLayout,
    /// Per-model uniforms with dynamic offset.
    pub model_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    material_dual_layout: wgpu::BindGroupLayout,

    /// Lit pipelines indexed by shader kind, then `[no-cull, back-cull]`.
    lit: [[wgpu::RenderPipeline; 2]; ShaderKind::COUNT],
    pub portal_body: wgpu::RenderPipeline,
    pub marker: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub depth_cull_back: wgpu::RenderPipeline,
    pub depth_cull_none: wgpu::RenderPipeline,
    pub depth_transparent: wgpu::RenderPipeline,

    pub shadow_sampler: wgpu::Sampler,
}

/// Culling mode selector for the lit bucket sweeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullMode {
    None,
    Back,
}

impl CullMode {
    fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }
}

/// Blend/depth selection for the fixed-function pipelines.
enum BlendChoice {
    Replace,
    Additive,
    Multiplicative,
}

impl BlendChoice {
    fn state(&self) -> wgpu::BlendState {
        match self {
            BlendChoice::Replace => wgpu::BlendState::REPLACE,
            BlendChoice::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::Zero,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
            BlendChoice::Multiplicative => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::Zero,
                    dst_factor: wgpu::BlendFactor::Src,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::Zero,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}

fn depth_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

impl Pipelines {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let frame_uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: None,
            },
            count: None,
        };

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                frame_uniform_entry,
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let frame_depth_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Depth Bind Group Layout"),
            entries: &[frame_uniform_entry],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[texture_entry(0), sampler_entry],
        });

        let material_dual_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Dual Material Bind Group Layout"),
                entries: &[texture_entry(0), sampler_entry, texture_entry(2)],
            });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let lit_layout = |material: &wgpu::BindGroupLayout| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Lit Pipeline Layout"),
                bind_group_layouts: &[&frame_layout, &model_layout, material],
                push_constant_ranges: &[],
            })
        };
        let single_layout = lit_layout(&material_layout);
        let dual_layout = lit_layout(&material_dual_layout);

        let color_pipeline = |label: &str,
                              layout: &wgpu::PipelineLayout,
                              vs: &str,
                              fs: &str,
                              cull: CullMode,
                              blend: BlendChoice,
                              depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs),
                    buffers: &[crate::mesh::Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(blend.state()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: cull.to_wgpu(),
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(depth_state(depth_write)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let lit = std::array::from_fn(|i| {
            let kind = ShaderKind::ALL[i];
            let layout = if kind.dual_texture() {
                &dual_layout
            } else {
                &single_layout
            };
            [CullMode::None, CullMode::Back].map(|cull| {
                color_pipeline(
                    "Lit Pipeline",
                    layout,
                    kind.vertex_entry(),
                    kind.fragment_entry(),
                    cull,
                    BlendChoice::Replace,
                    true,
                )
            })
        });

        let portal_body = color_pipeline(
            "Portal Body Pipeline",
            &dual_layout,
            "vs_lit",
            "fs_portal",
            CullMode::Back,
            BlendChoice::Replace,
            true,
        );
        let marker = color_pipeline(
            "Light Marker Pipeline",
            &single_layout,
            "vs_lit",
            "fs_marker",
            CullMode::None,
            BlendChoice::Additive,
            false,
        );
        let transparent = color_pipeline(
            "Transparent Pipeline",
            &single_layout,
            "vs_lit",
            "fs_transparent",
            CullMode::None,
            BlendChoice::Multiplicative,
            false,
        );

        let depth_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth Pipeline Layout"),
            bind_group_layouts: &[&frame_depth_layout, &model_layout],
            push_constant_ranges: &[],
        });
        let depth_pipeline = |label: &str, cull: CullMode, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&depth_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_lit"),
                    buffers: &[crate::mesh::Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: cull.to_wgpu(),
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(depth_state(depth_write)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let depth_cull_back = depth_pipeline("Depth Pipeline (cull back)", CullMode::Back, true);
        let depth_cull_none = depth_pipeline("Depth Pipeline (no cull)", CullMode::None, true);
        let depth_transparent =
            depth_pipeline("Depth Pipeline (transparent)", CullMode::None, false);

        Self {
            frame_layout,
            frame_depth_layout,
            model_layout,
            material_layout,
            material_dual_layout,
            lit,
            portal_body,
            marker,
            transparent,
            depth_cull_back,
            depth_cull_none,
            depth_transparent,
            shadow_sampler,
        }
    }

    /// The lit pipeline for a shader kind and culling mode.
    pub fn lit(&self, kind: ShaderKind, cull: CullMode) -> &wgpu::RenderPipeline {
        let cull_index = match cull {
            CullMode::None => 0,
            CullMode::Back => 1,
        };
        &self.lit[kind.index()][cull_index]
    }

    /// A single-texture material bind group.
    pub fn material(&self, gpu: &GpuContext, texture: &Texture) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// A dual-texture material bind group; the secondary slot carries a
    /// normal map, fade partner, or portal capture.
    pub fn material_dual(
        &self,
        gpu: &GpuContext,
        base: &Texture,
        secondary: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Dual Material Bind Group"),
            layout: &self.material_dual_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&base.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&base.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(secondary),
                },
            ],
        })
    }
}
