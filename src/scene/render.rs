//! Per-frame pass execution: light-data aggregation, the shadow / portal /
//! main sequence, and the lit-scene renderer shared by the portal and main
//! passes.

use bytemuck::Zeroable;
use glam::{Mat4, Vec3};

use crate::assets::{Assets, TextureKind};
use crate::gpu::GpuContext;
use crate::model::Model;
use crate::pipeline::{CullMode, Pipelines, ShaderKind};
use crate::portal::Portal;
use crate::scene::frame::{FramePlan, FrameUniforms, ModelUniforms, Pass, UniformRing};
use crate::scene::manager::{SHADOW_MAP_SIZE, SceneManager};

impl SceneManager {
    /// Renders one frame.
    ///
    /// The sequence is strict and re-entrancy free: every spotlight's
    /// shadow pass, then every renderable portal's pass in registration
    /// order, then the main pass, then present. All passes are encoded into
    /// one submission; each gets its own slot in the frame uniform ring, so
    /// the shading data is frozen once aggregated.
    pub fn render(&mut self, gpu: &GpuContext) {
        self.window_depth.ensure_size(gpu);

        // Aggregate every active light into the frame's shading block; the
        // per-pass slots only vary in camera matrices.
        let base = self.shading_block();

        let renderable: Vec<bool> = self.portals.iter().map(Portal::is_renderable).collect();
        let plan = FramePlan::build(self.lights.spots().len(), &renderable);

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(err) => {
                log::error!("failed to acquire surface texture: {err}");
                return;
            }
        };
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.frame_ring.ensure_capacity(gpu, plan.len() as u32);
        self.model_ring
            .ensure_capacity(gpu, (plan.len() * self.drawables_per_pass().max(1)) as u32);
        self.frame_ring.reset();
        self.model_ring.reset();

        // Rebuilt each frame: the rings may have been reallocated above.
        let frame_bg = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &self.pipelines.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: self.frame_ring.buffer(),
                        offset: 0,
                        size: Some(self.frame_ring.binding_size()),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.shadow_atlas.array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.pipelines.shadow_sampler),
                },
            ],
        });
        let frame_depth_bg = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Depth Bind Group"),
            layout: &self.pipelines.frame_depth_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: self.frame_ring.buffer(),
                    offset: 0,
                    size: Some(self.frame_ring.binding_size()),
                }),
            }],
        });
        let model_bg = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &self.pipelines.model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: self.model_ring.buffer(),
                    offset: 0,
                    size: Some(self.model_ring.binding_size()),
                }),
            }],
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        for pass in plan.passes() {
            match *pass {
                Pass::Shadow { light } => {
                    self.encode_shadow_pass(gpu, &mut encoder, light, &base, &frame_depth_bg, &model_bg)
                }
                Pass::Portal { portal } => {
                    self.encode_portal_pass(gpu, &mut encoder, portal, &base, &frame_bg, &model_bg)
                }
                Pass::Main => {
                    self.encode_main_pass(gpu, &mut encoder, &base, &screen_view, &frame_bg, &model_bg)
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Copies every active light into a shading block, camera fields left
    /// for the per-pass fill.
    fn shading_block(&self) -> FrameUniforms {
        let mut block = FrameUniforms::zeroed();

        for (entry, light) in block.point_lights.iter_mut().zip(self.lights.points()) {
            entry.colour = (light.colour() * light.strength()).extend(1.0).to_array();
            entry.position = light.position().extend(1.0).to_array();
        }
        for (entry, light) in block.spot_lights.iter_mut().zip(self.lights.spots()) {
            if let Some(shadow) = light.spot_shadow() {
                entry.colour = (light.colour() * light.strength()).extend(1.0).to_array();
                entry.position = light.position().extend(1.0).to_array();
                entry.facing = light.facing().extend(shadow.cos_half_angle).to_array();
                entry.view = shadow.view.to_cols_array_2d();
                entry.projection = shadow.projection.to_cols_array_2d();
            }
        }
        if let Some(light) = self.lights.directionals().first() {
            block.directional_light.colour =
                (light.colour() * light.strength()).extend(1.0).to_array();
            block.directional_light.direction = light.facing().extend(0.0).to_array();
        }

        block.counts = [
            self.lights.points().len() as u32,
            self.lights.spots().len() as u32,
            self.lights.directionals().len() as u32,
            0,
        ];
        block.ambient_colour = self.ambient_colour.extend(1.0).to_array();
        block.timing = [self.wiggle_timer, 0.0, 0.0, 0.0];
        block
    }

    /// Depth-only render of all shadow casters into one spotlight's atlas
    /// layer.
    fn encode_shadow_pass(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        light_index: usize,
        base: &FrameUniforms,
        frame_depth_bg: &wgpu::BindGroup,
        model_bg: &wgpu::BindGroup,
    ) {
        let Some(light) = self.lights.spots().get(light_index) else {
            return;
        };
        let Some(shadow) = light.spot_shadow() else {
            return;
        };
        let position = light.position();

        let uniforms = with_camera(base, shadow.view, shadow.projection, position, self.specular_power);
        let frame_offset = self.frame_ring.push(gpu, &uniforms);

        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_atlas.layer_views[light_index],
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rp.set_viewport(
            0.0,
            0.0,
            SHADOW_MAP_SIZE as f32,
            SHADOW_MAP_SIZE as f32,
            0.0,
            1.0,
        );
        rp.set_bind_group(0, frame_depth_bg, &[frame_offset]);

        let Self {
            assets,
            pipelines,
            models,
            featured,
            transparent,
            portals,
            model_ring,
            ..
        } = self;

        // Casters in two culling groups: generic geometry and portal bodies
        // back-face culled, then the featured group unculled.
        rp.set_pipeline(&pipelines.depth_cull_back);
        for model in models.iter().flatten() {
            draw_depth(gpu, &mut rp, assets, model_ring, model_bg, model);
        }
        for portal in portals.iter() {
            draw_depth(gpu, &mut rp, assets, model_ring, model_bg, portal.body());
        }

        rp.set_pipeline(&pipelines.depth_cull_none);
        for model in featured.iter().flatten() {
            draw_depth(gpu, &mut rp, assets, model_ring, model_bg, model);
        }

        // Alpha-blended geometry keeps read-only depth, so it never writes
        // into the shadow map.
        rp.set_pipeline(&pipelines.depth_transparent);
        for model in transparent.iter() {
            draw_depth(gpu, &mut rp, assets, model_ring, model_bg, model);
        }
    }

    /// Full lit-scene render into one portal's surface, through its own
    /// camera.
    fn encode_portal_pass(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        portal_index: usize,
        base: &FrameUniforms,
        frame_bg: &wgpu::BindGroup,
        model_bg: &wgpu::BindGroup,
    ) {
        let portal = &self.portals[portal_index];
        let Some(surface) = portal.surface() else {
            return;
        };
        let camera = *portal.camera();
        let (width, height) = (surface.width, surface.height);
        let aspect = width as f32 / height as f32;

        let uniforms = with_camera(
            base,
            camera.view_matrix(),
            camera.projection_matrix(aspect),
            camera.position,
            self.specular_power,
        );
        let frame_offset = self.frame_ring.push(gpu, &uniforms);

        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Portal Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &surface.target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.background),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.portal_depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rp.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
        rp.set_bind_group(0, frame_bg, &[frame_offset]);

        // The portal's own surface cannot be sampled while it is the
        // render target, so its body sits this pass out.
        self.draw_lit_scene(gpu, &mut rp, model_bg, Some(portal_index));
    }

    /// Full lit-scene render into the back buffer through the primary
    /// camera.
    fn encode_main_pass(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        base: &FrameUniforms,
        screen_view: &wgpu::TextureView,
        frame_bg: &wgpu::BindGroup,
        model_bg: &wgpu::BindGroup,
    ) {
        let camera = self.camera;
        let uniforms = with_camera(
            base,
            camera.view_matrix(),
            camera.projection_matrix(gpu.aspect()),
            camera.position,
            self.specular_power,
        );
        let frame_offset = self.frame_ring.push(gpu, &uniforms);

        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: screen_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.background),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.window_depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rp.set_viewport(0.0, 0.0, gpu.width() as f32, gpu.height() as f32, 0.0, 1.0);
        rp.set_bind_group(0, frame_bg, &[frame_offset]);

        self.draw_lit_scene(gpu, &mut rp, model_bg, None);
    }

    /// The lit-scene render shared by the portal and main passes: shader
    /// buckets in their fixed order across two culling sweeps, then portal
    /// bodies, light markers, and transparent models.
    fn draw_lit_scene(
        &mut self,
        gpu: &GpuContext,
        rp: &mut wgpu::RenderPass<'_>,
        model_bg: &wgpu::BindGroup,
        skip_portal: Option<usize>,
    ) {
        let Self {
            assets,
            pipelines,
            models,
            featured,
            transparent,
            portals,
            lights,
            model_ring,
            ..
        } = self;

        // The featured group renders first without culling so it lays down
        // depth before standard back-face culling resumes.
        for kind in ShaderKind::ALL {
            if featured[kind.index()].is_empty() {
                continue;
            }
            rp.set_pipeline(pipelines.lit(kind, CullMode::None));
            for model in &featured[kind.index()] {
                draw_lit(gpu, rp, pipelines, assets, model_ring, model_bg, model, kind);
            }
        }

        for kind in ShaderKind::ALL {
            if models[kind.index()].is_empty() {
                continue;
            }
            rp.set_pipeline(pipelines.lit(kind, CullMode::Back));
            for model in &models[kind.index()] {
                draw_lit(gpu, rp, pipelines, assets, model_ring, model_bg, model, kind);
            }
        }

        // Portal bodies, each with its own capture in the secondary slot.
        rp.set_pipeline(&pipelines.portal_body);
        for (index, portal) in portals.iter().enumerate() {
            if skip_portal == Some(index) {
                continue;
            }
            let body = portal.body();
            let bezel = assets.texture(body.texture(0).unwrap_or(TextureKind::Bezel));
            let capture = match portal.surface() {
                Some(surface) => &surface.shader_view,
                None => &bezel.view,
            };
            let material = pipelines.material_dual(gpu, bezel, capture);
            let offset = push_model(gpu, model_ring, body, Vec3::ONE);
            rp.set_bind_group(1, model_bg, &[offset]);
            rp.set_bind_group(2, &material, &[]);
            assets.mesh(body.mesh).draw(rp);
        }

        // Light markers, additive, depth read-only.
        rp.set_pipeline(&pipelines.marker);
        let flare = pipelines.material(gpu, assets.texture(TextureKind::Flare));
        rp.set_bind_group(2, &flare, &[]);
        for light in lights.iter() {
            let body = light.body();
            let offset = push_model(gpu, model_ring, body, light.colour());
            rp.set_bind_group(1, model_bg, &[offset]);
            assets.mesh(body.mesh).draw(rp);
        }

        // Transparent models last, in insertion order, multiplicative with
        // depth writes disabled.
        rp.set_pipeline(&pipelines.transparent);
        for model in transparent.iter() {
            let texture = assets.texture(model.texture(0).unwrap_or(TextureKind::Glass));
            let material = pipelines.material(gpu, texture);
            let offset = push_model(gpu, model_ring, model, Vec3::ONE);
            rp.set_bind_group(1, model_bg, &[offset]);
            rp.set_bind_group(2, &material, &[]);
            assets.mesh(model.mesh).draw(rp);
        }
    }
}

/// Fills the camera fields of a shading block for one pass.
fn with_camera(
    base: &FrameUniforms,
    view: Mat4,
    projection: Mat4,
    position: Vec3,
    specular_power: f32,
) -> FrameUniforms {
    let mut block = *base;
    block.view = view.to_cols_array_2d();
    block.projection = projection.to_cols_array_2d();
    block.view_projection = (projection * view).to_cols_array_2d();
    block.camera_position = position.extend(specular_power).to_array();
    block
}

/// Writes a model's uniforms into the ring and returns the slot offset.
fn push_model(gpu: &GpuContext, ring: &mut UniformRing, model: &Model, colour: Vec3) -> u32 {
    let world = model.world_matrix();
    let uniforms = ModelUniforms {
        world: world.to_cols_array_2d(),
        normal_matrix: world.inverse().transpose().to_cols_array_2d(),
        colour: colour.extend(1.0).to_array(),
        params: [model.wiggle_strength, 0.0, 0.0, 0.0],
    };
    ring.push(gpu, &uniforms)
}

/// Depth-only draw used by the shadow pass.
fn draw_depth(
    gpu: &GpuContext,
    rp: &mut wgpu::RenderPass<'_>,
    assets: &Assets,
    ring: &mut UniformRing,
    model_bg: &wgpu::BindGroup,
    model: &Model,
) {
    let offset = push_model(gpu, ring, model, Vec3::ONE);
    rp.set_bind_group(1, model_bg, &[offset]);
    assets.mesh(model.mesh).draw(rp);
}

/// Lit draw for one bucketed model, binding one or two textures depending
/// on the shader kind.
#[allow(clippy::too_many_arguments)]
fn draw_lit(
    gpu: &GpuContext,
    rp: &mut wgpu::RenderPass<'_>,
    pipelines: &Pipelines,
    assets: &Assets,
    ring: &mut UniformRing,
    model_bg: &wgpu::BindGroup,
    model: &Model,
    kind: ShaderKind,
) {
    let base = assets.texture(model.texture(0).unwrap_or(TextureKind::Stone));
    let material = if kind.dual_texture() {
        let secondary = assets.texture(model.texture(1).unwrap_or(TextureKind::BumpNormal));
        pipelines.material_dual(gpu, base, &secondary.view)
    } else {
        pipelines.material(gpu, base)
    };
    let offset = push_model(gpu, ring, model, Vec3::ONE);
    rp.set_bind_group(1, model_bg, &[offset]);
    rp.set_bind_group(2, &material, &[]);
    assets.mesh(model.mesh).draw(rp);
}
