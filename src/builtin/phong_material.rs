use crate::camera::Camera;
use crate::context::Context;
use crate::light::LightCollection;
use crate::resource::VERTEX_INDEX_FORMAT;
use crate::scene::Object;
use bytemuck::{Pod, Zeroable};
use glamx::{Mat3, Pose3, Vec3, Vec4Swizzles};
use std::sync::Arc;

/// Frame-level uniforms (view, projection, lights).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    light_position: [f32; 3],
    light_intensity: f32,
    light_color: [f32; 3],
    _pad0: f32,
    ambient: [f32; 3],
    _pad1: f32,
}

/// Object-level uniforms (transform, scale, Phong parameters).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniforms {
    transform: [[f32; 4]; 4],
    ntransform: [[f32; 4]; 3], // mat3x3 padded to mat3x4 for alignment
    scale: [[f32; 4]; 3],      // mat3x3 padded to mat3x4 for alignment
    color: [f32; 4],
    specular: [f32; 3],
    shininess: f32,
}

fn pad_mat3(m: Mat3) -> [[f32; 4]; 3] {
    let cols = m.to_cols_array_2d();
    [
        [cols[0][0], cols[0][1], cols[0][2], 0.0],
        [cols[1][0], cols[1][1], cols[1][2], 0.0],
        [cols[2][0], cols[2][1], cols[2][2], 0.0],
    ]
}

/// Per-object GPU resources for the Phong material.
pub struct ObjectGpu {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    // Cached texture bind group with pointer to detect texture changes.
    texture_bind_group: Option<wgpu::BindGroup>,
    cached_texture_ptr: usize,
}

/// The Phong material.
///
/// Holds the shared pipeline, bind group layouts and the frame uniform
/// buffer; per-object uniforms live in [`ObjectGpu`] instances created on
/// first use.
pub struct PhongMaterial {
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    pipeline_cull: wgpu::RenderPipeline,
    pipeline_no_cull: wgpu::RenderPipeline,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl PhongMaterial {
    /// Creates the Phong material.
    ///
    /// Requires an initialized [`Context`].
    pub fn new() -> PhongMaterial {
        let ctxt = Context::get();

        let frame_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("phong_frame_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let object_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("phong_object_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("phong_texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
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

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("phong_pipeline_layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &object_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let shader = ctxt.create_shader_module(Some("phong_shader"), include_str!("phong.wgsl"));

        let vertex_buffer_layouts = [
            // Buffer 0: Vertex positions
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
            // Buffer 1: Texture coordinates
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
            // Buffer 2: Normals
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
        ];

        let create_pipeline = |cull_mode: Option<wgpu::Face>, label: &str| {
            ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_buffer_layouts,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctxt.surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: Context::depth_format(),
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        let pipeline_cull = create_pipeline(Some(wgpu::Face::Back), "phong_pipeline_cull");
        let pipeline_no_cull = create_pipeline(None, "phong_pipeline_no_cull");

        let frame_uniform_buffer = ctxt.create_buffer(&wgpu::BufferDescriptor {
            label: Some("phong_frame_uniform_buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("phong_frame_bind_group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        PhongMaterial {
            frame_uniform_buffer,
            frame_bind_group,
            object_bind_group_layout,
            texture_bind_group_layout,
            pipeline_cull,
            pipeline_no_cull,
        }
    }

    /// Writes the frame uniforms for the current camera and light collection.
    ///
    /// The point light position is transformed into view space here so the
    /// shader never needs the camera position.
    pub fn prepare_frame(&self, camera: &mut dyn Camera, lights: &LightCollection) {
        let ctxt = Context::get();
        let (view, proj) = camera.view_proj_pair();
        let view_mat = view.to_mat4();

        let (light_position, light_color, light_intensity) = match lights.primary() {
            Some(light) => (
                (view_mat * light.world_position.extend(1.0)).xyz(),
                light.color,
                light.intensity,
            ),
            None => (Vec3::ZERO, Vec3::ONE, 0.0),
        };

        let frame_uniforms = FrameUniforms {
            view: view_mat.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            light_position: light_position.into(),
            light_intensity,
            light_color: light_color.into(),
            _pad0: 0.0,
            ambient: lights.ambient.into(),
            _pad1: 0.0,
        };

        ctxt.write_buffer(
            &self.frame_uniform_buffer,
            0,
            bytemuck::bytes_of(&frame_uniforms),
        );
    }

    /// Writes the per-object uniforms and refreshes the texture bind group.
    ///
    /// Consumes the texture's needs-update flag: pending pixels are uploaded
    /// and rebound here.
    pub fn prepare_object(&self, object: &mut Object, transform: Pose3, scale: Vec3) {
        let ctxt = Context::get();

        if object.gpu.is_none() {
            let uniform_buffer = ctxt.create_buffer(&wgpu::BufferDescriptor {
                label: Some("phong_object_uniform_buffer"),
                size: std::mem::size_of::<ObjectUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("phong_object_bind_group"),
                layout: &self.object_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

            object.gpu = Some(ObjectGpu {
                uniform_buffer,
                bind_group,
                texture_bind_group: None,
                cached_texture_ptr: 0,
            });
        }

        let color = object.data().color();
        let specular = object.data().specular();
        let shininess = object.data().shininess();
        let texture = object.data().texture().clone();

        // Uploads pending pixels and lowers the needs-update flag.
        let gpu_texture = texture.borrow_mut().gpu_texture();

        let gpu = object.gpu.as_mut().unwrap();

        let object_uniforms = ObjectUniforms {
            transform: transform.to_mat4().to_cols_array_2d(),
            ntransform: pad_mat3(Mat3::from_quat(transform.rotation)),
            scale: pad_mat3(Mat3::from_diagonal(scale)),
            color: [color.r, color.g, color.b, color.a],
            specular: [specular.r, specular.g, specular.b],
            shininess,
        };

        ctxt.write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&object_uniforms));

        // Rebind the texture if it changed (a fresh upload yields a new allocation).
        let texture_ptr = Arc::as_ptr(&gpu_texture) as usize;
        if gpu.texture_bind_group.is_none() || gpu.cached_texture_ptr != texture_ptr {
            gpu.texture_bind_group = Some(ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("phong_texture_bind_group"),
                layout: &self.texture_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&gpu_texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&gpu_texture.sampler),
                    },
                ],
            }));
            gpu.cached_texture_ptr = texture_ptr;
        }
    }

    /// Issues the draw call for an object prepared by
    /// [`prepare_object`](Self::prepare_object).
    pub fn draw_object(&self, object: &mut Object, render_pass: &mut wgpu::RenderPass<'_>) {
        let mesh_rc = object.mesh().clone();
        let mut mesh = mesh_rc.borrow_mut();
        let num_indices = mesh.num_indices();
        if num_indices == 0 {
            return;
        }

        let cull = object.data().backface_culling_enabled();
        let gpu = match object.gpu.as_ref() {
            Some(gpu) => gpu,
            None => return,
        };
        let texture_bind_group = match gpu.texture_bind_group.as_ref() {
            Some(bind_group) => bind_group,
            None => return,
        };

        let buffers = mesh.ensure_on_gpu();

        let pipeline = if cull {
            &self.pipeline_cull
        } else {
            &self.pipeline_no_cull
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        render_pass.set_bind_group(1, &gpu.bind_group, &[]);
        render_pass.set_bind_group(2, texture_bind_group, &[]);

        render_pass.set_vertex_buffer(0, buffers.coords.slice(..));
        render_pass.set_vertex_buffer(1, buffers.uvs.slice(..));
        render_pass.set_vertex_buffer(2, buffers.normals.slice(..));
        render_pass.set_index_buffer(buffers.faces.slice(..), VERTEX_INDEX_FORMAT);

        render_pass.draw_indexed(0..num_indices, 0, 0..1);
    }
}
