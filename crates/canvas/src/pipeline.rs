use std::fmt::Write as _;

use anyhow::Result;
use wgpu::naga::front::glsl;
use wgpu::naga::ShaderStage;
use wgpu::util::DeviceExt;

use playground::{CompileError, DrawCall};

/// Minimal vertex shader for the full-screen quad: passes the clip-space
/// position straight through.
const VERTEX_SHADER_GLSL: &str = "\
#version 450
layout(location = 0) in vec2 a_position;
void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Full-screen quad as a four-vertex triangle strip covering clip space.
const QUAD_VERTICES: [f32; 8] = [-1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0];

pub(crate) const QUAD_VERTEX_COUNT: u32 = 4;

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

/// std140 mirror of the wrapper template's `PaneParams` uniform block.
/// The origin is the pane's viewport offset inside the shared surface; the
/// template's trailer subtracts it so `gl_FragCoord` becomes pane-local.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PaneUniforms {
    resolution: [f32; 3],
    time: f32,
    mouse: [f32; 4],
    origin: [f32; 2],
    _padding: [f32; 2],
}

impl PaneUniforms {
    pub(crate) fn new(call: &DrawCall) -> Self {
        Self {
            resolution: [call.resolution.0 as f32, call.resolution.1 as f32, 1.0],
            time: call.time_secs,
            mouse: call.pointer,
            origin: [call.origin.0 as f32, call.origin.1 as f32],
            _padding: [0.0, 0.0],
        }
    }
}

/// Resources shared by every pane program: the uniform bind group layout,
/// the quad vertex module, and the static quad geometry.
pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub vertex_module: wgpu::ShaderModule,
    pub quad_buffer: wgpu::Buffer,
}

impl PipelineLayouts {
    pub(crate) fn new(device: &wgpu::Device) -> Result<Self> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pane uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fullscreen quad vertex"),
            source: wgpu::ShaderSource::Glsl {
                shader: VERTEX_SHADER_GLSL.into(),
                stage: ShaderStage::Vertex,
                defines: &[],
            },
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fullscreen quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            uniform_layout,
            vertex_module,
            quad_buffer,
        })
    }
}

/// Runs naga's GLSL frontend over the wrapped source so a failure surfaces
/// as `ERROR: 0:<line>: <message>` records the diagnostic parser
/// understands, with line numbers relative to the wrapped source.
pub(crate) fn parse_fragment(source: &str) -> Result<(), CompileError> {
    let mut frontend = glsl::Frontend::default();
    match frontend.parse(&glsl::Options::from(ShaderStage::Fragment), source) {
        Ok(_module) => Ok(()),
        Err(errors) => {
            let mut raw_log = String::new();
            for error in &errors.errors {
                let offset = error
                    .meta
                    .to_range()
                    .map(|range| range.start)
                    .unwrap_or_default();
                let line = line_of_offset(source, offset);
                let _ = writeln!(raw_log, "ERROR: 0:{line}: {kind}", kind = error.kind);
            }
            Err(CompileError { raw_log })
        }
    }
}

fn line_of_offset(source: &str, offset: usize) -> usize {
    let clamped = offset.min(source.len());
    source[..clamped].bytes().filter(|&byte| byte == b'\n').count() + 1
}

/// Builds the render pipeline for one compiled fragment module, binding the
/// quad's single vertex attribute.
pub(crate) fn build_pipeline(
    device: &wgpu::Device,
    layouts: &PipelineLayouts,
    surface_format: wgpu::TextureFormat,
    fragment_module: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pane pipeline layout"),
        bind_group_layouts: &[&layouts.uniform_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("pane pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &layouts.vertex_module,
            entry_point: Some("main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &QUAD_ATTRIBUTES,
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
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
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}
