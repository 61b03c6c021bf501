use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use playground::{CompileError, DrawCall, GraphicsBackend};

use crate::context::GpuContext;
use crate::pipeline::{self, PaneUniforms, PipelineLayouts, QUAD_VERTEX_COUNT};

/// A successfully linked pane program. Dropping it releases the pipeline.
pub struct PaneProgram {
    pipeline: wgpu::RenderPipeline,
}

struct ActiveFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Shared per-window GPU state: context, static quad geometry, and the
/// swapchain texture acquired for the frame in flight.
pub struct SurfaceShell {
    context: GpuContext,
    layouts: PipelineLayouts,
    frame: Option<ActiveFrame>,
}

impl SurfaceShell {
    pub fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Rc<RefCell<Self>>>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size)?;
        let layouts = PipelineLayouts::new(&context.device)?;
        Ok(Rc::new(RefCell::new(Self {
            context,
            layouts,
            frame: None,
        })))
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// Acquires this frame's swapchain texture and clears the window once;
    /// pane draws then load on top of it.
    pub fn begin_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let texture = self.context.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("clear pass"),
                });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));

        self.frame = Some(ActiveFrame { texture, view });
        Ok(())
    }

    /// Presents the frame acquired by [`begin_frame`](Self::begin_frame);
    /// a no-op when no frame is in flight.
    pub fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.texture.present();
        }
    }

    fn compile_program(&self, wrapped_source: &str) -> Result<PaneProgram, CompileError> {
        pipeline::parse_fragment(wrapped_source)?;

        // A module that parsed can still fail pipeline validation; the error
        // scope turns that into a CompileError instead of a device loss.
        let device = &self.context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pane fragment"),
            source: wgpu::ShaderSource::Glsl {
                shader: wrapped_source.to_string().into(),
                stage: wgpu::naga::ShaderStage::Fragment,
                defines: &[],
            },
        });
        let render_pipeline =
            pipeline::build_pipeline(device, &self.layouts, self.context.config.format, &module);
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(CompileError {
                raw_log: error.to_string(),
            });
        }

        Ok(PaneProgram {
            pipeline: render_pipeline,
        })
    }

    fn draw_pane(
        &mut self,
        program: &PaneProgram,
        uniform_buffer: &wgpu::Buffer,
        bind_group: &wgpu::BindGroup,
        call: DrawCall,
    ) {
        let Some(frame) = self.frame.as_ref() else {
            tracing::trace!("no acquired frame; skipping pane draw");
            return;
        };
        let surface = self.context.size;
        let (x, y) = call.origin;
        let (width, height) = call.resolution;
        if width == 0
            || height == 0
            || x.saturating_add(width) > surface.width
            || y.saturating_add(height) > surface.height
        {
            // The window shrank below the static layout; hidden panes skip
            // their draw rather than tripping viewport validation.
            tracing::trace!(
                origin = ?call.origin,
                resolution = ?call.resolution,
                "pane outside surface; skipping draw"
            );
            return;
        }

        self.context.queue.write_buffer(
            uniform_buffer,
            0,
            bytemuck::bytes_of(&PaneUniforms::new(&call)),
        );

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("pane draw"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pane pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_viewport(x as f32, y as f32, width as f32, height as f32, 0.0, 1.0);
            pass.set_scissor_rect(x, y, width, height);
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.set_vertex_buffer(0, self.layouts.quad_buffer.slice(..));
            pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Per-pane handle onto the shared surface; owns the pane's uniform buffer.
pub struct PaneCanvas {
    shell: Rc<RefCell<SurfaceShell>>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PaneCanvas {
    pub fn new(shell: &Rc<RefCell<SurfaceShell>>) -> Self {
        let (uniform_buffer, bind_group) = {
            let shell = shell.borrow();
            let device = &shell.context.device;
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("pane uniform buffer"),
                size: std::mem::size_of::<PaneUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("pane uniform bind group"),
                layout: &shell.layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            (uniform_buffer, bind_group)
        };
        Self {
            shell: Rc::clone(shell),
            uniform_buffer,
            bind_group,
        }
    }
}

impl GraphicsBackend for PaneCanvas {
    type Program = PaneProgram;

    fn compile(&mut self, wrapped_source: &str) -> Result<PaneProgram, CompileError> {
        self.shell.borrow().compile_program(wrapped_source)
    }

    fn draw(&mut self, program: &PaneProgram, call: DrawCall) {
        self.shell
            .borrow_mut()
            .draw_pane(program, &self.uniform_buffer, &self.bind_group, call);
    }

    fn release(&mut self, program: PaneProgram) {
        // wgpu reclaims the pipeline when the handle drops, which only
        // happens after the replacement program is already in place.
        drop(program);
    }
}
