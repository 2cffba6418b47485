//! Overlay renderer
//!
//! Draws every button as an alpha-blended colored quad (two triangles) so the
//! overlay never fully obscures the scene underneath. GPU resources are
//! created lazily on the first draw and can be dropped and transparently
//! recreated, which tolerates context loss and makes shutdown resettable
//! rather than terminal.

use tracing::{debug, error};
use wgpu::{Buffer, Device, Queue, RenderPass, RenderPipeline, TextureFormat};

use super::buttons::{ButtonSet, MAX_BUTTONS};

/// Tint for buttons currently held down
const PRESSED_COLOR: [f32; 4] = [0.2, 0.6, 0.2, 0.7];
/// Tint for idle buttons
const RELEASED_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 0.4];

/// WGSL shader for the button quads
///
/// Vertices arrive already in clip space; the shader only forwards position
/// and per-vertex color.
const OVERLAY_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Vertex data for button quads
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Generates six clip-space vertices per button
///
/// Normalized bounds are first projected to whole pixels using the stored
/// window size, then mapped to clip space with `2*px/w - 1` horizontally and
/// `1 - 2*py/h` vertically (pixel origin is top-left, clip origin is the
/// center with y up).
fn build_vertices(buttons: &ButtonSet) -> Vec<Vertex> {
    let w = buttons.width() as f32;
    let h = buttons.height() as f32;

    let mut vertices = Vec::with_capacity(buttons.len() * 6);
    for button in buttons.iter() {
        let px = (button.bounds.x * w).floor();
        let py = (button.bounds.y * h).floor();
        let pw = (button.bounds.width * w).floor();
        let ph = (button.bounds.height * h).floor();

        let x1 = 2.0 * px / w - 1.0;
        let y1 = 1.0 - 2.0 * py / h;
        let x2 = 2.0 * (px + pw) / w - 1.0;
        let y2 = 1.0 - 2.0 * (py + ph) / h;

        let color = if button.pressed {
            PRESSED_COLOR
        } else {
            RELEASED_COLOR
        };

        let corner = |x, y| Vertex {
            position: [x, y],
            color,
        };

        vertices.extend_from_slice(&[
            corner(x1, y1),
            corner(x2, y1),
            corner(x2, y2),
            corner(x1, y1),
            corner(x2, y2),
            corner(x1, y2),
        ]);
    }
    vertices
}

/// Overlay quad renderer with a two-state resource lifecycle
///
/// Uninitialized until the first draw; `shutdown` returns it to that state.
pub struct OverlayRenderer {
    pipeline: Option<RenderPipeline>,
    vertex_buffer: Option<Buffer>,
    vertex_count: u32,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self {
            pipeline: None,
            vertex_buffer: None,
            vertex_count: 0,
        }
    }

    /// Creates the pipeline and vertex buffer if they do not exist yet
    ///
    /// Creation errors (for example a shader that fails validation) are
    /// captured in an error scope, logged, and leave the renderer
    /// uninitialized so the next draw retries instead of crashing the host's
    /// frame loop.
    fn ensure_ready(&mut self, device: &Device, format: TextureFormat) {
        if self.pipeline.is_some() {
            return;
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(OVERLAY_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // No depth attachment and blending scoped to this pipeline: the
            // overlay composes with the host's pass without save/restore.
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Vertex Buffer"),
            size: (6 * MAX_BUTTONS * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            error!(error = %e, "Failed to create overlay pipeline, will retry next frame");
            return;
        }

        debug!("Overlay pipeline created");
        self.pipeline = Some(pipeline);
        self.vertex_buffer = Some(vertex_buffer);
    }

    /// Records the overlay draw into the host's render pass
    ///
    /// Call once per frame after the host has drawn the scene. A no-op when
    /// no buttons are registered or while the pipeline is unavailable.
    pub fn draw(
        &mut self,
        device: &Device,
        queue: &Queue,
        format: TextureFormat,
        buttons: &ButtonSet,
        rpass: &mut RenderPass<'_>,
    ) {
        if buttons.is_empty() {
            return;
        }

        self.ensure_ready(device, format);
        let (Some(pipeline), Some(vertex_buffer)) = (&self.pipeline, &self.vertex_buffer) else {
            return;
        };

        let vertices = build_vertices(buttons);
        self.vertex_count = vertices.len() as u32;
        queue.write_buffer(vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }

    /// Releases GPU resources
    ///
    /// Idempotent, and not terminal: the next draw recreates everything.
    pub fn shutdown(&mut self) {
        if self.pipeline.take().is_some() {
            debug!("Overlay pipeline released");
        }
        self.vertex_buffer = None;
        self.vertex_count = 0;
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::overlay::buttons::NormRect;

    #[test]
    fn test_build_vertices_empty_set() {
        let buttons = ButtonSet::new(800, 600);
        assert!(build_vertices(&buttons).is_empty());
    }

    #[test]
    fn test_build_vertices_clip_space_mapping() {
        let mut buttons = ButtonSet::new(800, 600);
        // Covers the top-left quadrant: pixels (0, 0) to (400, 300)
        buttons
            .register(NormRect::new(0.0, 0.0, 0.5, 0.5), KeyCode::Enter)
            .unwrap();

        let vertices = build_vertices(&buttons);
        assert_eq!(vertices.len(), 6);

        // Top-left pixel corner maps to clip (-1, 1), the quadrant's far
        // corner to the clip-space center
        assert_eq!(vertices[0].position, [-1.0, 1.0]);
        assert_eq!(vertices[2].position, [0.0, 0.0]);
    }

    #[test]
    fn test_build_vertices_colors_follow_press_state() {
        let mut buttons = ButtonSet::new(800, 600);
        buttons
            .register(NormRect::new(0.0, 0.0, 0.5, 0.5), KeyCode::Enter)
            .unwrap();
        buttons
            .register(NormRect::new(0.5, 0.5, 0.5, 0.5), KeyCode::Space)
            .unwrap();

        for button in buttons.iter_mut() {
            if button.id.0 == 0 {
                button.pressed = true;
            }
        }

        let vertices = build_vertices(&buttons);
        assert_eq!(vertices.len(), 12);
        assert!(vertices[..6].iter().all(|v| v.color == PRESSED_COLOR));
        assert!(vertices[6..].iter().all(|v| v.color == RELEASED_COLOR));
    }

    #[test]
    fn test_build_vertices_two_triangles_share_diagonal() {
        let mut buttons = ButtonSet::new(100, 100);
        buttons
            .register(NormRect::new(0.2, 0.2, 0.6, 0.6), KeyCode::Enter)
            .unwrap();

        let vertices = build_vertices(&buttons);
        // Both triangles share the (x1, y1) and (x2, y2) corners
        assert_eq!(vertices[0].position, vertices[3].position);
        assert_eq!(vertices[2].position, vertices[4].position);
    }
}
