/// Represents a single acquired frame.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// one, so it lives only between `begin_frame` and `end_frame`.
pub(crate) struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
