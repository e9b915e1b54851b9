/// Initialization parameters for the wgpu context.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// The `Auto*` modes always resolve to something the surface supports.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface. A hint only.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Default parameters with the present mode derived from a vsync flag.
    pub fn for_vsync(vsync: bool) -> Self {
        Self {
            present_mode: present_mode_for(vsync),
            ..Self::default()
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

pub(crate) fn present_mode_for(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_flag_selects_present_mode() {
        assert_eq!(GpuInit::for_vsync(true).present_mode, wgpu::PresentMode::AutoVsync);
        assert_eq!(GpuInit::for_vsync(false).present_mode, wgpu::PresentMode::AutoNoVsync);
    }

    #[test]
    fn for_vsync_keeps_other_defaults() {
        let init = GpuInit::for_vsync(false);
        assert!(init.prefer_srgb);
        assert_eq!(init.desired_maximum_frame_latency, 2);
        assert!(init.alpha_mode.is_none());
    }
}
