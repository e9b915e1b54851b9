use winit::dpi::PhysicalSize;

use crate::graphics::SurfaceErrorAction;

/// Picks the surface format.
///
/// With `prefer_srgb` the first supported sRGB candidate wins; otherwise, or
/// when none is supported, the surface's own first choice.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    const SRGB: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];

    let fallback = *caps.formats.first()?;
    if !prefer_srgb {
        return Some(fallback);
    }

    Some(
        SRGB.into_iter()
            .find(|f| caps.formats.contains(f))
            .unwrap_or(fallback),
    )
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    match requested {
        Some(mode) if caps.alpha_modes.contains(&mode) => mode,
        _ => caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
    }
}

/// Copies a new drawable size into `config`.
///
/// Returns false for a zero-sized drawable: wgpu rejects a 0x0 configuration,
/// so `config` keeps its last valid extent and the surface is left alone.
pub(crate) fn resize_config(
    config: &mut wgpu::SurfaceConfiguration,
    new_size: PhysicalSize<u32>,
) -> bool {
    if new_size.width == 0 || new_size.height == 0 {
        return false;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    true
}

/// Classifies a failed `get_current_texture`.
///
/// `Reconfigured` means the caller must configure the surface again before the
/// next acquisition.
pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}
