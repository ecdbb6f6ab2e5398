use glam::{UVec2, Vec2};

/// Suggested subpixel camera jitter for a given frame, in the range [-0.5, 0.5).
///
/// The sequence length grows with the square of the upscale ratio, so every
/// output pixel receives enough distinct samples.
pub fn suggested_jitter(frame_number: u32, render_resolution: UVec2, upscaled_resolution: UVec2) -> Vec2 {
    let ratio = upscaled_resolution.x as f32 / render_resolution.x.max(1) as f32;
    let phase_count = ((8.0 * ratio * ratio) as u32).max(1);
    let i = frame_number % phase_count + 1;

    Vec2 {
        x: halton_sequence(i, 2),
        y: halton_sequence(i, 3),
    } - 0.5
}

/// Suggested mip bias to apply when sampling textures.
pub fn suggested_mip_bias(render_resolution: UVec2, upscaled_resolution: UVec2) -> f32 {
    (render_resolution.x as f32 / upscaled_resolution.x as f32).log2() - 1.0
}

fn halton_sequence(mut index: u32, base: u32) -> f32 {
    let mut fraction = 1.0;
    let mut result = 0.0;
    while index > 0 {
        fraction /= base as f32;
        result += fraction * (index % base) as f32;
        index /= base;
    }
    result
}
