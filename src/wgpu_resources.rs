use crate::{
    command::{Command, CommandList, TextureDesc, TextureId, TextureRef, TextureSlice},
    resources::{RenderGraph, ResourceResolver, TextureHandle},
};
use glam::UVec2;
use log::warn;
use wgpu::{
    CommandEncoder, Device, Extent3d, Origin3d, TexelCopyTextureInfo, Texture, TextureAspect,
    TextureDescriptor, TextureDimension, TextureUsages,
};

struct PoolEntry {
    label: &'static str,
    desc: TextureDesc,
    texture: Option<Texture>,
}

/// Textures known to a [`WgpuTexturePool`], realized or not.
#[derive(Default)]
struct PoolEntries(Vec<PoolEntry>);

impl PoolEntries {
    fn push(&mut self, entry: PoolEntry) -> TextureHandle {
        self.0.push(entry);
        TextureHandle(self.0.len() as u32 - 1)
    }

    fn get(&self, texture: TextureHandle) -> Option<&PoolEntry> {
        self.0.get(texture.0 as usize)
    }

    fn texture(&self, texture: TextureId) -> Option<&Texture> {
        let index = usize::try_from(texture.0).ok()?;
        self.0.get(index)?.texture.as_ref()
    }

    fn resolve(&self, texture: TextureHandle) -> Option<TextureRef> {
        let entry = self.get(texture)?;
        entry.texture.as_ref()?;
        Some(TextureRef {
            id: TextureId(u64::from(texture.0)),
            desc: entry.desc,
        })
    }

    /// Source info, destination info and extent of a recorded copy, or `None`
    /// if either side is not backed by GPU memory.
    fn copy(
        &self,
        source: &TextureSlice,
        destination: &TextureSlice,
        size: UVec2,
    ) -> Option<(TexelCopyTextureInfo<'_>, TexelCopyTextureInfo<'_>, Extent3d)> {
        let source_info = copy_info(self.texture(source.texture)?, source);
        let destination_info = copy_info(self.texture(destination.texture)?, destination);
        Some((source_info, destination_info, copy_extent(size)))
    }
}

/// Minimal wgpu-backed render graph for the DLSS pass.
///
/// Imported textures are realized immediately; transient textures declared
/// through [`RenderGraph::create_texture`] are allocated by [`Self::realize`].
pub struct WgpuTexturePool {
    device: Device,
    entries: PoolEntries,
}

impl WgpuTexturePool {
    pub fn new(device: &Device) -> Self {
        Self {
            device: device.clone(),
            entries: PoolEntries::default(),
        }
    }

    /// Registers a texture owned by the application.
    pub fn import(&mut self, label: &'static str, texture: &Texture) -> TextureHandle {
        self.entries.push(PoolEntry {
            label,
            desc: TextureDesc {
                size: UVec2::new(texture.width(), texture.height()),
                layers: texture.depth_or_array_layers(),
                format: texture.format(),
            },
            texture: Some(texture.clone()),
        })
    }

    /// Allocates every transient texture that is not yet backed by GPU memory.
    pub fn realize(&mut self) {
        for entry in &mut self.entries.0 {
            if entry.texture.is_none() {
                entry.texture = Some(
                    self.device
                        .create_texture(&transient_descriptor(entry.label, &entry.desc)),
                );
            }
        }
    }

    /// Forgets every texture, releasing transients. Call once the frame's commands are submitted.
    pub fn clear(&mut self) {
        self.entries.0.clear();
    }

    pub fn texture(&self, texture: TextureId) -> Option<&Texture> {
        self.entries.texture(texture)
    }

    /// Encodes the texture copies in `commands` into `encoder`, in order.
    ///
    /// Every other command is handed to `native`, so upscaler work stays
    /// ordered relative to the copies.
    pub fn encode(
        &self,
        commands: &CommandList,
        encoder: &mut CommandEncoder,
        mut native: impl FnMut(&Command, &mut CommandEncoder),
    ) {
        for command in commands {
            match command {
                Command::CopyTexture {
                    source,
                    destination,
                    size,
                } => {
                    let Some((source_info, destination_info, extent)) =
                        self.entries.copy(source, destination, *size)
                    else {
                        warn!("Skipping copy between unrealized textures {source:?} -> {destination:?}");
                        continue;
                    };
                    encoder.copy_texture_to_texture(source_info, destination_info, extent);
                }
                other => native(other, encoder),
            }
        }
    }
}

impl RenderGraph for WgpuTexturePool {
    fn create_texture(&mut self, label: &'static str, desc: TextureDesc) -> TextureHandle {
        self.entries.push(PoolEntry {
            label,
            desc,
            texture: None,
        })
    }

    fn texture_desc(&self, texture: TextureHandle) -> Option<TextureDesc> {
        self.entries.get(texture).map(|entry| entry.desc)
    }
}

impl ResourceResolver for WgpuTexturePool {
    fn resolve(&self, texture: TextureHandle) -> Option<TextureRef> {
        self.entries.resolve(texture)
    }
}

/// Layer `slice.layer` of an array texture is addressed through the origin's z.
fn copy_origin(slice: &TextureSlice) -> Origin3d {
    Origin3d {
        x: 0,
        y: 0,
        z: slice.layer,
    }
}

/// Copies always move a single layer.
fn copy_extent(size: UVec2) -> Extent3d {
    Extent3d {
        width: size.x,
        height: size.y,
        depth_or_array_layers: 1,
    }
}

fn copy_info<'a>(texture: &'a Texture, slice: &TextureSlice) -> TexelCopyTextureInfo<'a> {
    TexelCopyTextureInfo {
        texture,
        mip_level: 0,
        origin: copy_origin(slice),
        aspect: TextureAspect::All,
    }
}

fn transient_descriptor(label: &'static str, desc: &TextureDesc) -> TextureDescriptor<'static> {
    TextureDescriptor {
        label: Some(label),
        size: Extent3d {
            width: desc.size.x,
            height: desc.size.y,
            depth_or_array_layers: desc.layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: desc.format,
        usage: TextureUsages::COPY_SRC
            | TextureUsages::COPY_DST
            | TextureUsages::TEXTURE_BINDING
            | TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    fn desc(layers: u32) -> TextureDesc {
        TextureDesc {
            size: UVec2::new(1920, 1080),
            layers,
            format: TextureFormat::Rgba16Float,
        }
    }

    fn transient(entries: &mut PoolEntries, label: &'static str, layers: u32) -> TextureHandle {
        entries.push(PoolEntry {
            label,
            desc: desc(layers),
            texture: None,
        })
    }

    #[test]
    fn transient_descriptor_matches_desc() {
        let desc = TextureDesc {
            size: UVec2::new(1920, 1080),
            layers: 1,
            format: TextureFormat::Depth32Float,
        };
        let descriptor = transient_descriptor("dlss_tmp_depth", &desc);
        assert_eq!(descriptor.label, Some("dlss_tmp_depth"));
        assert_eq!(descriptor.size.width, 1920);
        assert_eq!(descriptor.size.height, 1080);
        assert_eq!(descriptor.size.depth_or_array_layers, 1);
        assert_eq!(descriptor.format, TextureFormat::Depth32Float);
        assert!(descriptor.usage.contains(TextureUsages::COPY_SRC | TextureUsages::COPY_DST));
    }

    #[test]
    fn copy_addresses_one_array_layer() {
        for layer in [0, 1] {
            let slice = TextureSlice {
                texture: TextureId(3),
                layer,
            };
            assert_eq!(copy_origin(&slice), Origin3d { x: 0, y: 0, z: layer });
        }

        let extent = copy_extent(UVec2::new(3840, 2160));
        assert_eq!(
            extent,
            Extent3d {
                width: 3840,
                height: 2160,
                depth_or_array_layers: 1,
            }
        );
    }

    #[test]
    fn unrealized_transients_do_not_resolve() {
        let mut entries = PoolEntries::default();
        let color = transient(&mut entries, "color", 2);
        let tmp = transient(&mut entries, "dlss_tmp_color", 1);

        assert_eq!(entries.get(color).map(|entry| entry.desc), Some(desc(2)));
        assert_eq!(entries.resolve(color), None);
        assert_eq!(entries.resolve(tmp), None);
        assert_eq!(entries.resolve(TextureHandle(7)), None);
        assert!(entries.texture(TextureId(u64::from(tmp.0))).is_none());
    }

    #[test]
    fn copy_between_unrealized_textures_is_skipped() {
        let mut entries = PoolEntries::default();
        let color = transient(&mut entries, "color", 2);
        let tmp = transient(&mut entries, "dlss_tmp_color", 1);

        let source = TextureSlice {
            texture: TextureId(u64::from(color.0)),
            layer: 1,
        };
        let destination = TextureSlice {
            texture: TextureId(u64::from(tmp.0)),
            layer: 0,
        };
        assert!(entries.copy(&source, &destination, UVec2::new(1920, 1080)).is_none());
        assert!(
            entries
                .copy(
                    &source,
                    &TextureSlice {
                        texture: TextureId(99),
                        layer: 0,
                    },
                    UVec2::ONE,
                )
                .is_none()
        );
    }
}
