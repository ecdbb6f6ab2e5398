use crate::feature::{EvaluateParams, FeatureCreateParams, FeatureId};
use glam::UVec2;
use wgpu::TextureFormat;

/// Identity of a concrete, realized texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Description of a texture, as known to the render graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub size: UVec2,
    /// Number of array layers. Greater than one for single-pass stereo targets.
    pub layers: u32,
    pub format: TextureFormat,
}

impl TextureDesc {
    pub fn is_array(&self) -> bool {
        self.layers > 1
    }

    /// A single-layer texture with the same size and format.
    pub fn single_layer(&self) -> Self {
        Self { layers: 1, ..*self }
    }
}

/// A realized texture handed to the pass at execute time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureRef {
    pub id: TextureId,
    pub desc: TextureDesc,
}

/// One array layer of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSlice {
    pub texture: TextureId,
    pub layer: u32,
}

impl TextureRef {
    pub fn slice(&self, layer: u32) -> TextureSlice {
        TextureSlice {
            texture: self.id,
            layer,
        }
    }
}

/// Textures bound to an upscale command, by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureTextures {
    pub color_input: TextureId,
    pub color_output: TextureId,
    pub depth: TextureId,
    pub motion_vectors: TextureId,
}

/// A recorded GPU command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateFeature {
        feature: FeatureId,
        params: FeatureCreateParams,
    },
    DestroyFeature {
        feature: FeatureId,
    },
    Evaluate {
        feature: FeatureId,
        params: EvaluateParams,
        textures: FeatureTextures,
    },
    CopyTexture {
        source: TextureSlice,
        destination: TextureSlice,
        size: UVec2,
    },
}

/// Retained list of commands, replayed on the GPU by the caller in recording order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn copy_texture(&mut self, source: TextureSlice, destination: TextureSlice, size: UVec2) {
        self.push(Command::CopyTexture {
            source,
            destination,
            size,
        });
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
