use crate::{
    DlssError,
    camera_state::ViewLayout,
    command::{TextureDesc, TextureRef},
};

/// Virtual texture handle issued by a render graph at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Build-time side of a render graph: allocates virtual textures.
pub trait RenderGraph {
    fn create_texture(&mut self, label: &'static str, desc: TextureDesc) -> TextureHandle;

    fn texture_desc(&self, texture: TextureHandle) -> Option<TextureDesc>;
}

/// Execute-time side of a render graph: realizes virtual textures.
pub trait ResourceResolver {
    fn resolve(&self, texture: TextureHandle) -> Option<TextureRef>;
}

/// The four textures an upscale reads and writes, by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewResources<T> {
    pub source: T,
    pub output: T,
    pub depth: T,
    pub motion_vectors: T,
}

impl<T> ViewResources<T> {
    fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<ViewResources<U>, E> {
        Ok(ViewResources {
            source: f(self.source)?,
            output: f(self.output)?,
            depth: f(self.depth)?,
            motion_vectors: f(self.motion_vectors)?,
        })
    }
}

pub type ViewResourceHandles = ViewResources<TextureHandle>;
pub type ViewTextures = ViewResources<TextureRef>;

/// Virtual textures used by one camera's upscale, including per-view temporaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraResourceHandles {
    pub resources: ViewResourceHandles,
    /// One set per view when array textures must be split; empty otherwise.
    pub tmp_views: Vec<ViewResourceHandles>,
}

/// Realized textures for one camera's upscale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraResources {
    pub resources: ViewTextures,
    pub tmp_views: Vec<ViewTextures>,
}

/// Declares the textures a camera's upscale needs.
///
/// When views are rendered into slices of one array texture, allocates a
/// single-layer temporary of each role per view from `graph`.
pub fn create_camera_resources(
    layout: &ViewLayout,
    handles: ViewResourceHandles,
    graph: &mut dyn RenderGraph,
) -> Result<CameraResourceHandles, DlssError> {
    let descs = handles.try_map(|handle| {
        graph
            .texture_desc(handle)
            .ok_or(DlssError::UnresolvedTexture(handle))
    })?;

    let mut tmp_views = Vec::new();
    if layout.requires_view_copies(&descs.source) {
        tmp_views = (0..layout.view_count)
            .map(|_| ViewResources {
                source: graph.create_texture("dlss_tmp_source", descs.source.single_layer()),
                output: graph.create_texture("dlss_tmp_output", descs.output.single_layer()),
                depth: graph.create_texture("dlss_tmp_depth", descs.depth.single_layer()),
                motion_vectors: graph.create_texture(
                    "dlss_tmp_motion_vectors",
                    descs.motion_vectors.single_layer(),
                ),
            })
            .collect();
    }

    Ok(CameraResourceHandles {
        resources: handles,
        tmp_views,
    })
}

impl CameraResourceHandles {
    /// Translates every virtual handle into its realized texture.
    pub fn resolve(&self, resolver: &dyn ResourceResolver) -> Result<CameraResources, DlssError> {
        let resolve = |handle: TextureHandle| {
            resolver
                .resolve(handle)
                .ok_or(DlssError::UnresolvedTexture(handle))
        };

        Ok(CameraResources {
            resources: self.resources.try_map(resolve)?,
            tmp_views: self
                .tmp_views
                .iter()
                .map(|view| view.try_map(resolve))
                .collect::<Result<_, _>>()?,
        })
    }
}
