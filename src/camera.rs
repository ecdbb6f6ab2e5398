use std::{
    any::Any,
    borrow::Borrow,
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
};

/// Stable identifier of a camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u64);

/// Non-owning reference used only to test whether a camera still exists.
///
/// Never keeps the camera alive.
#[derive(Clone, Debug)]
pub struct Liveness(Weak<dyn Any + Send + Sync>);

impl Liveness {
    pub fn new<T: Any + Send + Sync>(camera: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(camera);
        Self(weak)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Lookup key of a camera. Equality and hashing use only the id.
#[derive(Clone, Debug)]
pub struct CameraKey {
    id: CameraId,
    liveness: Liveness,
}

impl CameraKey {
    pub fn new<T: Any + Send + Sync>(id: CameraId, camera: &Arc<T>) -> Self {
        Self {
            id,
            liveness: Liveness::new(camera),
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }
}

impl PartialEq for CameraKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CameraKey {}

impl Hash for CameraKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Borrow<CameraId> for CameraKey {
    fn borrow(&self) -> &CameraId {
        &self.id
    }
}
