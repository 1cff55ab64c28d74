/// ResourceRegistry - named storage for shared resources
///
/// Holds the resources that outlive a single frame and are shared
/// across systems: textures, cubemaps, skeletons and animation clips.
/// Lookup is by name; storing under an existing name replaces the old
/// entry and returns it.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use crate::model::{Skeleton, SkinnedAnimation};
use crate::texture::{Cubemap, Texture};

#[derive(Default)]
pub struct ResourceRegistry {
    textures: FxHashMap<String, Arc<Mutex<Texture>>>,
    cubemaps: FxHashMap<String, Arc<Mutex<Cubemap>>>,
    skeletons: FxHashMap<String, Arc<Skeleton>>,
    animations: FxHashMap<String, Arc<SkinnedAnimation>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== TEXTURES =====

    pub fn store_texture(
        &mut self,
        name: impl Into<String>,
        texture: Arc<Mutex<Texture>>,
    ) -> Option<Arc<Mutex<Texture>>> {
        self.textures.insert(name.into(), texture)
    }

    pub fn texture(&self, name: &str) -> Option<Arc<Mutex<Texture>>> {
        self.textures.get(name).cloned()
    }

    pub fn remove_texture(&mut self, name: &str) -> Option<Arc<Mutex<Texture>>> {
        self.textures.remove(name)
    }

    // ===== CUBEMAPS =====

    pub fn store_cubemap(
        &mut self,
        name: impl Into<String>,
        cubemap: Arc<Mutex<Cubemap>>,
    ) -> Option<Arc<Mutex<Cubemap>>> {
        self.cubemaps.insert(name.into(), cubemap)
    }

    pub fn cubemap(&self, name: &str) -> Option<Arc<Mutex<Cubemap>>> {
        self.cubemaps.get(name).cloned()
    }

    pub fn remove_cubemap(&mut self, name: &str) -> Option<Arc<Mutex<Cubemap>>> {
        self.cubemaps.remove(name)
    }

    // ===== SKELETONS =====

    pub fn store_skeleton(
        &mut self,
        name: impl Into<String>,
        skeleton: Arc<Skeleton>,
    ) -> Option<Arc<Skeleton>> {
        self.skeletons.insert(name.into(), skeleton)
    }

    pub fn skeleton(&self, name: &str) -> Option<Arc<Skeleton>> {
        self.skeletons.get(name).cloned()
    }

    pub fn remove_skeleton(&mut self, name: &str) -> Option<Arc<Skeleton>> {
        self.skeletons.remove(name)
    }

    // ===== ANIMATIONS =====

    pub fn store_animation(
        &mut self,
        name: impl Into<String>,
        animation: Arc<SkinnedAnimation>,
    ) -> Option<Arc<SkinnedAnimation>> {
        self.animations.insert(name.into(), animation)
    }

    pub fn animation(&self, name: &str) -> Option<Arc<SkinnedAnimation>> {
        self.animations.get(name).cloned()
    }

    pub fn remove_animation(&mut self, name: &str) -> Option<Arc<SkinnedAnimation>> {
        self.animations.remove(name)
    }

    /// Drop every stored resource
    pub fn clear(&mut self) {
        self.textures.clear();
        self.cubemaps.clear();
        self.skeletons.clear();
        self.animations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
            && self.cubemaps.is_empty()
            && self.skeletons.is_empty()
            && self.animations.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
