/// Skeleton - joint hierarchy shared by skinned models

use crate::error::Result;
use crate::engine_bail;

/// One joint in the hierarchy
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, `None` for roots
    pub parent: Option<usize>,
}

/// Joint hierarchy in topological order: every joint's parent has a
/// smaller index, so a single forward pass can build world transforms
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Build a skeleton, validating the parent ordering.
    ///
    /// # Errors
    ///
    /// Fails when a joint references itself, a later joint, or an index
    /// out of range.
    pub fn new(joints: Vec<Joint>) -> Result<Self> {
        for (index, joint) in joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent >= index {
                    engine_bail!(
                        "ember::Skeleton",
                        "joint '{}' at {} references parent {}; parents must come first",
                        joint.name,
                        index,
                        parent
                    );
                }
            }
        }
        Ok(Self { joints })
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Index of the first joint with the given name
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|joint| joint.name == name)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "skeleton_tests.rs"]
mod tests;
