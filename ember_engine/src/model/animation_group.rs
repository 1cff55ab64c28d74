/// SkinnedAnimationGroup - blendline sampling and matrix building
///
/// Clips attach at positions on a one-dimensional blendline (walk at
/// 0.0, run at 1.0, ...). Sampling finds the two clips bracketing the
/// requested position, samples both at the same playback position and
/// lerps the poses. Positions outside the attached range clamp to the
/// nearest clip. A prepared group can additionally crossfade with a
/// second group before matrices are built.

use std::sync::Arc;

use glam::Mat4;

use crate::error::Result;
use crate::model::{AnimationFrame, Skeleton, SkinnedAnimation};
use crate::{engine_bail, engine_error};

const SOURCE: &str = "ember::SkinnedAnimationGroup";

/// Interpolation mode used when combining clips or groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationBlendType {
    #[default]
    Linear,
}

/// A clip positioned on the blendline
#[derive(Clone)]
pub struct AnimationItem {
    pub animation: Arc<SkinnedAnimation>,
    pub blendline_position: f32,
}

/// Samples and blends the clips attached to one skeleton
pub struct SkinnedAnimationGroup {
    skeleton: Arc<Skeleton>,
    animations: Vec<AnimationItem>,

    current_frame: Option<AnimationFrame>,
    matrices: Vec<Mat4>,

    length: f32,
    length_dirty: bool,
}

impl SkinnedAnimationGroup {
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        Self {
            skeleton,
            animations: Vec::new(),
            current_frame: None,
            matrices: Vec::new(),
            length: 0.0,
            length_dirty: true,
        }
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Whether `build_animation_data` has produced a pose since the
    /// last `clear_animations`
    pub fn is_prepared(&self) -> bool {
        self.current_frame.is_some()
    }

    /// Attach a clip at a blendline position.
    ///
    /// Positions must be attached in ascending order; the bracketing
    /// search relies on it.
    pub fn attach_animation(&mut self, animation: Arc<SkinnedAnimation>, blendline_position: f32) {
        debug_assert!(
            self.animations
                .last()
                .map_or(true, |item| item.blendline_position <= blendline_position),
            "animations must be attached in ascending blendline order"
        );
        self.animations.push(AnimationItem {
            animation,
            blendline_position,
        });
        self.length_dirty = true;
    }

    /// Detach one clip. Returns false when the clip is not attached.
    pub fn detach_animation(&mut self, animation: &Arc<SkinnedAnimation>) -> bool {
        let before = self.animations.len();
        self.animations
            .retain(|item| !Arc::ptr_eq(&item.animation, animation));
        let removed = self.animations.len() != before;
        if removed {
            self.length_dirty = true;
        }
        removed
    }

    /// Detach every clip and drop the prepared pose
    pub fn clear_animations(&mut self) {
        self.animations.clear();
        self.current_frame = None;
        self.matrices.clear();
        self.length_dirty = true;
    }

    /// Common duration of the attached clips, in seconds.
    ///
    /// Blending assumes all clips run the same length; on a mismatch
    /// this logs an error and reports the first clip's length.
    pub fn animation_length(&mut self) -> f32 {
        if !self.length_dirty {
            return self.length;
        }
        self.length = 0.0;
        for (index, item) in self.animations.iter().enumerate() {
            let length = item.animation.length();
            if index == 0 {
                self.length = length;
            } else if (length - self.length).abs() > f32::EPSILON {
                engine_error!(
                    SOURCE,
                    "clip at blendline {} has length {}, expected {}; lengths must match",
                    item.blendline_position,
                    length,
                    self.length
                );
            }
        }
        self.length_dirty = false;
        self.length
    }

    /// Sample the blendline, producing the group's current pose.
    ///
    /// `blendline_position` selects which clips contribute;
    /// `playback_position` is the time in seconds at which both
    /// bracketing clips are sampled.
    pub fn build_animation_data(
        &mut self,
        blend_type: AnimationBlendType,
        blendline_position: f32,
        playback_position: f32,
    ) -> Result<()> {
        if self.animations.is_empty() {
            engine_bail!(SOURCE, "no animations attached");
        }

        let first = &self.animations[0];
        let last = &self.animations[self.animations.len() - 1];

        let frame = if blendline_position <= first.blendline_position {
            Self::sample_item(first, playback_position)?
        } else if blendline_position >= last.blendline_position {
            Self::sample_item(last, playback_position)?
        } else {
            // Find the pair bracketing the position
            let upper_index = self
                .animations
                .iter()
                .position(|item| item.blendline_position >= blendline_position)
                .unwrap_or(self.animations.len() - 1);
            let lower = &self.animations[upper_index - 1];
            let upper = &self.animations[upper_index];

            let span = upper.blendline_position - lower.blendline_position;
            let factor = if span <= f32::EPSILON {
                0.0
            } else {
                ((blendline_position - lower.blendline_position) / span).clamp(0.0, 1.0)
            };

            let lower_frame = Self::sample_item(lower, playback_position)?;
            let upper_frame = Self::sample_item(upper, playback_position)?;
            match blend_type {
                AnimationBlendType::Linear => lower_frame.lerp(&upper_frame, factor),
            }
        };

        self.current_frame = Some(frame);
        Ok(())
    }

    fn sample_item(item: &AnimationItem, playback_position: f32) -> Result<AnimationFrame> {
        match item.animation.sample(playback_position) {
            Some(frame) => Ok(frame),
            None => engine_bail!(
                SOURCE,
                "clip at blendline {} has no frames",
                item.blendline_position
            ),
        }
    }

    /// Crossfade this group's pose towards another group's pose.
    ///
    /// Both groups must be prepared. `factor` is clamped to [0, 1];
    /// 0 keeps this group's pose, 1 takes the other's.
    pub fn blend_group(
        &mut self,
        blend_type: AnimationBlendType,
        other: &SkinnedAnimationGroup,
        factor: f32,
    ) -> Result<()> {
        let ours = match &self.current_frame {
            Some(frame) => frame,
            None => engine_bail!(SOURCE, "cannot blend an unprepared group"),
        };
        let theirs = match &other.current_frame {
            Some(frame) => frame,
            None => engine_bail!(SOURCE, "cannot blend with an unprepared group"),
        };
        self.current_frame = Some(match blend_type {
            AnimationBlendType::Linear => ours.lerp(theirs, factor.clamp(0.0, 1.0)),
        });
        Ok(())
    }

    /// The pose produced by the last `build_animation_data`/`blend_with`
    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        self.current_frame.as_ref()
    }

    /// Walk the skeleton and build world joint matrices from the
    /// current pose. Parents precede children, so one forward pass
    /// suffices.
    pub fn build_matrices(&mut self) -> Result<()> {
        let frame = match &self.current_frame {
            Some(frame) => frame,
            None => engine_bail!(SOURCE, "cannot build matrices without a prepared pose"),
        };
        let joints = self.skeleton.joints();
        if frame.joint_count() != joints.len() {
            engine_bail!(
                SOURCE,
                "pose has {} joints, skeleton has {}",
                frame.joint_count(),
                joints.len()
            );
        }

        self.matrices.clear();
        self.matrices.reserve(joints.len());
        for (index, joint) in joints.iter().enumerate() {
            let local = Mat4::from_scale_rotation_translation(
                frame.scales[index],
                frame.orientations[index],
                frame.translations[index],
            );
            let world = match joint.parent {
                Some(parent) => self.matrices[parent] * local,
                None => local,
            };
            self.matrices.push(world);
        }
        Ok(())
    }

    /// World joint matrices from the last `build_matrices`
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// World matrix of one joint, if matrices have been built
    pub fn matrix_at(&self, index: usize) -> Option<Mat4> {
        self.matrices.get(index).copied()
    }

    /// Combine the world matrices with a model's inverse bind pose,
    /// yielding the final skinning matrices.
    pub fn apply_inverse_bind_pose(&self, inverse_bind_poses: &[Mat4]) -> Result<Vec<Mat4>> {
        if inverse_bind_poses.len() != self.matrices.len() {
            engine_bail!(
                SOURCE,
                "{} inverse bind poses for {} joint matrices",
                inverse_bind_poses.len(),
                self.matrices.len()
            );
        }
        Ok(self
            .matrices
            .iter()
            .zip(inverse_bind_poses.iter())
            .map(|(world, inverse)| *world * *inverse)
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "animation_group_tests.rs"]
mod tests;
