/// Skinned animation clips - keyframed joint poses

use glam::{Quat, Vec3};

/// Pose of every joint at one keyframe, indexed in skeleton order
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub translations: Vec<Vec3>,
    pub orientations: Vec<Quat>,
    pub scales: Vec<Vec3>,
}

impl AnimationFrame {
    /// Identity pose for `joint_count` joints
    pub fn identity(joint_count: usize) -> Self {
        Self {
            translations: vec![Vec3::ZERO; joint_count],
            orientations: vec![Quat::IDENTITY; joint_count],
            scales: vec![Vec3::ONE; joint_count],
        }
    }

    pub fn joint_count(&self) -> usize {
        self.translations.len()
    }

    /// Linear interpolation between two frames.
    ///
    /// Translations and scales lerp; orientations slerp. `factor` 0
    /// yields `self`, 1 yields `other`.
    pub fn lerp(&self, other: &AnimationFrame, factor: f32) -> AnimationFrame {
        let joints = self.joint_count().min(other.joint_count());
        let mut result = AnimationFrame {
            translations: Vec::with_capacity(joints),
            orientations: Vec::with_capacity(joints),
            scales: Vec::with_capacity(joints),
        };
        for i in 0..joints {
            result
                .translations
                .push(self.translations[i].lerp(other.translations[i], factor));
            result
                .orientations
                .push(self.orientations[i].slerp(other.orientations[i], factor));
            result.scales.push(self.scales[i].lerp(other.scales[i], factor));
        }
        result
    }
}

/// A keyframed clip sampled at a fixed rate
#[derive(Debug, Clone)]
pub struct SkinnedAnimation {
    frame_rate: f32,
    frames: Vec<AnimationFrame>,
}

impl SkinnedAnimation {
    pub fn new(frame_rate: f32, frames: Vec<AnimationFrame>) -> Self {
        Self { frame_rate, frames }
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Clip duration in seconds. A clip with fewer than two frames has
    /// zero length.
    pub fn length(&self) -> f32 {
        if self.frames.len() < 2 || self.frame_rate <= 0.0 {
            0.0
        } else {
            (self.frames.len() - 1) as f32 / self.frame_rate
        }
    }

    /// Sample the clip at `playback_position` seconds, interpolating
    /// between the bracketing keyframes. Positions outside the clip
    /// clamp to the first or last frame.
    pub fn sample(&self, playback_position: f32) -> Option<AnimationFrame> {
        if self.frames.is_empty() {
            return None;
        }
        let last = self.frames.len() - 1;
        let exact = (playback_position * self.frame_rate).max(0.0);
        let lower = (exact.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        if lower == upper {
            return Some(self.frames[lower].clone());
        }
        let factor = exact - lower as f32;
        Some(self.frames[lower].lerp(&self.frames[upper], factor))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "skinned_animation_tests.rs"]
mod tests;
