//! Lighting configuration for the scene tree.
//!
//! Lights are attached to scene nodes and inherit their world transform, so a
//! point light parented to the camera rig follows the camera.

use crate::color::{Color, WHITE};
use glamx::Vec3;

/// A light source that can be attached to a scene node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Light {
    /// Uniform illumination applied to every surface, regardless of position.
    Ambient {
        /// The light color (components in [0.0, 1.0]).
        color: Color,
        /// The intensity multiplier.
        intensity: f32,
    },
    /// A light emitting equally in all directions from the node's world position.
    Point {
        /// The light color (components in [0.0, 1.0]).
        color: Color,
        /// The intensity multiplier.
        intensity: f32,
    },
}

impl Light {
    /// Creates a white ambient light with the given intensity.
    pub fn ambient(intensity: f32) -> Self {
        Light::Ambient {
            color: WHITE,
            intensity,
        }
    }

    /// Creates a white point light with the given intensity.
    pub fn point(intensity: f32) -> Self {
        Light::Point {
            color: WHITE,
            intensity,
        }
    }

    /// Sets the light color.
    pub fn with_color(mut self, new_color: Color) -> Self {
        match &mut self {
            Light::Ambient { color, .. } | Light::Point { color, .. } => *color = new_color,
        }
        self
    }
}

/// A point light gathered from the scene tree with its world-space position.
#[derive(Clone, Debug)]
pub struct CollectedLight {
    /// The light color.
    pub color: Vec3,
    /// The light intensity.
    pub intensity: f32,
    /// World-space position of the light.
    pub world_position: Vec3,
}

/// Lights gathered from the scene tree during the prepare phase.
///
/// The renderer shades with the accumulated ambient term plus the first
/// collected point light.
#[derive(Clone, Debug)]
pub struct LightCollection {
    /// The collected point lights.
    pub lights: Vec<CollectedLight>,
    /// Accumulated ambient color, already scaled by the ambient intensities.
    pub ambient: Vec3,
}

impl Default for LightCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl LightCollection {
    /// Creates a new collection with no lights and no ambient term.
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            ambient: Vec3::ZERO,
        }
    }

    /// Adds a point light to the collection.
    pub fn add(&mut self, light: CollectedLight) {
        self.lights.push(light);
    }

    /// Accumulates an ambient contribution.
    pub fn add_ambient(&mut self, color: Color, intensity: f32) {
        self.ambient += Vec3::new(color.r, color.g, color.b) * intensity;
    }

    /// The point light used for shading, if any was collected.
    pub fn primary(&self) -> Option<&CollectedLight> {
        self.lights.first()
    }

    /// Returns the number of collected point lights.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Returns `true` if no point light was collected.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Clears all collected lights and the ambient term.
    pub fn clear(&mut self) {
        self.lights.clear();
        self.ambient = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambient_accumulates_scaled_color() {
        let mut lights = LightCollection::new();
        lights.add_ambient(WHITE, 0.8);
        assert!((lights.ambient - Vec3::new(0.8, 0.8, 0.8)).length() < 1.0e-6);

        lights.add_ambient(WHITE, 0.2);
        assert!((lights.ambient - Vec3::ONE).length() < 1.0e-6);
    }

    #[test]
    fn test_primary_is_first_collected() {
        let mut lights = LightCollection::new();
        assert!(lights.primary().is_none());

        lights.add(CollectedLight {
            color: Vec3::ONE,
            intensity: 1.0,
            world_position: Vec3::new(0.0, 0.0, 75.0),
        });
        lights.add(CollectedLight {
            color: Vec3::ONE,
            intensity: 2.0,
            world_position: Vec3::ZERO,
        });

        assert_eq!(lights.len(), 2);
        let primary = lights.primary().unwrap();
        assert_eq!(primary.intensity, 1.0);
    }
}
