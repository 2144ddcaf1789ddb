//! Feature-map shapes flowing between layers.

use std::fmt;

/// Shape of one image's activations at some point in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureShape {
    /// Channel-major map: `channels × height × width`.
    Spatial {
        channels: usize,
        height: usize,
        width: usize,
    },
    /// Flat feature vector produced by a fully connected layer.
    Flat(usize),
}

impl FeatureShape {
    pub fn spatial(channels: usize, height: usize, width: usize) -> Self {
        FeatureShape::Spatial {
            channels,
            height,
            width,
        }
    }

    /// Number of floats the shape occupies.
    pub fn len(&self) -> usize {
        match *self {
            FeatureShape::Spatial {
                channels,
                height,
                width,
            } => channels * height * width,
            FeatureShape::Flat(features) => features,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(channels, height, width)`, or `(0, 0, features)` for a flat vector.
    pub fn dims(&self) -> (usize, usize, usize) {
        match *self {
            FeatureShape::Spatial {
                channels,
                height,
                width,
            } => (channels, height, width),
            FeatureShape::Flat(features) => (0, 0, features),
        }
    }
}

impl fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FeatureShape::Spatial {
                channels,
                height,
                width,
            } => write!(f, "{}x{}x{}", channels, height, width),
            FeatureShape::Flat(features) => write!(f, "{}", features),
        }
    }
}
