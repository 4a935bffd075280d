//! Error types for Evergreen.
//!
//! Configuration problems are rejected when a scene is built, never in the
//! middle of an animation. The per-frame path has no failure modes; it clamps
//! instead. [`ViewerError`] covers window and GPU setup for the bundled viewer.

use std::fmt;

/// Errors raised while validating static scene configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An instance count resolved to a negative value.
    NegativeCount {
        /// Group the count belongs to.
        group: String,
        /// The offending value.
        value: i64,
    },
    /// A count share is not a finite, non-negative number.
    InvalidShare {
        /// Group the share belongs to.
        group: String,
        /// The offending value.
        value: f64,
    },
    /// An instance count exceeds [`MAX_INSTANCES`](crate::config::MAX_INSTANCES).
    CountTooLarge {
        /// Group the count belongs to.
        group: String,
        /// The requested count.
        value: f64,
    },
    /// Two per-instance arrays of one group disagree in length.
    LengthMismatch {
        /// Which array is wrong (e.g. `"dispersed positions"`).
        what: &'static str,
        /// Length implied by the group's count.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A scale range bound is negative or not finite.
    InvalidScaleRange {
        /// Lower bound as supplied.
        min: f32,
        /// Upper bound as supplied.
        max: f32,
    },
    /// A size parameter (height, radius, range...) is not finite and positive.
    InvalidDimension {
        /// Name of the parameter.
        field: &'static str,
        /// The offending value.
        value: f32,
    },
    /// A color string could not be parsed as `#rrggbb`.
    InvalidColor(String),
    /// A palette has no swatches, or its weights do not sum to a positive value.
    EmptyPalette,
    /// Stagger parameters are not finite, or would leave instances short of
    /// fully formed at progress 1.
    InvalidStagger(String),
    /// A morph rate is not finite and positive.
    InvalidRate(f32),
    /// Failed to read a configuration file.
    Io(std::io::Error),
    /// Failed to parse a configuration file.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NegativeCount { group, value } => {
                write!(f, "Group '{}' has a negative instance count ({})", group, value)
            }
            ConfigError::InvalidShare { group, value } => write!(
                f,
                "Group '{}' has an invalid count share ({}); expected a finite value >= 0",
                group, value
            ),
            ConfigError::CountTooLarge { group, value } => write!(
                f,
                "Group '{}' requests {} instances; at most {} are supported",
                group,
                value,
                crate::config::MAX_INSTANCES
            ),
            ConfigError::LengthMismatch { what, expected, actual } => write!(
                f,
                "Expected {} {} to match the instance count, got {}",
                expected, what, actual
            ),
            ConfigError::InvalidScaleRange { min, max } => {
                write!(f, "Invalid scale range [{}, {}]; expected finite, non-negative bounds", min, max)
            }
            ConfigError::InvalidDimension { field, value } => {
                write!(f, "'{}' must be finite and positive, got {}", field, value)
            }
            ConfigError::InvalidColor(text) => {
                write!(f, "Invalid color '{}'; expected #rrggbb", text)
            }
            ConfigError::EmptyPalette => {
                write!(f, "Palette needs at least one swatch with a positive weight")
            }
            ConfigError::InvalidStagger(msg) => write!(f, "Invalid stagger parameters: {}", msg),
            ConfigError::InvalidRate(rate) => {
                write!(f, "Morph rate must be finite and positive, got {}", rate)
            }
            ConfigError::Io(e) => write!(f, "Failed to read scene config: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse scene config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur while starting the viewer.
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The scene configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            ViewerError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            ViewerError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            ViewerError::Config(e) => write!(f, "Scene configuration error: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::SurfaceCreation(e) => Some(e),
            ViewerError::DeviceCreation(e) => Some(e),
            ViewerError::Config(e) => Some(e),
            ViewerError::NoAdapter => None,
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

impl From<wgpu::CreateSurfaceError> for ViewerError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        ViewerError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for ViewerError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        ViewerError::DeviceCreation(e)
    }
}

impl From<ConfigError> for ViewerError {
    fn from(e: ConfigError) -> Self {
        ViewerError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_message() {
        let err = ConfigError::LengthMismatch {
            what: "colors",
            expected: 4,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("colors"));
        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;
        let err = ConfigError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(ConfigError::EmptyPalette.source().is_none());
    }
}
