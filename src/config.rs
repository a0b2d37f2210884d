//! Launch-time tunables for the viewer.

/// Default drag sensitivity (radians, scale units or world units per pixel)
pub(crate) const DEFAULT_SENSITIVITY: f32 = 0.01;

/// Viewer configuration shared by the interaction core and the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ViewerConfig {
    /// Multiplier applied to pointer deltas by every transform channel
    pub(crate) sensitivity: f32,
    /// Distance of the camera from the origin along +Z
    pub(crate) camera_distance: f32,
    /// Vertical field of view in degrees
    pub(crate) fovy: f32,
    pub(crate) znear: f32,
    pub(crate) zfar: f32,
    /// Viewport background colour (linear RGB)
    pub(crate) background: [f32; 3],
    /// Surface colour shared by every shape
    pub(crate) shape_color: [f32; 3],
    /// World-space position of the point light
    pub(crate) light_position: [f32; 3],
    pub(crate) light_intensity: f32,
    /// Distance at which the point light no longer contributes
    pub(crate) light_range: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            camera_distance: 5.0,
            fovy: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            background: [0.3, 0.3, 0.3],
            shape_color: [1.0, 0.3, 0.1],
            light_position: [-5.0, 10.0, 5.0],
            light_intensity: 2.0,
            light_range: 50.0,
        }
    }
}
