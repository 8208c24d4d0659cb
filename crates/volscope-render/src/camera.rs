//! Camera, view transforms and slicing-direction selection.

use glam::{Mat4, Vec2, Vec3, Vec4};
use volscope_core::{Direction, DirectionStrategy};

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

/// Model-view and projection transforms of one frame, plus the viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// World to eye transform.
    pub model_view: Mat4,
    /// Eye to clip transform.
    pub projection: Mat4,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl ViewTransform {
    /// Creates a view transform with a unit viewport.
    #[must_use]
    pub fn new(model_view: Mat4, projection: Mat4) -> Self {
        Self {
            model_view,
            projection,
            viewport: Vec2::ONE,
        }
    }

    /// Sets the viewport size in pixels.
    #[must_use]
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Vec2::new(width, height);
        self
    }

    /// World to clip transform.
    #[must_use]
    pub fn combined(&self) -> Mat4 {
        self.projection * self.model_view
    }

    /// Projects a world point to window coordinates (y pointing down).
    ///
    /// Returns `None` for points on the eye plane.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.combined() * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w.abs() <= f32::EPSILON {
            return None;
        }
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Picks the slicing direction with the given strategy.
    #[must_use]
    pub fn select_direction(&self, strategy: DirectionStrategy) -> Direction {
        match strategy {
            DirectionStrategy::DepthGradient => depth_gradient_direction(self.combined()),
            DirectionStrategy::ProjectedAxes => projected_axes_direction(self)
                .unwrap_or_else(|| depth_gradient_direction(self.combined())),
        }
    }
}

/// Picks the world axis along which clip depth changes fastest.
///
/// The depth row of `view_projection` gives how clip depth grows along world
/// X, Y and Z. Slices are taken across the dominant axis, starting from the
/// side that lies farther from the viewer. Ties prefer X, then Y.
#[must_use]
pub fn depth_gradient_direction(view_projection: Mat4) -> Direction {
    let x = view_projection.x_axis.z;
    let y = view_projection.y_axis.z;
    let z = view_projection.z_axis.z;
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());

    if ax >= ay && ax >= az {
        if x < 0.0 {
            Direction::WestToEast
        } else {
            Direction::EastToWest
        }
    } else if ay >= az {
        if y < 0.0 {
            Direction::SouthToNorth
        } else {
            Direction::NorthToSouth
        }
    } else if z < 0.0 {
        Direction::BottomToTop
    } else {
        Direction::TopToBottom
    }
}

/// Picks the world axis whose on-screen projection is shortest.
///
/// That axis points most nearly at the viewer. Its polarity follows the
/// winding of the two other projected axes. Returns `None` when the origin
/// or an axis tip falls on the eye plane.
#[must_use]
pub fn projected_axes_direction(view: &ViewTransform) -> Option<Direction> {
    let origin = view.project(Vec3::ZERO)?;
    let px = view.project(Vec3::X)? - origin;
    let py = view.project(Vec3::Y)? - origin;
    let pz = view.project(Vec3::Z)? - origin;
    let (lx, ly, lz) = (
        px.length_squared(),
        py.length_squared(),
        pz.length_squared(),
    );

    let direction = if lx <= ly && lx <= lz {
        if py.y * pz.x - py.x * pz.y > 0.0 {
            Direction::WestToEast
        } else {
            Direction::EastToWest
        }
    } else if ly <= lz {
        if pz.y * px.x - pz.x * px.y > 0.0 {
            Direction::SouthToNorth
        } else {
            Direction::NorthToSouth
        }
    } else if px.y * py.x - px.x * py.y > 0.0 {
        Direction::BottomToTop
    } else {
        Direction::TopToBottom
    };
    Some(direction)
}

/// A camera looking at the display box.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Projection mode.
    pub projection_mode: ProjectionMode,
    /// Half height of the view volume in orthographic mode.
    pub ortho_scale: f32,
}

impl Camera {
    /// Creates a camera south of and above the origin looking at it, Z up.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, -3.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_scale: 1.0,
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_scale;
                let half_width = half_height * self.aspect_ratio;
                // Keep everything around the target inside the depth range
                let dist = (self.position - self.target).length();
                let depth = (dist + self.far).max(self.ortho_scale * 100.0);
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    -depth,
                    depth,
                )
            }
        }
    }

    /// Returns the frame's view transform for a viewport of the given size.
    #[must_use]
    pub fn view_transform(&self, width: f32, height: f32) -> ViewTransform {
        ViewTransform::new(self.view_matrix(), self.projection_matrix())
            .with_viewport(width, height)
    }

    /// Orbits the camera around the target, keeping Z up.
    pub fn orbit(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let azimuth = offset.y.atan2(offset.x) + delta_azimuth;
        let elevation = ((offset.z / radius).asin() + delta_elevation).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
        self.position = self.target
            + radius
                * Vec3::new(
                    elevation.cos() * azimuth.cos(),
                    elevation.cos() * azimuth.sin(),
                    elevation.sin(),
                );
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
