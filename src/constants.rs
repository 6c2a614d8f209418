//! Tolerances shared by the simplification passes.

/// Vertices closer than this are merged by `collapse_vertices`.
pub const VERTEX_COLLAPSE_THRESHOLD_DISTANCE: f64 = 1e-5;

/// Intersections this close to the endpoints of both segments are ignored.
pub const INTERSECTION_ENDPOINT_THRESHOLD_DISTANCE: f64 = 1e-6;

/// A split this close to an endpoint reuses that endpoint's vertex.
pub const SPLIT_ENDPOINT_THRESHOLD_DISTANCE: f64 = 1e-7;

/// Parameters this close to 0 or 1 count as segment endpoints.
pub const T_THRESHOLD: f64 = 1e-6;

/// Overlaps must span more than this in both parameters; overlap parameters
/// this close to 0 or 1 snap to the endpoint.
pub const OVERLAP_THRESHOLD: f64 = 1e-5;

/// Bounding boxes are grown by this much before the edge sweeps so touching
/// ranges register.
pub const SWEEP_EXPANSION: f64 = 1e-4;

/// A curved edge collapsed into a self-loop survives only if its bounds are
/// wider or taller than this.
pub const SELF_LOOP_MIN_SIZE: f64 = 1e-5;

/// Adjacent lines merge when their unit directions differ by less than this.
pub const COLLINEAR_THRESHOLD: f64 = 1e-6;

/// Ray directions tried in turn when nesting boundaries; the first one whose
/// nearest hit is not degenerate wins.
pub const BOUNDARY_RAY_ANGLES: [f64; 4] = [1.572_965_7, 0.416_321_3, 2.736_212_5, 4.221_398_7];

/// Leaving directions at a vertex closer than this (radians) are ordered by
/// curvature rather than by angle.
pub const ANGLE_TIE_THRESHOLD: f64 = 1e-5;

/// Leaving curvatures closer than this are ordered by where the edges lead.
pub const CURVATURE_TIE_THRESHOLD: f64 = 1e-6;
