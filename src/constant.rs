/// Mathematical constant pi
pub const PI: f64 = std::f64::consts::PI;

/// Permeability of free space, in SI units of H/m.
pub const MU0: f64 = 4e-7 * PI;
