//! Dormand-Prince 5(4) coefficients.
//!
//! Seven-stage embedded pair with the first-same-as-last property: the
//! seventh stage is evaluated at the accepted 5th-order solution and is reused
//! as the first stage of the next step.
//!
//! Reference: Dormand, J.R. & Prince, P.J. (1980), "A family of embedded
//! Runge-Kutta formulae", J. Comp. Appl. Math. 6(1). Dense output
//! coefficients from Hairer, Nørsett & Wanner, "Solving Ordinary Differential
//! Equations I", 2nd ed., routine DOPRI5 (CONTD5).

/// Number of stages (including the FSAL stage).
pub const STAGES: usize = 7;

/// Order of the advancing solution.
pub const ORDER: u8 = 5;

/// Order of the embedded solution used only for the error estimate.
pub const EMBEDDED_ORDER: u8 = 4;

/// Nodes c_i.
pub const C: [f64; STAGES] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

/// Runge-Kutta matrix, row i holds a_{i,j} for j < i.
pub const A: [[f64; STAGES - 1]; STAGES] = [
    [0.0; 6],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// 5th-order weights. Identical to the last row of `A` (FSAL).
pub const B: [f64; STAGES] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];

/// Error weights: 5th-order minus embedded 4th-order weights.
pub const B_ERR: [f64; STAGES] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Continuous extension weights for the 4th-order dense output.
pub const D: [f64; STAGES] = [
    -12715105075.0 / 11282082432.0,
    0.0,
    87487479700.0 / 32700410799.0,
    -10690763975.0 / 1880347072.0,
    701980252875.0 / 199316789632.0,
    -1453857185.0 / 822651844.0,
    69997945.0 / 29380423.0,
];
