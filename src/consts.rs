// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Values closer to zero than this are treated as zero by geometric tests
pub const ZERO_EPSILON: f64 = 1e-10;

// Distance a secondary ray origin is pushed off a surface
pub const DELTA: f64 = 0.1;

// Recursion limits
pub const MAX_RECURSION_DEPTH: usize = 10;
pub const MIN_CONTRIBUTION: f64 = 0.001;

// Runtime parameters
pub const NUM_THREADS: usize = 1;
pub const PROGRESS_STEP_PERCENT: usize = 10;
