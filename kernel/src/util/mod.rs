// =============================================================================
// Bare Bones — Kernel Utilities
// =============================================================================

pub mod panic;
