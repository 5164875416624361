// =============================================================================
// Bare Bones — Kernel Library
// =============================================================================
//
// Hardware-independent kernel logic, split out of the binary so it can be
// unit-tested on the host with mock ports and an in-memory framebuffer.
// The freestanding entry point lives in main.rs.
// =============================================================================

#![cfg_attr(not(test), no_std)]

pub mod control;
