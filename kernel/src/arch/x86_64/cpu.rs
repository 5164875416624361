// =============================================================================
// Bare Bones — CPU Utilities (x86_64)
// =============================================================================

use ::x86_64::instructions::{hlt, interrupts};

/// Halts the CPU in an unrecoverable state.
///
/// Disables interrupts and then halts. Used for fatal boot errors and
/// panics, where there is nothing left to do.
#[inline(always)]
pub fn halt_forever() -> ! {
    loop {
        interrupts::disable();
        hlt();
    }
}
