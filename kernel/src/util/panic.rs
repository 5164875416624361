// =============================================================================
// Bare Bones — Kernel Panic Handler
// =============================================================================
//
// A panic here means a broken invariant (an out-of-range cell index, a
// missing boot response we assumed). We print what we know to serial and
// halt; the screen may be the thing that broke, so we don't touch it.
//
// We print with klog::println! rather than log::error! so the report
// appears even when the kernel was built with `no_logs`.
// =============================================================================

use crate::arch::cpu;
use core::panic::PanicInfo;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    klog::println!();
    klog::println!("==========================================================");
    klog::println!("  KERNEL PANIC");
    klog::println!("==========================================================");

    if let Some(location) = info.location() {
        klog::println!("  Location: {}:{}", location.file(), location.line());
    } else {
        klog::println!("  Location: <unknown>");
    }
    klog::println!("  Message: {}", info.message());

    klog::println!("==========================================================");
    klog::println!("  System halted. Reboot required.");
    klog::println!("==========================================================");

    cpu::halt_forever()
}
