// =============================================================================
// Bare Bones — Kernel Entry Point
// =============================================================================
//
// WHAT HAPPENED BEFORE WE GOT HERE:
//   Limine loaded this ELF, switched to 64-bit long mode with its own page
//   tables (higher-half kernel + HHDM), filled in our request structures
//   and jumped to kmain(). Interrupts are disabled and stay disabled.
//
// WHAT WE DO HERE:
//   1. Serial logging, so anything that goes wrong later is visible
//   2. Check the boot protocol gave us what we asked for
//   3. Take ownership of the VGA text buffer and clear it
//   4. Hand the keyboard and console to the control loop, forever
//
// =============================================================================

#![no_std]
#![no_main]

mod arch;
mod util;

use arch::{boot, cpu};
use barebones::control;
use kdisplay::buffer::VGA_PHYS_ADDR;
use kdisplay::{Console, VgaMemory};
use khal::{Ps2Keyboard, RawPorts};
use log::LevelFilter;

const BANNER: &str = "Kernel Booted. Try Shift AND Caps Lock!\n";

/// Compile-time log level, picked by Cargo feature.
const MAX_LOG_LEVEL: LevelFilter = if cfg!(feature = "no_logs") {
    LevelFilter::Off
} else if cfg!(feature = "log_trace") {
    LevelFilter::Trace
} else {
    LevelFilter::Info
};

/// The kernel's main entry point, called by Limine.
///
/// # Never Returns
/// After setup this becomes the keyboard polling loop.
#[unsafe(no_mangle)]
extern "C" fn kmain() -> ! {
    klog::init(MAX_LOG_LEVEL);
    log::info!("Bare Bones v{}", env!("CARGO_PKG_VERSION"));

    if !boot::base_revision_supported() {
        log::error!("[boot] Limine base revision not supported by bootloader");
        cpu::halt_forever();
    }

    let Some(hhdm_offset) = boot::hhdm_offset() else {
        log::error!("[boot] no HHDM response, cannot reach the VGA buffer");
        cpu::halt_forever();
    };
    log::info!("[boot] HHDM offset: {:#018X}", hhdm_offset);

    let vga_virt = hhdm_offset + VGA_PHYS_ADDR;
    log::info!("[vga] text buffer at {:#018X}", vga_virt);

    // SAFETY: Limine maps all of low physical memory through the HHDM, and
    // this is the only handle to the text buffer we ever create.
    let vga = unsafe { VgaMemory::new(vga_virt as *mut u16) };

    // SAFETY: ring 0. The console only touches the CRTC ports
    // (0x3D4/0x3D5) and the keyboard only the 8042 (0x60/0x64), so the
    // two handles never step on each other.
    let (crtc_ports, ps2_ports) = unsafe { (RawPorts::new(), RawPorts::new()) };

    let mut console = Console::new(vga, crtc_ports);
    console.enable_cursor(14, 15);
    console.write_string(BANNER);
    log::info!("[vga] console initialized, cursor at {:?}", console.cursor());

    let mut keyboard = Ps2Keyboard::new(ps2_ports);
    log::info!("[kbd] polling PS/2 keyboard");

    control::run(&mut keyboard, &mut console)
}
