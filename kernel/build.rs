use std::env;
use std::path::Path;

fn main() {
	// Host builds (unit tests) link normally; only the freestanding kernel
	// image needs the higher-half linker script.
	if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("none") {
		return;
	}

	let script = Path::new(env!("CARGO_MANIFEST_DIR")).join("linker.ld");
	println!("cargo:rustc-link-arg-bins=-T{}", script.display());
	println!("cargo:rerun-if-changed=linker.ld");
}
