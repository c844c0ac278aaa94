use std::{env, fs, path::PathBuf};

/// RP2040 on a Pico: 2 MB QSPI flash with the boot2 stage in its first 256 bytes.
const MEMORY_PICO1: &str = "\
MEMORY {
    BOOT2 : ORIGIN = 0x10000000, LENGTH = 0x100
    FLASH : ORIGIN = 0x10000100, LENGTH = 2048K - 0x100
    RAM   : ORIGIN = 0x20000000, LENGTH = 256K
}
";

fn main() {
    let target = env::var("TARGET").unwrap();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Host builds (tests) link normally; only the Pico firmware needs a memory map.
    if target.starts_with("thumbv6m") {
        let dest = out_dir.join("memory.x");
        fs::write(&dest, MEMORY_PICO1).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());

        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
