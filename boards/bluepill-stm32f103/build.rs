//! Places the memory layout of the selected part where the linker finds it

use std::env;
use std::fs;
use std::path::PathBuf;

const MEDIUM_DENSITY: &str = "MEMORY
{
  FLASH : ORIGIN = 0x08000000, LENGTH = 64K
  RAM : ORIGIN = 0x20000000, LENGTH = 20K
}
";

const HIGH_DENSITY: &str = "MEMORY
{
  FLASH : ORIGIN = 0x08000000, LENGTH = 512K
  RAM : ORIGIN = 0x20000000, LENGTH = 64K
}
";

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let memory = if env::var_os("CARGO_FEATURE_HIGH_DENSITY").is_some() {
        HIGH_DENSITY
    } else {
        MEDIUM_DENSITY
    };
    fs::write(out.join("memory.x"), memory).expect("write memory.x");
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=build.rs");
}
