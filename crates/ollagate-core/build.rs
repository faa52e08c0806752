use std::env;
use std::fs;
use std::path::Path;

include!("../build_common.rs");

fn main() {
    process_readme_for_rustdoc(env!("CARGO_MANIFEST_DIR"));
}
