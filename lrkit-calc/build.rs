// build.rs
use std::path::PathBuf;

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    let input_file = PathBuf::from(&manifest_dir).join("src/pemdas.ebnf");
    println!("cargo:rerun-if-changed={}", input_file.display());
    println!("cargo:warning=LRKIT Input file is {}", input_file.display());
    println!(
        "cargo:warning=LRKIT Output directory is {}",
        out_dir.display()
    );
    lrkit_gen::generate(&input_file, &out_dir, "pemdas", false).unwrap();
}
