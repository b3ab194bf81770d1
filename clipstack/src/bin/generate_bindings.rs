//! Generate UniFFI bindings for ClipStack
//!
//! Run: cargo run --bin generate-bindings [swift|kotlin]...
//!
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ Inputs:                                                                     │
//! │   target/release/libclipstack.{dylib,so}  ← Built library for bindgen       │
//! │                                                                             │
//! │ Outputs:                                                                    │
//! │   generated/swift/clipstack.swift         ← Swift bindings                  │
//! │   generated/swift/clipstackFFI.h          ← C header                        │
//! │   generated/swift/module.modulemap        ← Clang module map                │
//! │   generated/kotlin/uniffi/clipstack/...   ← Kotlin bindings                 │
//! └─────────────────────────────────────────────────────────────────────────────┘

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

const LANGUAGES: &[&str] = &["swift", "kotlin"];

fn main() -> Result<()> {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace_dir = crate_dir
        .parent()
        .context("crate has no parent directory")?
        .to_path_buf();

    let requested: Vec<String> = env::args().skip(1).collect();
    let languages: Vec<&str> = if requested.is_empty() {
        LANGUAGES.to_vec()
    } else {
        requested.iter().map(String::as_str).collect()
    };
    if let Some(unknown) = languages.iter().find(|l| !LANGUAGES.contains(l)) {
        bail!("unsupported language '{unknown}', expected one of {LANGUAGES:?}");
    }

    println!("Building Rust library...");
    run_cmd("cargo", &["build", "--release", "-p", "clipstack"], &workspace_dir)?;

    let library = library_path(&workspace_dir)?;
    let generated = crate_dir.join("generated");

    for language in languages {
        let out_dir = generated.join(language);
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating {}", out_dir.display()))?;

        println!("Generating {language} bindings...");
        run_cmd(
            "cargo",
            &[
                "run",
                "--release",
                "--bin",
                "uniffi-bindgen",
                "generate",
                "--library",
                &library.to_string_lossy(),
                "--language",
                language,
                "--out-dir",
                &out_dir.to_string_lossy(),
            ],
            &crate_dir,
        )?;

        if language == "swift" {
            // uniffi names the modulemap after the FFI module; the host expects a plain name
            let generated_map = out_dir.join("clipstackFFI.modulemap");
            if generated_map.exists() {
                fs::rename(&generated_map, out_dir.join("module.modulemap"))
                    .context("renaming modulemap")?;
            }
        }
        println!("  - {}", out_dir.display());
    }

    println!("Done! Bindings regenerated successfully.");
    Ok(())
}

fn library_path(workspace_dir: &Path) -> Result<PathBuf> {
    let release = workspace_dir.join("target").join("release");
    ["libclipstack.dylib", "libclipstack.so", "clipstack.dll"]
        .iter()
        .map(|name| release.join(name))
        .find(|path| path.exists())
        .with_context(|| format!("no clipstack cdylib in {}", release.display()))
}

fn run_cmd(program: &str, args: &[&str], dir: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("failed to run {program}"))?;

    if !status.success() {
        bail!("{program} failed with status: {status}");
    }
    Ok(())
}
