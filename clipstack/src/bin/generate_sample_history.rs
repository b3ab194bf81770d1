//! Generate a synthetic clipboard history file.
//!
//! Writes through `EntryStore`, so the output is exactly what the engine
//! itself would persist and reload.
//!
//! Usage:
//!     cargo run --release --bin generate-sample-history [output_path] [count]
//!
//! Default output: ./clipboard-datas.json with 200 entries

use std::env;
use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clipstack::config::{DEFAULT_MAX_COUNT, HISTORY_FILE_NAME};
use clipstack::models::encode_data_url;
use clipstack::{ClipboardContent, ClipboardEntry, EntryStore};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::Rng;

/// Share of entries that are images
const IMAGE_RATIO: f64 = 0.1;

/// Share of entries carrying a user annotation
const ANNOTATED_RATIO: f64 = 0.15;

const SNIPPETS: &[&str] = &[
    "git rebase -i HEAD~3",
    "https://docs.rs/tokio/latest/tokio/sync/mpsc/index.html",
    "SELECT id, name FROM users WHERE active = 1 ORDER BY created_at DESC;",
    "fn main() {\n    println!(\"hello\");\n}",
    "Meeting moved to 3pm, same room",
    "kubectl get pods -n staging --watch",
    "ssh deploy@10.0.4.17",
    "The quick brown fox jumps over the lazy dog",
    "export RUST_LOG=clipstack=debug",
    "{\"status\": \"ok\", \"count\": 42}",
];

const WORDS: &[&str] = &[
    "alpha", "build", "cache", "delta", "error", "fixture", "gamma", "handler", "index",
    "journal", "kernel", "latency", "module", "network", "output", "packet", "query",
    "release", "socket", "thread", "update", "vector", "worker",
];

const STATES: &[&str] = &["pinned", "favorite", "archived"];
const COLORS: &[&str] = &["red", "orange", "green", "blue", "purple"];

fn generate_text(rng: &mut impl Rng) -> String {
    if rng.gen_bool(0.5) {
        return SNIPPETS[rng.gen_range(0..SNIPPETS.len())].to_string();
    }
    let len = rng.gen_range(3..=40);
    let words: Vec<&str> = (0..len)
        .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
        .collect();
    words.join(" ")
}

fn generate_png(rng: &mut impl Rng) -> Result<Vec<u8>> {
    let (width, height) = (rng.gen_range(8..=64), rng.gen_range(8..=64));
    let base: [u8; 3] = [
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
    ];
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            base[0].wrapping_add(x as u8),
            base[1].wrapping_add(y as u8),
            base[2],
        ])
    });

    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, ImageFormat::Png)
        .context("encoding sample image")?;
    Ok(bytes.into_inner())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME));
    let count: usize = match args.get(2) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("count must be a positive integer, got '{raw}'"))?,
        None => DEFAULT_MAX_COUNT as usize,
    };

    println!("Generating sample clipboard history...");
    println!("Output: {}", output_path.display());

    let mut rng = rand::thread_rng();
    let now = Utc::now().timestamp_millis();
    let mut entries = Vec::with_capacity(count);
    let mut images = 0usize;
    // Newest first, strictly decreasing creation times
    let mut creation_time = now;

    for _ in 0..count {
        let content = if rng.gen_bool(IMAGE_RATIO) {
            images += 1;
            ClipboardContent::Image {
                data_url: encode_data_url(&generate_png(&mut rng)?),
            }
        } else {
            ClipboardContent::Text {
                value: generate_text(&mut rng),
            }
        };

        let mut entry = ClipboardEntry::new(creation_time, content);
        if rng.gen_bool(ANNOTATED_RATIO) {
            entry.state = STATES[rng.gen_range(0..STATES.len())].to_string();
            entry.color = COLORS[rng.gen_range(0..COLORS.len())].to_string();
        }

        // Skip consecutive duplicates the same way capture would
        let duplicate = entries
            .last()
            .is_some_and(|prev: &ClipboardEntry| prev.same_content(&entry));
        if !duplicate {
            entries.push(entry);
        }
        creation_time -= rng.gen_range(1_000..=600_000);
    }

    EntryStore::new(output_path.clone())
        .save(&entries)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!();
    println!("History written: {}", output_path.display());
    println!("  Entries: {}", entries.len());
    println!("  Images: {images}");
    Ok(())
}
