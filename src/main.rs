//! DAT1 CLI - Command-line tool for DAT1 asset containers.
//!
//! This is the main entry point for the `dat1` command-line application.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use dat1::prelude::*;

/// DAT1 - asset container inspection and export tool
#[derive(Parser)]
#[command(name = "dat1")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Decode mesh records with the RCRA layout
    #[arg(long, global = true, env = "DAT1_RCRA")]
    rcra: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header and section table of a container
    Info {
        /// Input DAT1 file
        file: PathBuf,
    },

    /// Recheck every stored name hash
    Audit {
        /// Input DAT1 file
        file: PathBuf,
    },

    /// Decode and re-encode a container, verifying the bytes match
    Roundtrip {
        /// Input DAT1 file
        file: PathBuf,

        /// Write the re-encoded container here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Round-trip every DAT1 file under a directory in parallel
    Batch {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Export model geometry as Wavefront OBJ
    Obj {
        /// Input model file
        file: PathBuf,

        /// Output OBJ file
        #[arg(short, long)]
        output: PathBuf,

        /// Looks to include
        #[arg(long = "look", default_values_t = [0])]
        looks: Vec<usize>,

        /// Level of detail
        #[arg(long, default_value_t = 0, env = "DAT1_LOD")]
        lod: usize,

        /// Also write an MTL library next to the OBJ file
        #[arg(long)]
        mtl: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let revision = cli.rcra.then_some(Revision::Rcra);

    match cli.command {
        Commands::Info { file } => {
            cmd_info(&file, revision)?;
        }
        Commands::Audit { file } => {
            cmd_audit(&file, revision)?;
        }
        Commands::Roundtrip { file, output } => {
            cmd_roundtrip(&file, output.as_deref(), revision)?;
        }
        Commands::Batch { dir } => {
            cmd_batch(&dir, revision)?;
        }
        Commands::Obj {
            file,
            output,
            looks,
            lod,
            mtl,
        } => {
            cmd_obj(&file, &output, ExportOptions::new(looks, lod), mtl, revision)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_bytes(data: &[u8], revision: Option<Revision>) -> dat1::format::Result<Dat1> {
    match revision {
        Some(revision) => Dat1::parse_with(data, revision),
        None => Dat1::parse(data),
    }
}

fn load(path: &Path, revision: Option<Revision>) -> Result<(Vec<u8>, Dat1)> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let dat1 = parse_bytes(&data, revision)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok((data, dat1))
}

fn cmd_info(path: &Path, revision: Option<Revision>) -> Result<()> {
    let (data, dat1) = load(path, revision)?;

    println!("File:        {}", path.display());
    println!("Size:        {} bytes", data.len());
    println!("Asset type:  {:#010X}", dat1.asset_type());
    println!("Revision:    {:?}", dat1.revision());
    println!("Strings:     {} bytes", dat1.strings().len());
    println!("Sections:    {}", dat1.sections().len());
    println!();

    for section in dat1.sections() {
        println!(
            "  {:08X} {:>10} {:<9} {}{}",
            section.tag(),
            section.encode().len(),
            section.family(),
            section.name(),
            if section.is_raw() { " (raw)" } else { "" }
        );
    }

    if let Some(mod0) = dat1.get::<Mod0Section>() {
        let json = serde_json::to_string_pretty(mod0.value())?;
        println!("\nMOD0:\n{}", json);
    }

    Ok(())
}

fn cmd_audit(path: &Path, revision: Option<Revision>) -> Result<()> {
    let (_, dat1) = load(path, revision)?;

    let mismatches = dat1.audit();
    for mismatch in &mismatches {
        println!("{}", mismatch);
    }
    println!("\n{} hash mismatches", mismatches.len());

    Ok(())
}

fn cmd_roundtrip(path: &Path, output: Option<&Path>, revision: Option<Revision>) -> Result<()> {
    let start = Instant::now();
    let (data, dat1) = load(path, revision)?;
    let encoded = dat1.to_bytes();

    if let Some(output) = output {
        fs::write(output, &encoded).context("Failed to write output file")?;
    }

    match first_difference(&data, &encoded) {
        None => println!("Round trip OK ({} bytes) in {:?}", data.len(), start.elapsed()),
        Some(offset) => anyhow::bail!(
            "Round trip differs at offset {:#X} (input {} bytes, output {} bytes)",
            offset,
            data.len(),
            encoded.len()
        ),
    }

    Ok(())
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then_some(a.len().min(b.len())))
}

/// Outcome of one file in a batch run.
enum BatchResult {
    Identical,
    Differs(usize),
    Failed(String),
}

fn cmd_batch(dir: &Path, revision: Option<Revision>) -> Result<()> {
    println!("Scanning {}", dir.display());

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let skipped = AtomicUsize::new(0);

    let results: Vec<(PathBuf, BatchResult)> = files
        .par_iter()
        .filter_map(|path| {
            let result = check_file(path, revision);
            pb.inc(1);
            match result {
                Some(result) => Some((path.clone(), result)),
                None => {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
            }
        })
        .collect();

    pb.finish_with_message("Done");

    let mut identical = 0;
    let mut failures = 0;
    for (path, result) in &results {
        match result {
            BatchResult::Identical => identical += 1,
            BatchResult::Differs(offset) => {
                failures += 1;
                eprintln!("{}: differs at {:#X}", path.display(), offset);
            }
            BatchResult::Failed(err) => {
                failures += 1;
                eprintln!("{}: {}", path.display(), err);
            }
        }
    }

    println!(
        "Checked {} containers in {:?}: {} identical, {} failed, {} non-DAT1 files skipped",
        results.len(),
        start.elapsed(),
        identical,
        failures,
        skipped.load(Ordering::Relaxed)
    );

    if failures > 0 {
        anyhow::bail!("{} containers failed the round trip", failures);
    }

    Ok(())
}

/// Round-trip one file; `None` when it is not a DAT1 container.
fn check_file(path: &Path, revision: Option<Revision>) -> Option<BatchResult> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => return Some(BatchResult::Failed(err.to_string())),
    };
    if !Dat1::is_dat1(&data) {
        return None;
    }

    let result = match parse_bytes(&data, revision) {
        Ok(dat1) => match first_difference(&data, &dat1.to_bytes()) {
            None => BatchResult::Identical,
            Some(offset) => BatchResult::Differs(offset),
        },
        Err(err) => BatchResult::Failed(err.to_string()),
    };
    Some(result)
}

fn cmd_obj(
    path: &Path,
    output: &Path,
    options: ExportOptions,
    mtl: bool,
    revision: Option<Revision>,
) -> Result<()> {
    let (_, dat1) = load(path, revision)?;

    let geometry = assemble(&dat1, &options)
        .with_context(|| format!("Failed to export geometry from {}", path.display()))?;

    let mut writer = ObjWriter::new();
    if mtl {
        let mtl_path = output.with_extension("mtl");
        fs::write(&mtl_path, to_mtl(&geometry)).context("Failed to write MTL file")?;
        if let Some(name) = mtl_path.file_name() {
            writer.mtllib(&name.to_string_lossy());
        }
    }
    writer.geometry(&geometry);

    let file = fs::File::create(output).context("Failed to create output file")?;
    let mut out = BufWriter::new(file);
    writer.write_to(&mut out).context("Failed to write OBJ file")?;
    out.flush().context("Failed to write OBJ file")?;

    println!(
        "Wrote {} meshes ({} vertices, {} faces) to {}",
        geometry.meshes.len(),
        geometry.vertex_count(),
        geometry.face_count(),
        output.display()
    );
    if !geometry.warnings.is_empty() {
        println!("{} meshes skipped", geometry.warnings.len());
    }

    Ok(())
}
