use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sprite_recolor::{RecolorProfile, Recolorer, RemapOptions, VariantName};

#[derive(Parser)]
#[command(name = "sprite-recolor")]
#[command(about = "Generate recolored variants of sprite images")]
struct Cli {
    /// Source images to recolor
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON recolor profile describing the variants
    #[arg(short, long)]
    profile: PathBuf,

    /// Output directory (defaults to each input's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Leave unmapped pixels transparent instead of failing
    #[arg(long)]
    ignore_missing: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sprite_recolor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let json = std::fs::read_to_string(&cli.profile)
        .with_context(|| format!("Failed to read profile {}", cli.profile.display()))?;
    let profile = RecolorProfile::from_json(&json)
        .with_context(|| format!("Invalid profile {}", cli.profile.display()))?;
    let recolorer = profile.recolorer()?;
    check_variant_names(recolorer.lookup().names())?;
    let options = remap_options(&profile, cli.ignore_missing);

    if let Some(dir) = &cli.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    for input in &cli.inputs {
        recolor_file(&recolorer, input, cli.out_dir.as_deref(), &options)?;
    }

    Ok(())
}

/// The profile's options with the command-line flag OR-ed in.
fn remap_options(profile: &RecolorProfile, ignore_missing: bool) -> RemapOptions {
    let mut options = profile.remap_options();
    options.ignore_missing |= ignore_missing;
    options
}

/// Variant names become file name components, so they must not act as paths.
fn check_variant_names<'a>(
    names: impl IntoIterator<Item = &'a VariantName>,
) -> anyhow::Result<()> {
    for name in names {
        let name = name.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            anyhow::bail!("Variant name {name:?} cannot be used in a file name");
        }
    }
    Ok(())
}

/// Output path of one variant: `<dir>/<stem>-<variant>.png`.
fn variant_path(dir: &Path, stem: &str, variant: &VariantName) -> PathBuf {
    dir.join(format!("{stem}-{variant}.png"))
}

/// Recolors one input file and returns the paths that were written.
fn recolor_file(
    recolorer: &Recolorer,
    input: &Path,
    out_dir: Option<&Path>,
    options: &RemapOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    let source = image::open(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?
        .to_rgba8();
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("No usable file name in {}", input.display()))?;
    let dir = out_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new("."));

    // Previously generated variants let unchanged outputs be skipped
    let mut priors = HashMap::new();
    for name in recolorer.lookup().names() {
        let path = variant_path(dir, stem, name);
        if !path.exists() {
            continue;
        }
        match image::open(&path) {
            Ok(prior) => {
                priors.insert(name.clone(), prior.to_rgba8());
            }
            Err(e) => tracing::warn!(path = %path.display(), %e, "Ignoring unreadable prior image"),
        }
    }

    let options = options.clone().with_image_name(stem);
    let output = recolorer.remap(&source, Some(&priors), &options)?;

    let mut written = Vec::with_capacity(output.len());
    for (name, image) in output.iter() {
        let path = variant_path(dir, stem, name);
        image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote variant");
        written.push(path);
    }

    tracing::info!(
        image = stem,
        written = written.len(),
        unchanged = recolorer.lookup().len() - written.len(),
        "Recolored"
    );

    Ok(written)
}
