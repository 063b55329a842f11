use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "casepress", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a print-ready case PNG from a composite job.
    Compose(ComposeArgs),
    /// Print the server-side price for a composite job's options.
    Price(PriceArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Source artwork (PNG or JPEG).
    #[arg(long)]
    image: PathBuf,

    /// Composite job JSON (placement, measured rects, options).
    #[arg(long)]
    job: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PriceArgs {
    /// Composite job JSON.
    #[arg(long)]
    job: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Price(args) => cmd_price(args),
    }
}

fn read_job_json(path: &Path) -> anyhow::Result<casepress::CompositeJob> {
    let f = File::open(path).with_context(|| format!("open job '{}'", path.display()))?;
    let r = BufReader::new(f);
    let job: casepress::CompositeJob =
        serde_json::from_reader(r).with_context(|| "parse job JSON")?;
    Ok(job)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let job = read_job_json(&args.job)?;

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let source = casepress::decode_source(&bytes)?;

    let raster = casepress::render(&job, &source)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        raster.as_raw(),
        raster.width(),
        raster.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_price(args: PriceArgs) -> anyhow::Result<()> {
    let job = read_job_json(&args.job)?;
    let cents = job.options.total_price_cents();
    println!(
        "{} / {} / {} / {}: ${}.{:02}",
        job.options.color.label(),
        job.options.model.label(),
        job.options.material.label(),
        job.options.finish.label(),
        cents / 100,
        cents % 100
    );
    Ok(())
}
