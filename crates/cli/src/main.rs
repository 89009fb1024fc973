use anyhow::{bail, Context};
use bubbles_core::loader::{LoadMsg, Loader};
use bubbles_core::packer::{DEFAULT_MIN_RADIUS, DEFAULT_SEPARATION};
use bubbles_core::{export, BubblePacker, ContainerSize, DrillPath, PackConfig, TopicTree};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bubbles-cli", about = "Topic bubble layout report generator")]
struct Args {
    /// Topic file (.json tree or .csv of path,weight rows)
    topics: PathBuf,
    /// Container width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f64,
    /// Container height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,
    /// Topic path to drill into, e.g. "Contract > Payment"
    #[arg(short, long, default_value = "")]
    drill: DrillPath,
    /// Smallest bubble radius in pixels
    #[arg(long, default_value_t = DEFAULT_MIN_RADIUS)]
    min_radius: f64,
    /// Minimum center distance as a multiple of the radius
    #[arg(long, default_value_t = DEFAULT_SEPARATION)]
    separation: f64,
    /// Output JSON layout path
    #[arg(short, long)]
    json: Option<PathBuf>,
    /// Output CSV layout path
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Output SVG path
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Output PDF path
    #[arg(long)]
    pdf: Option<PathBuf>,
}

fn load(path: PathBuf) -> anyhow::Result<TopicTree> {
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = crossbeam_channel::unbounded::<LoadMsg>();
    let loader = Loader::new(cancel);
    std::thread::spawn(move || loader.load(path, tx));

    let mut records = 0u64;
    while let Ok(msg) = rx.recv() {
        match msg {
            LoadMsg::Progress { records: r } => records = r,
            LoadMsg::Done(tree) => {
                info!(records, topics = tree.len(), "topic file read");
                return Ok(tree);
            }
            LoadMsg::Error(e) => bail!(e),
        }
    }
    bail!("loader exited without a result")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let tree = load(args.topics.clone())
        .with_context(|| format!("loading {}", args.topics.display()))?;
    let path = tree.resolve(&args.drill)?;
    let items = tree.items_at(&path)?;
    if items.is_empty() {
        println!("The topic you selected has no relevant subtopics");
        return Ok(());
    }

    let packer = BubblePacker::new(PackConfig {
        min_radius: args.min_radius,
        separation_factor: args.separation,
    });
    let layout = packer.pack(&items, ContainerSize::new(args.width, args.height))?;

    if let Some(out) = &args.json {
        std::fs::write(out, serde_json::to_string_pretty(&export::to_json(&layout))?)
            .with_context(|| format!("writing {}", out.display()))?;
    }
    if let Some(out) = &args.csv {
        let file = std::fs::File::create(out).with_context(|| format!("creating {}", out.display()))?;
        export::to_csv(&layout, file)?;
    }
    if let Some(out) = &args.svg {
        std::fs::write(out, export::to_svg(&layout)).with_context(|| format!("writing {}", out.display()))?;
    }
    if let Some(out) = &args.pdf {
        export::to_pdf(&layout, out).map_err(|e| anyhow::anyhow!("writing {}: {e}", out.display()))?;
    }

    println!(
        "{}: placed {} of {} topics ({} dropped) in {} x {}",
        path.breadcrumbs().join(" > "),
        layout.circles.len(),
        items.len(),
        layout.dropped.len(),
        layout.container.width,
        layout.container.height
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_drill_path() {
        let args = Args::try_parse_from(["bubbles-cli", "t.csv", "--drill", "Contract > Payment", "--width", "400"]).unwrap();
        assert_eq!(args.drill.labels(), ["Contract", "Payment"]);
        assert_eq!(args.width, 400.0);
        assert_eq!(args.height, 600.0);
        assert_eq!(args.min_radius, DEFAULT_MIN_RADIUS);
    }

    #[test]
    fn default_drill_is_top_level() {
        let args = Args::try_parse_from(["bubbles-cli", "t.json"]).unwrap();
        assert!(args.drill.is_root());
    }
}
