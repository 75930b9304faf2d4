use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use backdrop::{BackgroundKind, DeviceClass, Point, Size};

mod page;
mod server;
mod svg;
mod trace;

/// Pointer-reactive animated backgrounds: headless renders and a live preview.
#[derive(Parser)]
#[command(name = "backdrop")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a background headlessly and write its last frame
    Render {
        /// Background to run (or the section hosting it: hero, technologies, contact)
        #[arg(short, long)]
        kind: BackgroundKind,

        #[arg(long, default_value = "800")]
        width: f32,

        #[arg(long, default_value = "600")]
        height: f32,

        /// Use the mobile constants
        #[arg(long)]
        mobile: bool,

        /// Number of frames to simulate
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Frame rate the timestamps are generated at
        #[arg(long, default_value = "60")]
        fps: f32,

        #[arg(long, default_value = "1")]
        seed: u64,

        /// Pointer position as x,y; repeat for a path, one sample per frame
        #[arg(long = "pointer", value_parser = trace::parse_point)]
        pointers: Vec<Point>,

        /// Tuning overrides (.yaml or .json)
        #[arg(short, long)]
        tuning: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Start the preview server with hot reload
    Serve {
        /// Tuning overrides (.yaml or .json), watched for changes
        #[arg(short, long)]
        tuning: Option<PathBuf>,

        /// Output directory for the preview page
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Print the effective tuning as YAML
    Tuning {
        /// Tuning overrides (.yaml or .json)
        #[arg(short, long)]
        tuning: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Svg,
}

fn write_output(output: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{contents}"),
    }
    Ok(())
}

fn render(
    options: &trace::RenderOptions,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let trace = trace::run(options);
    tracing::info!(
        kind = %trace.kind,
        frames = trace.frames,
        population = trace.population,
        ops = trace.ops.len(),
        "rendered"
    );

    let contents = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&trace)? + "\n",
        OutputFormat::Svg => {
            let mut svg = svg::SvgSurface::new(options.size);
            for op in &trace.ops {
                op.apply(&mut svg);
            }
            svg.finish()
        }
    };
    write_output(output, &contents)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            kind,
            width,
            height,
            mobile,
            frames,
            fps,
            seed,
            pointers,
            tuning,
            format,
            output,
        } => {
            anyhow::ensure!(fps > 0.0, "--fps must be positive");
            let options = trace::RenderOptions {
                kind,
                size: Size::new(width, height),
                class: if mobile {
                    DeviceClass::Mobile
                } else {
                    DeviceClass::Desktop
                },
                frames,
                fps,
                seed,
                pointers,
                tuning: server::load_tuning(tuning.as_deref())?,
            };
            render(&options, format, output.as_deref())?;
        }
        Commands::Serve {
            tuning,
            output,
            port,
        } => {
            server::serve(tuning.as_deref(), &output, port).await?;
        }
        Commands::Tuning { tuning } => {
            let tuning = server::load_tuning(tuning.as_deref())?;
            print!("{}", serde_yaml::to_string(&tuning)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_render_with_defaults() {
        let cli = Cli::try_parse_from(["backdrop", "render", "--kind", "particles"]).unwrap();
        match cli.command {
            Commands::Render {
                kind,
                width,
                height,
                mobile,
                frames,
                format,
                pointers,
                ..
            } => {
                assert_eq!(kind, BackgroundKind::Particles);
                assert_eq!((width, height), (800.0, 600.0));
                assert!(!mobile);
                assert_eq!(frames, 120);
                assert_eq!(format, OutputFormat::Json);
                assert!(pointers.is_empty());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn cli_parses_render_with_section_name_and_pointers() {
        let cli = Cli::try_parse_from([
            "backdrop", "render", "--kind", "contact", "--pointer", "10,20", "--pointer",
            "30,40", "--format", "svg", "--mobile",
        ])
        .unwrap();
        match cli.command {
            Commands::Render {
                kind,
                pointers,
                format,
                mobile,
                ..
            } => {
                assert_eq!(kind, BackgroundKind::Rings);
                assert_eq!(pointers, vec![Point::new(10.0, 20.0), Point::new(30.0, 40.0)]);
                assert_eq!(format, OutputFormat::Svg);
                assert!(mobile);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["backdrop", "render", "--kind", "stars"]).is_err());
    }

    #[test]
    fn cli_parses_serve_subcommand() {
        let cli = Cli::try_parse_from([
            "backdrop", "serve", "--tuning", "tuning.yaml", "--port", "8080",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                tuning,
                output,
                port,
            } => {
                assert_eq!(tuning, Some(PathBuf::from("tuning.yaml")));
                assert_eq!(output, PathBuf::from("output"));
                assert_eq!(port, 8080);
            }
            _ => panic!("Expected Serve command"),
        }
    }
}
