use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use image_gen::config::Config;
use image_gen::extract::extract_and_save_images;
use image_gen::fs_utils::resolve_output_dir;
use image_gen::generate::{image_to_image, multi_image_gen, text_to_image};
use image_gen::models::SavedImage;

#[derive(Parser, Debug)]
#[command(
    name = "image-gen",
    version,
    about = "Generate images from text prompts and reference images through a chat-completions API",
    long_about = None
)]
struct Cli {
    /// Generation mode
    #[arg(short, long, value_enum, required_unless_present = "config")]
    mode: Option<Mode>,

    /// Image description or transformation instructions
    #[arg(short, long, required_unless_present = "config")]
    prompt: Option<String>,

    /// Input image path (i2i mode)
    #[arg(short, long)]
    image: Option<String>,

    /// Comma-separated input image paths (multi mode)
    #[arg(long)]
    images: Option<String>,

    /// Model name (defaults to the configured model)
    #[arg(long)]
    model: Option<String>,

    /// Disable streaming output
    #[arg(long)]
    no_stream: bool,

    /// Do not save images embedded in the response
    #[arg(long)]
    no_save: bool,

    /// Directory generated images are written to
    #[arg(long, env = "IMAGE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Print the current configuration and exit
    #[arg(long)]
    config: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Text-to-image
    Text,
    /// Image-to-image
    #[value(name = "i2i")]
    I2i,
    /// Multi-image fusion
    Multi,
}

/// Per-mode inputs, checked before anything touches the network.
#[derive(Debug, PartialEq)]
enum ModeArgs {
    Text,
    ImageToImage(String),
    MultiImage(Vec<String>),
}

fn mode_args(mode: Mode, image: Option<&str>, images: Option<&str>) -> Result<ModeArgs, String> {
    match mode {
        Mode::Text => Ok(ModeArgs::Text),
        Mode::I2i => image
            .map(|path| ModeArgs::ImageToImage(path.to_string()))
            .ok_or_else(|| "i2i mode requires --image".to_string()),
        Mode::Multi => {
            let paths: Vec<String> = images
                .unwrap_or_default()
                .split(',')
                .map(|path| path.trim().to_string())
                .filter(|path| !path.is_empty())
                .collect();
            if paths.is_empty() {
                return Err("multi mode requires --images".to_string());
            }
            Ok(ModeArgs::MultiImage(paths))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if cli.config {
        config.print();
        return ExitCode::SUCCESS;
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    // clap enforces both unless --config was given, which returns earlier.
    let (mode, prompt) = match (cli.mode, cli.prompt.as_deref()) {
        (Some(mode), Some(prompt)) => (mode, prompt),
        _ => anyhow::bail!("--mode and --prompt are required"),
    };

    let args = match mode_args(mode, cli.image.as_deref(), cli.images.as_deref()) {
        Ok(args) => args,
        Err(message) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, message)
            .exit(),
    };

    let stream = !cli.no_stream && config.stream;
    let model = cli.model.as_deref();

    let response = match &args {
        ModeArgs::Text => text_to_image(&config, prompt, model, Some(stream)).await?,
        ModeArgs::ImageToImage(path) => {
            image_to_image(&config, prompt, path, model, Some(stream)).await?
        }
        ModeArgs::MultiImage(paths) => {
            multi_image_gen(&config, prompt, paths, model, Some(stream)).await?
        }
    };

    // Streamed responses were already printed fragment by fragment.
    if !stream {
        println!("{response}");
    }

    if !cli.no_save {
        let output_dir = resolve_output_dir(cli.output_dir.as_deref()).await?;
        let records = extract_and_save_images(&response, &output_dir).await?;
        print_summary(&records);
    }

    Ok(())
}

fn print_summary(records: &[SavedImage]) {
    if records.is_empty() {
        return;
    }

    let saved_count = records.iter().filter(|record| !record.is_remote()).count();
    println!();
    println!(
        "Saved {saved_count} image(s), found {} reference(s) in response:",
        records.len()
    );
    for record in records {
        if record.is_remote() {
            println!("  [url] {} (alt: {})", record.location, record.alt);
        } else {
            println!(
                "  [{}] {} ({} bytes)",
                record.format, record.location, record.size_bytes
            );
        }
    }
}
