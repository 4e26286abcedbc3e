mod cli;

use stickerforge::{config, dispatch};
use stickerforge_av::{exif, ToolRegistry, StickerConverter};
use stickerforge_core::{JobId, StickerFormat};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "stickerforge=trace,stickerforge_av=trace,stickerforge_core=debug".to_string()
        } else {
            "stickerforge=info,stickerforge_av=info,stickerforge_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            to,
            output,
            job,
        } => convert_file(&input, to, output, job, cli.config.as_deref()),
        Commands::Pad {
            input,
            width_pad,
            height_pad,
            output,
        } => pad_file(&input, width_pad, height_pad, output, cli.config.as_deref()),
        Commands::InspectExif { file, json } => inspect_exif(&file, json),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("stickerforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn job_id(job: Option<String>) -> Result<JobId> {
    match job {
        Some(id) => Ok(JobId::new(id)?),
        None => Ok(JobId::generate()),
    }
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }
    std::fs::read(input).with_context(|| format!("Failed to read input file: {:?}", input))
}

fn convert_file(
    input: &Path,
    to: StickerFormat,
    output: Option<PathBuf>,
    job: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let data = read_input(input)?;
    let job = job_id(job)?;

    tracing::info!(job = %job, "Converting {:?} to {}", input, to);
    let converter = StickerConverter::new(&config);
    let converted = dispatch::convert(&converter, &job, &data, to)
        .with_context(|| format!("Conversion of {:?} failed", input))?;

    for failure in &converted.failures {
        println!("Fell back after {}", failure);
    }

    let output = output.unwrap_or_else(|| {
        let ext = converted.format.extension();
        match input.with_extension(ext) {
            same if same == input => input.with_extension(format!("converted.{ext}")),
            other => other,
        }
    });
    std::fs::write(&output, &converted.data)
        .with_context(|| format!("Failed to write output file: {:?}", output))?;

    println!(
        "Wrote {} ({}, {} bytes)",
        output.display(),
        converted.format,
        converted.data.len()
    );
    Ok(())
}

fn pad_file(
    input: &Path,
    width_pad: u32,
    height_pad: u32,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let data = read_input(input)?;

    let converter = StickerConverter::new(&config);
    let padded = converter
        .pad_webp(&JobId::generate(), &data, width_pad, height_pad)
        .with_context(|| format!("Padding {:?} failed", input))?;

    let output = output.unwrap_or_else(|| input.with_extension("padded.webp"));
    std::fs::write(&output, &padded)
        .with_context(|| format!("Failed to write output file: {:?}", output))?;

    println!("Wrote {} ({} bytes)", output.display(), padded.len());
    Ok(())
}

fn inspect_exif(file: &Path, json: bool) -> Result<()> {
    let data = read_input(file)?;

    let chunk = if data.starts_with(b"RIFF") {
        exif::find_exif_chunk(&data)?
            .with_context(|| format!("No EXIF chunk in {:?}", file))?
    } else {
        &data[..]
    };
    let metadata = exif::parse_exif_chunk(chunk)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        println!("Pack id: {}", metadata.pack_id);
        println!("Pack name: {}", metadata.pack_name);
        println!("Publisher: {}", metadata.author_name);
        println!("Emojis: {}", metadata.emojis.join(" "));
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all conversions.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Scratch root: {}", config.scratch.root.display());
    println!("  Pack: {} ({})", config.sticker.pack_name, config.sticker.pack_id);
    println!(
        "  Size ceiling: {} bytes",
        config.limits.reducer.ceiling_bytes
    );
    println!("  Rasterizer: {}", config.tools.rasterizer.program.display());

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("  Warnings:");
        for warning in warnings {
            println!("    - {}", warning);
        }
    }

    Ok(())
}
