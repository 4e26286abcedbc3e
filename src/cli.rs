use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stickerforge_core::StickerFormat;

#[derive(Parser)]
#[command(name = "stickerforge")]
#[command(author, version, about = "Sticker conversion between chat platforms")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a sticker to another format
    Convert {
        /// Input sticker (tgs, webm, webp)
        #[arg(required = true)]
        input: PathBuf,

        /// Target format: webp, webm or gif
        #[arg(long)]
        to: StickerFormat,

        /// Output file (defaults to the input name with the target extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Job id naming the scratch directory (random if not specified)
        #[arg(long)]
        job: Option<String>,
    },

    /// Pad a still WEBP onto a larger transparent canvas
    Pad {
        /// Input WEBP
        #[arg(required = true)]
        input: PathBuf,

        /// Pixels added to the width, split across both sides
        #[arg(long, default_value = "0")]
        width_pad: u32,

        /// Pixels added to the height, split across both sides
        #[arg(long, default_value = "0")]
        height_pad: u32,

        /// Output file (defaults to <input>.padded.webp)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the sticker pack metadata of a WEBP or raw EXIF chunk
    InspectExif {
        /// WEBP file or raw EXIF chunk
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
