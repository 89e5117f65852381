//! Command line interface.

use super::app_config::{EmojiStyle, LogLevel};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "memeoff",
    version,
    about = "Caption images with meme formats",
    long_about = None
)]
/// Command line arguments.
pub struct CliArgs {
    /// Options valid for every subcommand.
    #[command(flatten)]
    pub common: CommonArgs,

    /// What to do.
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides shared by every subcommand.
#[derive(Debug, Default, Args)]
pub struct CommonArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// File with one content source per line.
    #[arg(long, value_name = "PATH", global = true)]
    pub source_list: Option<PathBuf>,

    /// Directory of the random image cache files.
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Emoji artwork style.
    #[arg(short, long, value_enum, global = true)]
    pub emoji_style: Option<EmojiStyle>,

    /// Minimum source image width in pixels.
    #[arg(long, global = true)]
    pub min_width: Option<u32>,

    /// Width every source image is resized to.
    #[arg(long, global = true)]
    pub force_width: Option<u32>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Answer one message, e.g. `-M -I top text // bottom text`.
    Render {
        /// Message text.
        message: String,

        /// Image attached to the message: a local file or an http(s) URL.
        #[arg(short, long, value_name = "PATH|URL")]
        image: Option<String>,

        /// Where to write the image. Defaults to the reply file name in the
        /// current directory. An existing directory receives the reply file name.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Skip the cache refresh that follows a successful reply.
        #[arg(long)]
        no_refresh: bool,
    },

    /// Apply every line of a command file to one image.
    Batch {
        /// Source image.
        #[arg(short, long, value_name = "PATH")]
        image: PathBuf,

        /// File with one message per line.
        #[arg(short, long, value_name = "PATH")]
        batch: PathBuf,

        /// Output directory. Receives `<image>/<batch>/<line>.<ext>`.
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },

    /// Scrape every source into the random image cache.
    Refresh {
        /// Keep retrying while the cache has no unused images.
        #[arg(long)]
        warm_up: bool,
    },

    /// Print the random image cache pool sizes.
    Stats,
}
