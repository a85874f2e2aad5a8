use crate::crop::CropRect;
use crate::export::EntryNaming;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-compressor",
    about = "Compress a batch of images to JPEG at one quality level",
    long_about = "img-compressor re-encodes a batch of images as JPEG at a single quality setting, \
                  reports per-image and total size reduction, and exports the results as \
                  individual files or as one zip archive.",
    version,
    after_help = "EXAMPLES:\n  \
    img-compressor compress photo.png -o ./out -q 60\n  \
    img-compressor compress ./images -r -o ./out -e archive\n  \
    img-compressor compress \"shots/*.png\" -o ./out -x 0 -x 3\n  \
    img-compressor convert ./raw -o ./jpg\n  \
    img-compressor crop photo.png -o ./out --area 10,10,640,480\n  \
    img-compressor inspect ./images"
)]
pub struct Args {
    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-image details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the results of a run go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportMode {
    /// One file for a single result, a zip archive for several
    Auto,
    /// One file per result
    Files,
    /// Always a zip archive
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    /// photo.png -> photo_compressed.png
    Suffixed,
    /// photo.png -> compressed_photo.png
    Prefixed,
}

impl From<NamingArg> for EntryNaming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Suffixed => EntryNaming::Suffixed,
            NamingArg::Prefixed => EntryNaming::Prefixed,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a batch of images",
        long_about = "Load every input into one batch, drop the excluded positions, \
                      re-encode the rest as JPEG in parallel and export the results."
    )]
    Compress {
        #[arg(
            required = true,
            help = "Input files, directories, or glob patterns",
            long_help = "Files are checked against the image/* filter and skipped with a warning \
                         when they are not images. Directories and globs only pick up files \
                         with image extensions."
        )]
        inputs: Vec<String>,

        #[arg(short = 'o', long, help = "Output directory")]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            default_value_t = crate::constants::DEFAULT_QUALITY,
            value_parser = clap::value_parser!(u8).range(1..=100),
            help = "JPEG quality (1-100)",
            long_help = "JPEG quality from 1 (smallest) to 100 (best). \
                         Applied to every image of the batch."
        )]
        quality: u8,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(
            short = 'x',
            long = "exclude",
            value_name = "INDEX",
            help = "Drop the pending image at this position before compressing",
            long_help = "Zero-based position in the pending batch, as listed by `inspect`. \
                         May be repeated; positions refer to the batch before any removal."
        )]
        exclude: Vec<usize>,

        #[arg(short = 'e', long, value_enum, default_value_t = ExportMode::Auto)]
        export: ExportMode,

        #[arg(short = 'n', long, value_enum, default_value_t = NamingArg::Suffixed)]
        naming: NamingArg,

        #[arg(
            short = 'j',
            long,
            help = "Number of parallel threads (default: auto)",
            long_help = "Number of worker threads. Defaults to the number of CPU cores, \
                         reduced automatically when memory is tight."
        )]
        threads: Option<usize>,
    },

    #[command(
        about = "Convert a batch of images to JPEG",
        long_about = "Re-encode every input as JPEG at a fixed quality of 90. Results are named \
                      <name>.jpg; several results are bundled as converted_images.zip."
    )]
    Convert {
        #[arg(required = true, help = "Input files, directories, or glob patterns")]
        inputs: Vec<String>,

        #[arg(short = 'o', long, help = "Output directory")]
        output: PathBuf,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(
            short = 'x',
            long = "exclude",
            value_name = "INDEX",
            help = "Drop the pending image at this position before converting"
        )]
        exclude: Vec<usize>,

        #[arg(short = 'e', long, value_enum, default_value_t = ExportMode::Auto)]
        export: ExportMode,

        #[arg(short = 'j', long, help = "Number of parallel threads (default: auto)")]
        threads: Option<usize>,
    },

    #[command(
        about = "Crop one image and save it as JPEG",
        long_about = "Cut a rectangle out of one image and re-encode it as JPEG. Without \
                      --area the centered 80% of each side is kept. The result is named \
                      <name>_cropped.<ext>."
    )]
    Crop {
        #[arg(help = "Input image file")]
        input: PathBuf,

        #[arg(short = 'o', long, help = "Output directory")]
        output: PathBuf,

        #[arg(
            short = 'a',
            long,
            value_name = "X,Y,WIDTH,HEIGHT",
            help = "Crop area in source pixels",
            long_help = "Crop area in source pixels. Parts outside the image are clipped."
        )]
        area: Option<CropRect>,

        #[arg(
            short = 'q',
            long,
            default_value_t = crate::constants::CROP_QUALITY,
            value_parser = clap::value_parser!(u8).range(1..=100),
            help = "JPEG quality (1-100)"
        )]
        quality: u8,
    },

    #[command(
        about = "List the images a batch would contain",
        long_about = "Show name, size, format, dimensions and estimated decode memory \
                      for every image that would be loaded, without compressing."
    )]
    Inspect {
        #[arg(required = true, help = "Input files, directories, or glob patterns")]
        inputs: Vec<String>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,
    },
}
