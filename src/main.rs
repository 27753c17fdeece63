use clap::{Args, Parser, Subcommand};
use pixelveil::cli::{
    combine_from_manifest, combine_images, embed_file, extract_payload, extract_to_file,
    format_embed_summary, generate_carrier, show_capacity, show_comparison, show_detection,
    split_file, DetectOptions, SplitOptions,
};
use pixelveil::params::DEFAULT_CHANNEL;
use pixelveil::{Density, EncodingParams, StegError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("PIXELVEIL_VERSION");
const PROFILE: &str = env!("PIXELVEIL_PROFILE");
const GIT_HASH: &str = env!("PIXELVEIL_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "pixelveil")]
#[command(author, about = "LSB image steganography, quality metrics and steganalysis", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Copy)]
struct EncodingArgs {
    /// Bits per sample (1-3)
    #[arg(short, long, default_value_t = 1)]
    bits: u8,

    /// Density preset instead of --bits: high, standard or fast
    #[arg(long, conflicts_with = "bits", value_parser = parse_density)]
    density: Option<Density>,

    /// Channel index (0 = red, 1 = green, 2 = blue)
    #[arg(short, long, default_value_t = DEFAULT_CHANNEL)]
    channel: usize,
}

impl EncodingArgs {
    fn params(&self) -> EncodingParams {
        match self.density {
            Some(density) => EncodingParams::from_density(density, self.channel),
            None => EncodingParams::new(self.bits, self.channel),
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PayloadArgs {
    /// Text message to hide
    #[arg(short, long)]
    message: Option<String>,

    /// File whose bytes to hide
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl PayloadArgs {
    fn read(&self) -> pixelveil::Result<Vec<u8>> {
        match (&self.message, &self.file) {
            (Some(message), _) => Ok(message.as_bytes().to_vec()),
            (None, Some(path)) => Ok(std::fs::read(path)?),
            (None, None) => Err(StegError::InvalidParameters(
                "give --message or --file".into(),
            )),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a payload in a cover image
    #[command(alias = "e")]
    Embed {
        /// Cover image
        cover: PathBuf,

        /// Output stego image (png, bmp or tiff)
        output: PathBuf,

        #[command(flatten)]
        payload: PayloadArgs,

        #[command(flatten)]
        encoding: EncodingArgs,

        /// Encrypt the payload with this password before embedding
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Recover a payload from a stego image
    #[command(alias = "x")]
    Extract {
        /// Stego image
        image: PathBuf,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        encoding: EncodingArgs,

        /// Decrypt the payload with this password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show how many bytes an image can hold
    Capacity {
        image: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_CHANNEL)]
        channel: usize,

        #[arg(long)]
        json: bool,
    },

    /// Measure the distortion between a cover and a stego image
    Compare {
        original: PathBuf,
        modified: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Estimate whether an image (or text file) hides data
    #[command(alias = "d")]
    Detect {
        input: PathBuf,

        /// Analyze the input as text (zero-width characters)
        #[arg(long)]
        text: bool,

        /// JSON detector configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Channel to analyze, overriding the configuration
        #[arg(short, long)]
        channel: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Split a payload into XOR shares hidden in several carriers
    Split {
        /// Carrier images, one per share (or one, with --parts)
        #[arg(long = "carrier", required = true)]
        carriers: Vec<PathBuf>,

        /// Number of shares when reusing a single carrier
        #[arg(long)]
        parts: Option<usize>,

        /// Directory for share images and manifest.json
        #[arg(short, long)]
        output_dir: PathBuf,

        #[command(flatten)]
        payload: PayloadArgs,

        #[command(flatten)]
        encoding: EncodingArgs,

        /// Encrypt the payload with this password before splitting
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Recover a payload from every share image
    Combine {
        /// Manifest written by split
        #[arg(long, conflicts_with = "images")]
        manifest: Option<PathBuf>,

        /// Share images, in any order
        images: Vec<PathBuf>,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        encoding: EncodingArgs,

        /// Decrypt the recovered payload with this password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Write a synthetic gradient carrier
    Generate {
        /// Size as WIDTHxHEIGHT
        dimensions: String,
        output: PathBuf,
    },
}

fn parse_density(s: &str) -> Result<Density, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn write_payload(payload: &[u8], output: Option<PathBuf>) -> pixelveil::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, payload)?;
            println!("Extracted {} bytes to {}", payload.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(payload)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn run(command: Commands) -> pixelveil::Result<()> {
    match command {
        Commands::Embed {
            cover,
            output,
            payload,
            encoding,
            password,
        } => {
            let data = payload.read()?;
            let summary =
                embed_file(&cover, &data, &output, &encoding.params(), password.as_deref())?;
            print!("{}", format_embed_summary(&summary, &output));
        }

        Commands::Extract {
            image,
            output,
            encoding,
            password,
        } => {
            let params = encoding.params();
            let password = password.as_deref();
            match output {
                Some(path) => {
                    let count = extract_to_file(&image, &path, &params, password)?;
                    println!("Extracted {} bytes to {}", count, path.display());
                }
                None => write_payload(&extract_payload(&image, &params, password)?, None)?,
            }
        }

        Commands::Capacity {
            image,
            channel,
            json,
        } => print!("{}", show_capacity(&image, channel, json)?),

        Commands::Compare {
            original,
            modified,
            json,
        } => print!("{}", show_comparison(&original, &modified, json)?),

        Commands::Detect {
            input,
            text,
            config,
            channel,
            json,
        } => {
            let options = DetectOptions {
                text,
                config,
                channel,
            };
            print!("{}", show_detection(&input, &options, json)?);
        }

        Commands::Split {
            carriers,
            parts,
            output_dir,
            payload,
            encoding,
            password,
        } => {
            let data = payload.read()?;
            let options = SplitOptions {
                params: encoding.params(),
                parts,
                password,
            };
            let manifest = split_file(&data, &carriers, &output_dir, &options)?;
            println!(
                "Split {} bytes into {} shares in {}",
                manifest.payload_bytes,
                manifest.parts,
                output_dir.display()
            );
        }

        Commands::Combine {
            manifest,
            images,
            output,
            encoding,
            password,
        } => {
            let password = password.as_deref();
            let payload = match manifest {
                Some(path) => combine_from_manifest(&path, password)?,
                None => combine_images(&images, &encoding.params(), password)?,
            };
            write_payload(&payload, output)?;
        }

        Commands::Generate { dimensions, output } => {
            let pixels = generate_carrier(&dimensions, &output)?;
            println!("Wrote {} ({} pixels)", output.display(), pixels);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("pixelveil {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    init_logging(cli.verbose);

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
