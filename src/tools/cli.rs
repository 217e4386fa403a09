use std::process::exit;
use std::{fmt::Display, fmt::Formatter};

use clap::Parser;
use log::{error, info};

/// Zip or Unzip
#[derive(Debug)]
pub enum Mode {
    Zip,
    Unzip,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Resolved program options, built from the command line by bcmopts_init.
#[derive(Debug)]
pub struct BcmOpts {
    /// Maximum input block size in bytes handed to the BWT in one piece
    pub block_size: usize,
    /// Name of the file to read
    pub infile: String,
    /// Name of the file to write, derived from infile when not given
    pub outfile: String,
    /// Compress or decompress
    pub op_mode: Mode,
    /// Silently overwrite an existing output file
    pub force_overwrite: bool,
}

/// Command line definition - uses the external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A BWT-based file compressor",
    long_about = None)]
struct Args {
    /// File to process
    #[clap()]
    infile: String,

    /// Output file (derived from the input name when omitted)
    #[clap()]
    outfile: Option<String>,

    /// Block size in MiB, or in KiB with a trailing k (e.g. -b16 or -b4096k)
    #[clap(short = 'b', value_name = "SIZE", default_value = "20")]
    block: String,

    /// Decompress the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Force overwrite of the output file
    #[clap(short = 'f', long = "force")]
    force: bool,
}

/// Interpret the command line into a BcmOpts struct, then log what we
/// decided. Any usage problem reports and exits with status 1.
pub fn bcmopts_init() -> BcmOpts {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Clap would exit with its own status code; the contract here is
            // 1 for every failure.
            let _ = e.print();
            exit(1);
        }
    };

    let block_size = match parse_block_size(&args.block) {
        Some(size) => size,
        None => {
            error!("Block size is out of range");
            exit(1);
        }
    };

    let op_mode = if args.decompress { Mode::Unzip } else { Mode::Zip };
    let outfile = match args.outfile {
        Some(name) => name,
        None => derive_output_name(&args.infile, &op_mode),
    };
    if outfile == args.infile {
        error!(
            "{}: cannot {}compress onto itself",
            args.infile,
            if args.decompress { "de" } else { "" }
        );
        exit(1);
    }

    let opts = BcmOpts {
        block_size,
        infile: args.infile,
        outfile,
        op_mode,
        force_overwrite: args.force,
    };

    info!("Operational mode set to {}", opts.op_mode);
    info!("Block size set to {} bytes", opts.block_size);
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    opts
}

/// A bare number is MiB, a trailing `k` means KiB. The converted size must
/// be at least one byte and fit the frame's signed 32-bit length field.
fn parse_block_size(arg: &str) -> Option<usize> {
    let (number, shift) = match arg.strip_suffix('k') {
        Some(number) => (number, 10),
        None => (arg, 20),
    };
    let size = number.parse::<usize>().ok()?.checked_mul(1 << shift)?;
    if (1..=i32::MAX as usize).contains(&size) {
        Some(size)
    } else {
        None
    }
}

fn derive_output_name(infile: &str, mode: &Mode) -> String {
    match mode {
        Mode::Zip => format!("{}.bcm", infile),
        Mode::Unzip => match infile.strip_suffix(".bcm") {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => format!("{}.out", infile),
        },
    }
}
