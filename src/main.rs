//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::fs;
use std::time::Instant;

use log::{info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

use bcm::compression::compress::compress;
use bcm::compression::decompress::decompress;
use bcm::tools::cli::{bcmopts_init, Mode};

fn main() -> Result<(), std::io::Error> {
    // Available log levels are Error, Warn, Info, Debug, Trace
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .unwrap();

    let opts = bcmopts_init();
    let start = Instant::now();

    let result = match opts.op_mode {
        Mode::Zip => compress(&opts),
        Mode::Unzip => decompress(&opts),
    };

    if result.is_ok() {
        let in_len = fs::metadata(&opts.infile).map(|m| m.len()).unwrap_or(0);
        let out_len = fs::metadata(&opts.outfile).map(|m| m.len()).unwrap_or(0);
        info!(
            "{}: {} -> {} in {:.3}s",
            opts.infile,
            in_len,
            out_len,
            start.elapsed().as_secs_f64()
        );
    }

    result
}
