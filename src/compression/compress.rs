use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Error, ErrorKind, Read, Write};
use std::path::Path;

use log::{debug, error, info};

use crate::bwt_algorithms::bwt_sort::bwt_encode;
use crate::cm_coding::model::Model;
use crate::cm_coding::range_coder::RangeEncoder;
use crate::tools::cli::BcmOpts;

/// Stream signature, first four bytes of every compressed file.
pub const MAGIC: &[u8; 4] = b"BCM1";

/// The range coder emits one byte at a time; buffered I/O underneath it is
/// part of the performance contract, not an option.
pub(crate) const IO_BUFFER_SIZE: usize = 64 * 1024;

/// Compress the input file named in opts into the output file named in opts.
pub fn compress(opts: &BcmOpts) -> io::Result<()> {
    let source = File::open(&opts.infile).map_err(|e| {
        error!("{}: {}", opts.infile, e);
        e
    })?;
    let metadata = fs::metadata(&opts.infile)?;

    // No point holding a 20 MiB block for a small file.
    let block_size = opts.block_size.min(metadata.len() as usize);

    if !opts.force_overwrite && Path::new(&opts.outfile).exists() {
        error!("{} already exists", opts.outfile);
        return Err(Error::new(
            ErrorKind::AlreadyExists,
            "output file already exists",
        ));
    }
    info!(
        "Compressing {} to {} (block size {} bytes).",
        opts.infile, opts.outfile, block_size
    );

    let mut reader = BufReader::with_capacity(IO_BUFFER_SIZE, source);
    let writer = BufWriter::with_capacity(IO_BUFFER_SIZE, File::create(&opts.outfile)?);
    compress_stream(&mut reader, writer, block_size)?;
    Ok(())
}

/// The block pipeline: read up to `block_size` bytes, transform, and feed
/// length, primary index and payload through the model. One model and one
/// coder serve the whole stream, so the statistics learned in one block
/// carry into the next. A zero-length header terminates the stream.
pub fn compress_stream<R: Read, W: Write>(
    reader: &mut R,
    mut writer: W,
    block_size: usize,
) -> io::Result<W> {
    writer.write_all(MAGIC)?;
    let mut coder = RangeEncoder::new(writer);
    let mut model = Model::new();
    let mut buf = allocate_block(block_size)?;

    loop {
        let n = read_block(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        let key = bwt_encode(&mut buf[..n]);
        if key < 1 {
            error!("Block transform failed.");
            return Err(Error::new(ErrorKind::InvalidInput, "forward BWT failed"));
        }
        debug!("Coding a block of {} bytes, primary index {}.", n, key);

        encode_u32(&mut model, &mut coder, n as u32)?;
        encode_u32(&mut model, &mut coder, key as u32)?;
        for &byte in &buf[..n] {
            model.encode(&mut coder, byte)?;
        }
    }

    // End of stream marker.
    encode_u32(&mut model, &mut coder, 0)?;
    coder.flush()
}

/// Multi-byte header fields travel through the same model as the payload,
/// high byte first.
pub(crate) fn encode_u32<W: Write>(
    model: &mut Model,
    coder: &mut RangeEncoder<W>,
    value: u32,
) -> io::Result<()> {
    for shift in [24, 16, 8, 0] {
        model.encode(coder, (value >> shift) as u8)?;
    }
    Ok(())
}

/// A block buffer can be most of the address space on a big `-b`; failing
/// with a report beats aborting inside the allocator.
pub(crate) fn allocate_block(block_size: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if buf.try_reserve_exact(block_size).is_err() {
        error!("Out of memory");
        return Err(Error::new(ErrorKind::OutOfMemory, "out of memory"));
    }
    buf.resize(block_size, 0);
    Ok(buf)
}

// Fill the block from the reader, tolerating short reads. A zero return
// means end of input.
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(count) => filled += count,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
