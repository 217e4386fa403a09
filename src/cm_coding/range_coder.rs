use std::io::{self, Read, Write};

/// Binary range coder over a 32-bit `[low, high]` interval.
///
/// Probabilities are 18-bit: the chance that the coded bit is a one, scaled
/// to `[0, 1 << 18)`. The split point is computed with a 64-bit intermediate
/// product so the encoder and decoder agree bit for bit. Renormalization is
/// byte-granular: whenever the top bytes of `low` and `high` match, that byte
/// is settled and moves to the output.
pub struct RangeEncoder<W: Write> {
    low: u32,
    high: u32,
    writer: W,
}

impl<W: Write> RangeEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            low: 0,
            high: u32::MAX,
            writer,
        }
    }

    pub fn encode_bit(&mut self, p: u32, bit: bool) -> io::Result<()> {
        let mid = self.low + ((u64::from(self.high - self.low) * u64::from(p)) >> 18) as u32;
        if bit {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }
        // Top bytes equal means the byte can never change again. Ship it.
        while (self.low ^ self.high) < (1 << 24) {
            self.writer.write_all(&[(self.low >> 24) as u8])?;
            self.low <<= 8;
            self.high = (self.high << 8) | 255;
        }
        Ok(())
    }

    /// Settle the final interval by writing out all four bytes of `low`,
    /// then hand the writer back. Nothing can be encoded afterwards.
    pub fn flush(mut self) -> io::Result<W> {
        for _ in 0..4 {
            self.writer.write_all(&[(self.low >> 24) as u8])?;
            self.low <<= 8;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

pub struct RangeDecoder<R: Read> {
    low: u32,
    high: u32,
    code: u32,
    reader: R,
}

impl<R: Read> RangeDecoder<R> {
    /// Seeds `code` with the first four bytes of the stream.
    pub fn new(reader: R) -> io::Result<Self> {
        let mut decoder = Self {
            low: 0,
            high: u32::MAX,
            code: 0,
            reader,
        };
        for _ in 0..4 {
            decoder.code = (decoder.code << 8) | u32::from(decoder.read_byte()?);
        }
        Ok(decoder)
    }

    pub fn decode_bit(&mut self, p: u32) -> io::Result<bool> {
        let mid = self.low + ((u64::from(self.high - self.low) * u64::from(p)) >> 18) as u32;
        let bit = self.code <= mid;
        if bit {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }
        while (self.low ^ self.high) < (1 << 24) {
            self.code = (self.code << 8) | u32::from(self.read_byte()?);
            self.low <<= 8;
            self.high = (self.high << 8) | 255;
        }
        Ok(bit)
    }

    // A truncated stream pads with zero bytes rather than failing. The coder
    // consumes a bounded number of bytes per bit, so decoding stays
    // deterministic and terminates; implausible header values downstream are
    // what actually reject a damaged file.
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0_u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(0),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn round_trip(bits: &[(u32, bool)]) {
        let mut encoder = RangeEncoder::new(Vec::new());
        for &(p, bit) in bits {
            encoder.encode_bit(p, bit).unwrap();
        }
        let coded = encoder.flush().unwrap();

        let mut decoder = RangeDecoder::new(Cursor::new(coded)).unwrap();
        for &(p, bit) in bits {
            assert_eq!(decoder.decode_bit(p).unwrap(), bit);
        }
    }

    #[test]
    fn round_trips_a_mixed_sequence() {
        let bits = [
            (1 << 17, true),
            (1 << 17, false),
            (200_000, true),
            (50, false),
            (50, true),
            (260_000, false),
            (1, true),
            (1 << 17, true),
        ];
        round_trip(&bits);
    }

    #[test]
    fn round_trips_at_probability_extremes() {
        let mut bits = Vec::new();
        for i in 0..64 {
            bits.push((0, i % 3 == 0));
            bits.push(((1 << 18) - 1, i % 5 != 0));
        }
        round_trip(&bits);
    }

    #[test]
    fn round_trips_a_long_biased_sequence() {
        // A skewed probability with matching bits compresses; the coder must
        // still reproduce the occasional surprise bit exactly.
        let mut bits = Vec::new();
        for i in 0..10_000 {
            bits.push((240_000, i % 97 != 0));
        }
        round_trip(&bits);
    }

    #[test]
    fn flush_emits_four_tail_bytes() {
        let encoder = RangeEncoder::new(Vec::new());
        let coded = encoder.flush().unwrap();
        assert_eq!(coded.len(), 4);
    }

    #[test]
    fn empty_input_decodes_as_zero_padding() {
        let mut decoder = RangeDecoder::new(Cursor::new(Vec::new())).unwrap();
        // No stream at all: the decoder sees zeros and must not error.
        decoder.decode_bit(1 << 17).unwrap();
    }
}
