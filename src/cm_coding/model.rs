use std::io::{self, Read, Write};

use super::counter::Counter;
use super::range_coder::{RangeDecoder, RangeEncoder};

/// Context-mixing byte model. Each byte is coded as eight bits, most
/// significant first, through a partial-byte context `ctx` that starts at 1
/// and accumulates the coded bits.
///
/// Three counter groups feed each bit decision:
/// - `counter0`: a per-position baseline indexed by `ctx` alone,
/// - `counter1`: order-1 contexts indexed by a previous byte and `ctx`; the
///   row for `c1` is both read and trained, the row for `c2` is read only,
/// - `counter2`: an SSE correction layer keyed by a run flag and `ctx`,
///   interpolated between two probability bins of the mixed estimate.
///
/// The mix weighs the groups 4:3:1 and the SSE output is folded in at 3x,
/// which lands the final probability in the coder's 18-bit range. Counter
/// state deliberately survives across blocks; a session uses one model for
/// its whole lifetime.
pub struct Model {
    counter0: Vec<Counter<2>>,
    counter1: Vec<[Counter<4>; 256]>,
    counter2: Vec<[[Counter<6>; 17]; 256]>,
    c1: usize,
    c2: usize,
    run: u32,
}

impl Model {
    pub fn new() -> Self {
        let mut counter2 = vec![[[Counter::new(); 17]; 256]; 2];
        for flag in counter2.iter_mut() {
            for ctx in flag.iter_mut() {
                for (k, counter) in ctx.iter_mut().enumerate() {
                    // Monotone ramp over the bins; the last two bins share a
                    // value so the interpolation never reads past the table.
                    *counter =
                        Counter::with_probability(((k - usize::from(k == 16)) << 12) as u16);
                }
            }
        }
        Self {
            counter0: vec![Counter::new(); 256],
            counter1: vec![[Counter::new(); 256]; 256],
            counter2,
            c1: 0,
            c2: 0,
            run: 0,
        }
    }

    pub fn encode<W: Write>(&mut self, coder: &mut RangeEncoder<W>, byte: u8) -> io::Result<()> {
        let f = self.begin_byte();
        let mut ctx = 1_usize;
        let mut pending = u32::from(byte);
        while ctx < 256 {
            let (p, j) = self.predict(f, ctx);
            let bit = pending & 128 != 0;
            pending <<= 1;
            coder.encode_bit(p, bit)?;
            self.train(f, ctx, j, bit);
            ctx = (ctx << 1) + usize::from(bit);
        }
        self.end_byte(ctx);
        Ok(())
    }

    pub fn decode<R: Read>(&mut self, coder: &mut RangeDecoder<R>) -> io::Result<u8> {
        let f = self.begin_byte();
        let mut ctx = 1_usize;
        while ctx < 256 {
            let (p, j) = self.predict(f, ctx);
            let bit = coder.decode_bit(p)?;
            self.train(f, ctx, j, bit);
            ctx = (ctx << 1) + usize::from(bit);
        }
        Ok(self.end_byte(ctx))
    }

    // The run flag for a byte is fixed before any of its bits are coded,
    // from the previous bytes only. Ordering matters for bit-exactness.
    fn begin_byte(&mut self) -> usize {
        if self.c1 == self.c2 {
            self.run += 1;
        } else {
            self.run = 0;
        }
        usize::from(self.run > 2)
    }

    fn end_byte(&mut self, ctx: usize) -> u8 {
        self.c2 = self.c1;
        self.c1 = ctx & 255;
        self.c1 as u8
    }

    fn predict(&self, f: usize, ctx: usize) -> (u32, usize) {
        let p0 = i32::from(self.counter0[ctx].p());
        let p1 = i32::from(self.counter1[self.c1][ctx].p());
        let p2 = i32::from(self.counter1[self.c2][ctx].p());
        let p = (4 * p0 + 3 * p1 + p2) >> 3;

        // SSE: linear interpolation between the two bins around p. The bins
        // can drift out of order as they train, so this runs signed.
        let j = (p >> 12) as usize;
        let x1 = i32::from(self.counter2[f][ctx][j].p());
        let x2 = i32::from(self.counter2[f][ctx][j + 1].p());
        let ssep = x1 + (((x2 - x1) * (p & 4095)) >> 12);

        ((p + 3 * ssep) as u32, j)
    }

    fn train(&mut self, f: usize, ctx: usize, j: usize, bit: bool) {
        self.counter0[ctx].update(bit);
        self.counter1[self.c1][ctx].update(bit);
        self.counter2[f][ctx][j].update(bit);
        self.counter2[f][ctx][j + 1].update(bit);
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn round_trip(data: &[u8]) {
        let mut model = Model::new();
        let mut encoder = RangeEncoder::new(Vec::new());
        for &byte in data {
            model.encode(&mut encoder, byte).unwrap();
        }
        let coded = encoder.flush().unwrap();

        let mut model = Model::new();
        let mut decoder = RangeDecoder::new(Cursor::new(coded)).unwrap();
        for &byte in data {
            assert_eq!(model.decode(&mut decoder).unwrap(), byte);
        }
    }

    #[test]
    fn round_trips_text() {
        round_trip(b"If Peter Piper picked a peck of pickled peppers...");
    }

    #[test]
    fn round_trips_all_byte_values() {
        let data = (0..=255).collect::<Vec<u8>>();
        round_trip(&data);
    }

    #[test]
    fn round_trips_runs_that_flip_the_run_flag() {
        let mut data = vec![0x41_u8; 300];
        data.extend_from_slice(b"interruption");
        data.extend(vec![0x42_u8; 300]);
        round_trip(&data);
    }

    #[test]
    fn round_trips_pseudo_random_bytes() {
        let mut state = 0x2545F491_u32;
        let data = (0..4096)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 24) as u8
            })
            .collect::<Vec<u8>>();
        round_trip(&data);
    }

    #[test]
    fn repetitive_data_codes_smaller_than_random() {
        let runs = vec![0x61_u8; 4096];
        let mut state = 0xDEADBEEF_u32;
        let noise = (0..4096)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 24) as u8
            })
            .collect::<Vec<u8>>();

        let coded_len = |data: &[u8]| {
            let mut model = Model::new();
            let mut encoder = RangeEncoder::new(Vec::new());
            for &byte in data {
                model.encode(&mut encoder, byte).unwrap();
            }
            encoder.flush().unwrap().len()
        };
        assert!(coded_len(&runs) < coded_len(&noise) / 4);
    }
}
