use super::sais_fallback::suffix_array;
use log::debug;
use rayon::prelude::*;

/// Burrows-Wheeler-Transform of one block, in place. Returns the 1-based
/// primary index (the row of the original string in the sorted order), or a
/// negative value if the block cannot be transformed.
///
/// Two sort strategies sit behind this entry point. Typical data goes
/// through a plain comparison sort of the suffix indices, multi-threaded
/// with Rayon for larger blocks. Small blocks and data that looks repetitive
/// (tiny or skewed alphabet, long runs) go through SA-IS instead, because
/// comparison sorting degrades badly when suffixes share long prefixes.
/// Both strategies produce the identical suffix array, so the choice never
/// changes the output.
pub fn bwt_encode(block: &mut [u8]) -> i32 {
    let n = block.len();
    // The frame carries the length and index as 32-bit fields, and an empty
    // block has no transform.
    if n == 0 || n > i32::MAX as usize {
        return -1;
    }

    let index = if n < 3_000 || prefers_sais(&block[..5_000.min(n)]) {
        debug!("Using SA-IS algorithm.");
        suffix_array(block)
    } else {
        debug!("Using native algorithm.");
        let mut index = (0..n as u32).collect::<Vec<u32>>();
        if n > 40_000 {
            index.par_sort_unstable_by(|&a, &b| block[a as usize..].cmp(&block[b as usize..]));
        } else {
            index.sort_unstable_by(|&a, &b| block[a as usize..].cmp(&block[b as usize..]));
        }
        index
    };

    // Fold the suffix order into the transform: last byte first, then the
    // byte left of each suffix, skipping the row of the original string.
    // That row's position (1-based) is the primary index.
    let mut bwt = Vec::with_capacity(n);
    bwt.push(block[n - 1]);
    let mut key = -1_i32;
    for (i, &suffix) in index.iter().enumerate() {
        if suffix == 0 {
            key = i as i32 + 1;
        } else {
            bwt.push(block[suffix as usize - 1]);
        }
    }
    block.copy_from_slice(&bwt);
    key
}

/// Decode a Burrows-Wheeler-Transform given the block and its 1-based
/// primary index. The `next` chain is walked at most `n` steps and bails out
/// if it returns to the origin early, so a garbage block cannot hang the
/// decoder; it just comes back short.
pub fn bwt_decode(key: usize, bwt_in: &[u8]) -> Vec<u8> {
    let n = bwt_in.len();

    // Cumulative frequency: where each byte value starts in sorted order.
    let mut t = [0_u32; 257];
    for &b in bwt_in {
        t[b as usize + 1] += 1;
    }
    for i in 1..256 {
        t[i] += t[i - 1];
    }

    // The row of the original string holds an implicit sentinel; positions
    // at or past the key shift up by one to step over it.
    let mut next = vec![0_u32; n];
    for (i, &b) in bwt_in.iter().enumerate() {
        next[t[b as usize] as usize] = i as u32 + u32::from(i >= key);
        t[b as usize] += 1;
    }

    let mut out = Vec::with_capacity(n);
    let mut p = key;
    for _ in 0..n {
        p = next[p - 1] as usize;
        out.push(bwt_in[p - usize::from(p >= key)]);
        if p == 0 {
            break;
        }
    }
    out
}

/// Given a sample of the block, decide whether SA-IS will beat the
/// comparison sort. Repetitive data is the tell: few distinct symbols, one
/// dominant symbol, or long runs.
fn prefers_sais(sample: &[u8]) -> bool {
    let mut freq = [0_u32; 256];
    for &b in sample {
        freq[b as usize] += 1;
    }
    let max = *freq.iter().max().unwrap() as usize;
    let symbols = freq.iter().filter(|&&count| count != 0).count();
    if symbols < 16 || max * 4 > sample.len() {
        return true;
    }

    let mut longest = 0;
    let mut run = 1;
    for pair in sample.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest * 20 > sample.len()
}
