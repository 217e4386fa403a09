//! The bwt_algorithms module is the sorting subsystem of the compressor.
//!
//! The Burrows-Wheeler Transform permutes each block so that bytes with
//! similar right context end up adjacent, which is what makes the order-1
//! statistics of the coding model effective. The transform here uses the
//! suffix-array convention: the permuted block plus a 1-based primary index
//! marking the row of the original string.
//!
//! Sorting suffixes is the expensive part, and no single algorithm wins on
//! all data. A comparison sort (multi-threaded for large blocks) handles
//! typical data; an SA-IS construction takes over for small blocks and for
//! repetitive data, where comparison sorting collapses to quadratic work.
//!
//! The inverse transform lives here too. It needs no sorting, just a
//! counting pass and a chain walk.

pub mod bwt_sort;
pub mod sais_fallback;
