//! The compression module drives the block pipeline in both directions.
//!
//! Compression happens in the following steps:
//! - Read up to one block of input (the block size is the `-b` option,
//!   clamped to the input length).
//! - Burrows-Wheeler Transform: permute the block so the coding model's
//!   order-1 contexts become strongly predictive.
//! - Context-mixing coding: the block length, the primary index and every
//!   payload byte pass through one shared model into the range coder.
//!
//! A zero-length block header terminates the stream, then the coder flushes
//! its four tail bytes. Decompression is the mirror image, with the inverse
//! BWT run after each block's payload is fully decoded. The model and coder
//! live for the whole session; block boundaries do not reset any statistics,
//! and the file format depends on that.

pub mod compress;
pub mod decompress;
