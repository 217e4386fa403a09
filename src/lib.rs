//! A BWT-based file compressor.
//!
//! Each input block is permuted by the Burrows-Wheeler Transform, then coded
//! byte by byte through a context-mixing model driving a binary range coder.
//! The statistical state spans the whole stream, so blocks after the first
//! compress better than they would alone.
//!
//! Basic usage to compress a file:
//!
//! ```text
//! $> bcm test.txt
//! ```
//!
//! This writes test.txt.bcm. Decompress with:
//!
//! ```text
//! $> bcm -d test.txt.bcm
//! ```

#![warn(rust_2018_idioms)]

pub mod bwt_algorithms;
pub mod cm_coding;
pub mod compression;
pub mod tools;
