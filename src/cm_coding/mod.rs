//! The cm_coding module is the statistical heart of the compressor: a binary
//! range coder driven by a context-mixing bit model.
//!
//! Every value that crosses the compressed stream - block lengths, primary
//! indexes and payload bytes alike - passes through the same model, one byte
//! at a time. The model predicts each bit from three groups of adaptive
//! counters (a per-position baseline, two order-1 byte contexts, and an SSE
//! correction table), and the range coder turns those predictions into a
//! near-entropy byte stream.
//!
//! The pieces are:
//! - counter: a single adaptive probability with a fixed-shift learning rate.
//! - model: the context-mixing predictor with Encode/Decode per byte.
//! - range_coder: the 32-bit binary arithmetic coder the model drives.

pub mod counter;
pub mod model;
pub mod range_coder;
