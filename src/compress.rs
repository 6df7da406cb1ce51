#![forbid(unsafe_code)]

//! Streaming adapter over the Zstandard codec.
//!
//! One frame per archive entry, produced and consumed through
//! caller-owned buffers sized from the codec's recommended stream I/O
//! sizes. Errors raised by the codec itself surface as
//! [`AcfError::Compressor`]; errors from the destination writer stay
//! [`AcfError::Io`].

use std::io::Write;

use zstd::stream::raw::{Decoder, Encoder, InBuffer, Operation, OutBuffer};
use zstd::zstd_safe::{CCtx, DCtx};

use crate::error::{AcfError, AcfResult};

/// Compression level every ACF producer and consumer agrees on.
pub const LEVEL: i32 = 9;

fn engine_err(e: std::io::Error) -> AcfError {
    AcfError::Compressor(e.to_string())
}

pub struct Compressor {
    enc: Encoder<'static>,
}

impl Compressor {
    pub fn new() -> AcfResult<Self> {
        Ok(Self {
            enc: Encoder::new(LEVEL).map_err(engine_err)?,
        })
    }

    /// Recommended size for the caller's input blocks.
    pub fn input_hint() -> usize {
        CCtx::in_size()
    }

    /// Recommended size for the caller's output scratch buffer.
    pub fn output_hint() -> usize {
        CCtx::out_size()
    }

    /// Compress one block, writing frame bytes to `out` via `scratch`.
    /// Returns how many compressed bytes were written.
    pub fn write_block(
        &mut self,
        block: &[u8],
        out: &mut dyn Write,
        scratch: &mut [u8],
    ) -> AcfResult<u64> {
        let mut written = 0u64;
        let mut input = InBuffer::around(block);
        while input.pos < block.len() {
            let produced = {
                let mut output = OutBuffer::around(&mut *scratch);
                self.enc.run(&mut input, &mut output).map_err(engine_err)?;
                output.pos()
            };
            out.write_all(&scratch[..produced])?;
            written += produced as u64;
        }
        Ok(written)
    }

    /// Terminate the frame, flushing whatever the encoder still holds.
    /// Returns how many compressed bytes were written.
    pub fn finish(&mut self, out: &mut dyn Write, scratch: &mut [u8]) -> AcfResult<u64> {
        let mut written = 0u64;
        loop {
            let (hint, produced) = {
                let mut output = OutBuffer::around(&mut *scratch);
                let hint = self.enc.finish(&mut output, true).map_err(engine_err)?;
                (hint, output.pos())
            };
            out.write_all(&scratch[..produced])?;
            written += produced as u64;
            if hint == 0 {
                return Ok(written);
            }
        }
    }
}

pub struct Decompressor {
    dec: Decoder<'static>,
}

impl Decompressor {
    pub fn new() -> AcfResult<Self> {
        Ok(Self {
            dec: Decoder::new().map_err(engine_err)?,
        })
    }

    /// Recommended size for the caller's input blocks.
    pub fn input_hint() -> usize {
        DCtx::in_size()
    }

    /// Recommended size for the caller's output scratch buffer.
    pub fn output_hint() -> usize {
        DCtx::out_size()
    }

    /// Decompress one block of frame bytes, appending plain bytes to `sink`.
    pub fn read_block(
        &mut self,
        block: &[u8],
        sink: &mut Vec<u8>,
        scratch: &mut [u8],
    ) -> AcfResult<()> {
        let mut input = InBuffer::around(block);
        while input.pos < block.len() {
            let produced = {
                let mut output = OutBuffer::around(&mut *scratch);
                self.dec.run(&mut input, &mut output).map_err(engine_err)?;
                output.pos()
            };
            sink.extend_from_slice(&scratch[..produced]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(data: &[u8]) -> Vec<u8> {
        let mut compressed = Vec::new();
        let mut scratch = vec![0u8; Compressor::output_hint()];
        let mut comp = Compressor::new().unwrap();
        comp.write_block(data, &mut compressed, &mut scratch)
            .unwrap();
        comp.finish(&mut compressed, &mut scratch).unwrap();

        let mut out = Vec::new();
        let mut scratch = vec![0u8; Decompressor::output_hint()];
        let mut dec = Decompressor::new().unwrap();
        dec.read_block(&compressed, &mut out, &mut scratch).unwrap();
        out
    }

    #[test]
    fn frame_round_trip() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(round_trip(&data), data);
    }

    #[test]
    fn empty_frame_round_trip() {
        assert_eq!(round_trip(&[]), Vec::<u8>::new());
    }

    #[test]
    fn blockwise_feed_matches_whole() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i * 7 % 256) as u8).collect();

        let mut compressed = Vec::new();
        let mut scratch = vec![0u8; Compressor::output_hint()];
        let mut comp = Compressor::new().unwrap();
        for chunk in data.chunks(777) {
            comp.write_block(chunk, &mut compressed, &mut scratch)
                .unwrap();
        }
        comp.finish(&mut compressed, &mut scratch).unwrap();

        let mut out = Vec::new();
        let mut scratch = vec![0u8; Decompressor::output_hint()];
        let mut dec = Decompressor::new().unwrap();
        for chunk in compressed.chunks(123) {
            dec.read_block(chunk, &mut out, &mut scratch).unwrap();
        }
        assert_eq!(out, data);
    }

    #[test]
    fn garbage_input_is_a_compressor_error() {
        let mut out = Vec::new();
        let mut scratch = vec![0u8; Decompressor::output_hint()];
        let mut dec = Decompressor::new().unwrap();
        let err = dec
            .read_block(&[0xAA; 64], &mut out, &mut scratch)
            .unwrap_err();
        assert!(matches!(err, AcfError::Compressor(_)));
    }
}
