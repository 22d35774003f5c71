//! Audio file codecs

mod wav_writer;

pub use wav_writer::{WavFileWriter, BITS_PER_SAMPLE};
