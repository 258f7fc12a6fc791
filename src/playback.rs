//! Inline playback of the uploaded sample and the synthesized result.
//!
//! Audio goes to the system's default output device through rodio. Anything
//! rodio can decode plays, so an MP3 upload can be previewed too.

use std::io::Cursor;

use rodio::{Decoder, OutputStreamBuilder, Sink};

#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("No audio output available: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Cannot decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// Decode in-memory audio into a playable source.
pub fn decode(bytes: &[u8]) -> Result<Decoder<Cursor<Vec<u8>>>, PlaybackError> {
    Ok(Decoder::new(Cursor::new(bytes.to_vec()))?)
}

/// Play `bytes` on the default output device, blocking until done.
pub fn play(bytes: &[u8]) -> Result<(), PlaybackError> {
    let source = decode(bytes)?;
    let stream = OutputStreamBuilder::open_default_stream()?;
    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.sleep_until_end();
    log::debug!("Played {} bytes of audio", bytes.len());
    Ok(())
}
