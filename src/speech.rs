//! Speech capture sessions.
//!
//! A capture runs in single-utterance mode: it is started, yields at most one
//! final transcript, and stops. The recognizer backend sits behind
//! [`SpeechCapture`]; the CLI uses [`ReaderCapture`] over stdin, where each
//! line typed or piped in stands for one finalized utterance.

use std::io::BufRead;

use log::{debug, warn};
use thiserror::Error;

use crate::logging::sanitize_message;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("speech recognition is not available")]
    Unsupported,
    #[error("no speech was captured")]
    NoSpeech,
    #[error("capture session is not listening")]
    NotListening,
    #[error("cannot read speech input: {0}")]
    Io(#[from] std::io::Error),
}

/// A recognizer that produces one final transcript per session.
pub trait SpeechCapture {
    fn is_supported(&self) -> bool;

    /// Begin listening. No-op while already listening.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop listening. No-op while idle.
    fn stop(&mut self);

    fn is_listening(&self) -> bool;

    /// Block until the session's final transcript is available. Ends the
    /// session.
    fn final_transcript(&mut self) -> Result<String, CaptureError>;
}

/// Run one full capture session and return its transcript.
pub fn capture_once<C: SpeechCapture + ?Sized>(capture: &mut C) -> Result<String, CaptureError> {
    if !capture.is_supported() {
        warn!("event=capture_unsupported module=speech");
        return Err(CaptureError::Unsupported);
    }
    capture.start()?;
    let result = capture.final_transcript();
    capture.stop();
    match &result {
        Ok(transcript) => debug!(
            "event=capture_done module=speech transcript=\"{}\"",
            sanitize_message(transcript)
        ),
        Err(err) => warn!("event=capture_failed module=speech error={err}"),
    }
    result
}

/// Treats the first non-blank line of a reader as the final transcript.
#[derive(Debug)]
pub struct ReaderCapture<R> {
    reader: R,
    listening: bool,
}

impl<R: BufRead> ReaderCapture<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            listening: false,
        }
    }
}

impl<R: BufRead> SpeechCapture for ReaderCapture<R> {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.listening = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.listening = false;
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn final_transcript(&mut self) -> Result<String, CaptureError> {
        if !self.listening {
            return Err(CaptureError::NotListening);
        }
        let mut line = String::new();
        let outcome = loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => break Err(CaptureError::NoSpeech),
                Ok(_) if line.trim().is_empty() => continue,
                Ok(_) => break Ok(line.trim().to_string()),
                Err(err) => break Err(CaptureError::Io(err)),
            }
        };
        self.listening = false;
        outcome
    }
}
