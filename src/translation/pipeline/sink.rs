/*!
 * Output sinks for the document pipeline.
 *
 * Lines reach a sink already terminated: structural lines carry the
 * terminator they were read with, translated lines end in a single `\n`.
 */

use std::io::Write;

use crate::errors::TranslationError;

/// Destination for emitted document lines
pub trait LineSink {
    /// Write one line, terminator included
    fn emit(&mut self, line: &str) -> Result<(), TranslationError>;

    /// Called after every completed batch so buffered output reaches its destination
    fn end_batch(&mut self) -> Result<(), TranslationError> {
        Ok(())
    }
}

impl LineSink for Vec<String> {
    fn emit(&mut self, line: &str) -> Result<(), TranslationError> {
        self.push(line.to_string());
        Ok(())
    }
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn emit(&mut self, line: &str) -> Result<(), TranslationError> {
        (**self).emit(line)
    }

    fn end_batch(&mut self) -> Result<(), TranslationError> {
        (**self).end_batch()
    }
}

/// Sink over any `std::io::Write`, flushed after each batch
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    writer: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineSink for WriteSink<W> {
    fn emit(&mut self, line: &str) -> Result<(), TranslationError> {
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn end_batch(&mut self) -> Result<(), TranslationError> {
        self.writer.flush()?;
        Ok(())
    }
}
