use std::io::{self, Read};

use anyhow::anyhow;
use indicatif::ProgressBar;
use nom::{call, named, number::complete::le_u32};

use crate::pipeline::Event;

named!(parse_word<&[u8], u32>, call!(le_u32));

/// Reads a capture as consecutive 32-bit little-endian words.
pub struct LogWordIterator<T>
where
    T: Read,
{
    input: T,
    progress: Option<ProgressBar>,
    count: u64,
    stopped: bool,
}

impl<T> LogWordIterator<T>
where
    T: Read,
{
    pub fn new(input: T) -> Self {
        Self {
            input,
            progress: None,
            count: 0,
            stopped: false,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Number of words read so far.
    pub fn words_read(&self) -> u64 {
        self.count
    }

    fn stop(&mut self) {
        self.stopped = true;
        if let Some(progress) = self.progress.take() {
            progress.finish_and_clear();
        }
    }

    /// Fills `buf` like `read_exact` but reports how many bytes were read on a
    /// short read.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut len = 0;
        while len < buf.len() {
            match self.input.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(len)
    }
}

impl<T> Iterator for LogWordIterator<T>
where
    T: Read,
{
    type Item = Event<u32>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.stopped {
            return None;
        }
        let mut buffer = [0; 4];
        let res = match self.fill(&mut buffer) {
            Ok(0) => {
                self.stop();
                return None;
            }
            Ok(4) => parse_word(&buffer)
                .map(|(_, word)| word)
                .map_err(|e| anyhow!("{:?}", e)),
            Ok(len) => {
                self.stop();
                Err(anyhow!(
                    "Trailing {} byte(s) after word {}",
                    len,
                    self.count
                ))
            }
            Err(e) => {
                self.stop();
                Err(e.into())
            }
        };
        if res.is_ok() {
            self.count += 1;
            if let Some(progress) = &self.progress {
                if self.count % 4096 == 0 {
                    progress.set_message(format!("{} words", self.count));
                }
            }
        }
        Some((0., res))
    }
}
