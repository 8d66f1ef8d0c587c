//! Chunked line reader for configuration sources.
//!
//! The source is read into one growable buffer, a chunk at a time. Complete
//! lines are lexed in place; the unfinished tail is moved to the front of the
//! buffer before the next fill. A line longer than the buffer grows it, so
//! line length is bounded only by memory.

use std::io::{self, ErrorKind, Read};
use std::ops::ControlFlow;

use thiserror::Error;
use tracing::trace;

use crate::growth;
use crate::lexer::{Lexed, LineLexer};

pub(crate) const DEFAULT_CHUNK_SIZE: usize = 1024;

/// What the reader found on a line.
#[derive(Debug)]
pub(crate) enum Event<'a> {
    Entry {
        key: &'a [u8],
        value: &'a [u8],
        line: usize,
    },
    Invalid {
        line: usize,
    },
}

#[derive(Debug, Error)]
pub(crate) enum ReadFailure {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("the read buffer cannot grow")]
    Memory,
    /// The source ended inside a continued array.
    #[error("unexpected end of input")]
    Truncated,
    /// The event handler asked to stop.
    #[error("aborted")]
    Aborted,
}

/// Read `src` to the end, reporting every entry and invalid line in order.
///
/// Line numbers are 1-based physical line numbers; an entry spanning
/// several lines is reported with the number of its last line.
pub(crate) fn read_lines<R, F>(mut src: R, chunk: usize, mut on_event: F) -> Result<(), ReadFailure>
where
    R: Read,
    F: FnMut(Event<'_>) -> ControlFlow<()>,
{
    let chunk = chunk.max(1);
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(chunk)
        .map_err(|_| ReadFailure::Memory)?;
    buf.resize(chunk, 0);

    let mut lexer = LineLexer::new();
    // Valid bytes in `buf`.
    let mut filled = 0;
    // Bytes before this offset hold no unhandled newline.
    let mut scan_from = 0;
    let mut line_start = 0;
    let mut phys_start = 0;
    let mut line_no = 0;

    loop {
        let want = buf.len() - filled;
        let n = fill(&mut src, &mut buf[filled..])?;
        filled += n;
        let eof = n < want;
        if eof && filled > phys_start && buf[filled - 1] != b'\n' {
            buf[filled] = b'\n';
            filled += 1;
        }

        while let Some(off) = buf[scan_from..filled].iter().position(|b| *b == b'\n') {
            let endl = scan_from + off;
            line_no += 1;
            match lexer.scan(&mut buf[line_start..endl], phys_start - line_start) {
                Lexed::Done { key, value } => {
                    let line = &buf[line_start..endl];
                    let event = Event::Entry {
                        key: &line[key],
                        value: &line[value],
                        line: line_no,
                    };
                    if on_event(event).is_break() {
                        return Err(ReadFailure::Aborted);
                    }
                    line_start = endl + 1;
                }
                Lexed::Continue => buf[endl] = b' ',
                Lexed::Error => {
                    if on_event(Event::Invalid { line: line_no }).is_break() {
                        return Err(ReadFailure::Aborted);
                    }
                    line_start = endl + 1;
                }
                Lexed::Pass => line_start = endl + 1,
            }
            phys_start = endl + 1;
            scan_from = endl + 1;
        }
        scan_from = filled;

        if eof {
            break;
        }

        if line_start > 0 {
            buf.copy_within(line_start..filled, 0);
            filled -= line_start;
            scan_from -= line_start;
            phys_start -= line_start;
            line_start = 0;
        }
        if filled == buf.len() {
            grow(&mut buf)?;
        }
    }

    if lexer.is_continuing() {
        return Err(ReadFailure::Truncated);
    }
    Ok(())
}

/// Read until `dst` is full or the source is exhausted.
fn fill<R: Read>(src: &mut R, dst: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < dst.len() {
        match src.read(&mut dst[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

fn grow(buf: &mut Vec<u8>) -> Result<(), ReadFailure> {
    let len = buf.len();
    let target = growth::next_capacity(len).ok_or(ReadFailure::Memory)?;
    buf.try_reserve_exact(target - len)
        .map_err(|_| ReadFailure::Memory)?;
    buf.resize(target, 0);
    trace!(from = len, to = target, "grew read buffer");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Entry(String, String, usize),
        Invalid(usize),
    }

    fn collect(input: &[u8], chunk: usize) -> Result<Vec<Seen>, ReadFailure> {
        let mut seen = Vec::new();
        read_lines(input, chunk, |event| {
            seen.push(match event {
                Event::Entry { key, value, line } => Seen::Entry(
                    String::from_utf8_lossy(key).into_owned(),
                    String::from_utf8_lossy(value).into_owned(),
                    line,
                ),
                Event::Invalid { line } => Seen::Invalid(line),
            });
            ControlFlow::Continue(())
        })?;
        Ok(seen)
    }

    fn entry(k: &str, v: &str, line: usize) -> Seen {
        Seen::Entry(k.into(), v.into(), line)
    }

    const SAMPLE: &[u8] = b"# header\n\
        port = 8080\n\
        \n\
        name = \"a # b\" # tail\n\
        bad line\n\
        list = [1, 2, \\\n  3, 4] # done\n\
        last = x";

    fn expected_sample() -> Vec<Seen> {
        vec![
            entry("port", "8080", 2),
            entry("name", "\"a # b\" ", 4),
            Seen::Invalid(5),
            entry("list", "[1, 2,     3, 4] ", 7),
            entry("last", "x", 8),
        ]
    }

    #[test]
    fn reads_entries_in_order() {
        assert_eq!(collect(SAMPLE, DEFAULT_CHUNK_SIZE).unwrap(), expected_sample());
    }

    #[test]
    fn chunk_size_does_not_change_the_result() {
        for chunk in 1..=SAMPLE.len() + 1 {
            assert_eq!(
                collect(SAMPLE, chunk).unwrap(),
                expected_sample(),
                "chunk size {chunk}"
            );
        }
    }

    #[test]
    fn final_line_filling_the_chunk_exactly() {
        let input = b"ab = 1\ncd = 2";
        // 13 bytes: the first read fills the buffer with no trailing newline.
        for chunk in [6, 7, 13] {
            assert_eq!(
                collect(input, chunk).unwrap(),
                vec![entry("ab", "1", 1), entry("cd", "2", 2)],
                "chunk size {chunk}"
            );
        }
    }

    #[test]
    fn long_line_grows_the_buffer() {
        let value = "v".repeat(10_000);
        let input = format!("k = {value}\n");
        assert_eq!(
            collect(input.as_bytes(), 16).unwrap(),
            vec![entry("k", &value, 1)]
        );
    }

    #[test]
    fn open_continuation_at_end_is_truncated() {
        let err = collect(b"a = [1, \\\n", 8).unwrap_err();
        assert!(matches!(err, ReadFailure::Truncated));
        let err = collect(b"a = [1, \\", 1024).unwrap_err();
        assert!(matches!(err, ReadFailure::Truncated));
    }

    #[test]
    fn blank_line_inside_array_abandons_it() {
        assert_eq!(
            collect(b"a = [1, \\\n\nb = 2\n", 4).unwrap(),
            vec![entry("b", "2", 3)]
        );
    }

    #[test]
    fn empty_source() {
        assert_eq!(collect(b"", 4).unwrap(), vec![]);
    }

    #[test]
    fn abort_stops_the_pass() {
        let mut count = 0;
        let err = read_lines(&b"a = 1\nb = 2\n"[..], 4, |_| {
            count += 1;
            ControlFlow::Break(())
        })
        .unwrap_err();
        assert!(matches!(err, ReadFailure::Aborted));
        assert_eq!(count, 1);
    }

    struct Flaky {
        data: &'static [u8],
        interrupted: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let n = out.len().min(self.data.len()).min(3);
            out[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let src = Flaky {
            data: b"x = 1\ny = 2\n",
            interrupted: false,
        };
        let mut seen = 0;
        read_lines(src, 5, |_| {
            seen += 1;
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(seen, 2);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_error_is_io_failure() {
        let err = read_lines(Broken, 8, |_| ControlFlow::Continue(())).unwrap_err();
        assert!(matches!(err, ReadFailure::Io(_)));
    }
}
