//! Persistent vocabulary registry.
//!
//! The registry is the pair of an in-memory open-addressed id set and an
//! append-only log file. The set answers "have we ever emitted this root
//! id"; the log records, once per id, the id plus the bytes of its
//! first-seen occurrence so offline tooling can reconstruct the
//! vocabulary. There is no header, no version, and no checksum: each
//! record is a little-endian `u32` id, a `u8` length, and exactly that
//! many raw bytes.
//!
//! # Failure model
//!
//! Opening the log is fatal to the caller. A short read while loading is a
//! clean EOF (a torn tail record from a crashed run is expected and
//! harmless). Write failures while appending are reported and swallowed:
//! the in-memory set stays authoritative for the rest of the run.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::path::Path;

use tracing::{debug, warn};

/// Slot count of the open-addressed set: a fixed power of two comfortably
/// above any vocabulary this tool will accumulate (16 MiB of ids).
const TABLE_SLOTS: usize = 4 * 1024 * 1024;

/// Longest text a log record can carry; longer spans are truncated.
const MAX_RECORD_TEXT: usize = u8::MAX as usize;

/// In-memory id set plus the append-only vocabulary log.
///
/// Slot value 0 is the empty-slot sentinel, so id 0 is reserved: it is
/// never inserted and never persisted. Collisions resolve by linear
/// probing; the table is large enough that it never approaches full in
/// practice, and inserts into a full table are dropped rather than
/// allowed to probe forever.
pub struct Registry {
    slots: Box<[u32]>,
    occupied: usize,
    preloaded: usize,
    log: Option<File>,
}

impl Registry {
    /// Open the registry backed by the log at `path`.
    ///
    /// An absent file is an empty registry. An existing file is read
    /// record by record into the set; the file is then reopened in append
    /// mode for the life of this value.
    pub fn open(path: &Path) -> io::Result<Registry> {
        let mut registry = Registry::ephemeral();
        match File::open(path) {
            Ok(file) => {
                registry.load(BufReader::new(file))?;
                registry.preloaded = registry.occupied;
                debug!(ids = registry.preloaded, "vocabulary log loaded");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        registry.log = Some(OpenOptions::new().create(true).append(true).open(path)?);
        Ok(registry)
    }

    /// An in-memory registry with no backing log. Ids are tracked for the
    /// life of the value and nothing is persisted.
    pub fn ephemeral() -> Registry {
        Registry {
            slots: vec![0; TABLE_SLOTS].into_boxed_slice(),
            occupied: 0,
            preloaded: 0,
            log: None,
        }
    }

    /// Number of ids read from the log when the registry was opened.
    pub fn preloaded(&self) -> usize {
        self.preloaded
    }

    /// Number of distinct ids currently tracked.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Check if no ids are tracked.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Check if `id` has been recorded this run or any prior run.
    pub fn contains(&self, id: u32) -> bool {
        if id == 0 {
            return false;
        }
        let mut index = id as usize % TABLE_SLOTS;
        loop {
            let slot = self.slots[index];
            if slot == 0 {
                return false;
            }
            if slot == id {
                return true;
            }
            index = (index + 1) % TABLE_SLOTS;
        }
    }

    /// Record `id` with the text of its first-seen occurrence.
    ///
    /// Already-known ids are a no-op. New ids are inserted into the set
    /// and appended to the log with `text` truncated to 255 bytes. Id 0
    /// is the empty-slot sentinel and is never recorded.
    pub fn record(&mut self, id: u32, text: &[u8]) {
        if id == 0 || !self.insert(id) {
            return;
        }
        let Some(log) = self.log.as_mut() else {
            return;
        };
        let text = &text[..text.len().min(MAX_RECORD_TEXT)];
        let len = text.len() as u8;
        let written = log
            .write_all(&id.to_le_bytes())
            .and_then(|()| log.write_all(&[len]))
            .and_then(|()| log.write_all(text));
        if let Err(e) = written {
            warn!(id, error = %e, "vocabulary log append failed; id kept in memory only");
        }
    }

    /// Insert `id` into the set. Returns `true` if it was newly inserted.
    fn insert(&mut self, id: u32) -> bool {
        if self.occupied == TABLE_SLOTS {
            warn!(id, "vocabulary table full; id dropped");
            return false;
        }
        let mut index = id as usize % TABLE_SLOTS;
        loop {
            let slot = self.slots[index];
            if slot == id {
                return false;
            }
            if slot == 0 {
                self.slots[index] = id;
                self.occupied += 1;
                return true;
            }
            index = (index + 1) % TABLE_SLOTS;
        }
    }

    /// Replay log records from `reader` into the set.
    ///
    /// Record text is skipped; only ids matter for membership. A short
    /// read (torn tail record or truncated file) terminates cleanly.
    fn load<R: Read>(&mut self, mut reader: R) -> io::Result<()> {
        let mut id_buf = [0u8; 4];
        let mut len_buf = [0u8; 1];
        let mut skip_buf = [0u8; MAX_RECORD_TEXT];
        loop {
            match read_or_eof(&mut reader, &mut id_buf)? {
                ReadOutcome::Eof => return Ok(()),
                ReadOutcome::Full => {}
            }
            match read_or_eof(&mut reader, &mut len_buf)? {
                ReadOutcome::Eof => return Ok(()),
                ReadOutcome::Full => {}
            }
            let len = usize::from(len_buf[0]);
            match read_or_eof(&mut reader, &mut skip_buf[..len])? {
                ReadOutcome::Eof => return Ok(()),
                ReadOutcome::Full => {}
            }
            let id = u32::from_le_bytes(id_buf);
            if id != 0 {
                self.insert(id);
            }
        }
    }
}

enum ReadOutcome {
    Full,
    Eof,
}

/// `read_exact`, with any unexpected EOF reported as a clean end of input.
fn read_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<ReadOutcome> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(ReadOutcome::Full),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(ReadOutcome::Eof),
        Err(e) => Err(e),
    }
}
