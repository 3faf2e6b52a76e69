//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// A default archiver has no file behind it and silently discards records,
/// which lets modules run without a session.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a csv.
///
/// To implement this trait, the struct shall have one `Archiver` member per
/// archive file. The archivers shall be setup in the struct's `init` or `new`
/// functions. Records must be flat structs, csv cannot nest.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session_path = session.arch_root.join(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::from_file_path(session_path)
    }

    /// Create a new archiver writing to the given file, truncating it.
    pub fn from_file_path<P: AsRef<Path>>(
        path: P
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Returns true if this archiver has a file to write to.
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(
        &mut self, record: T
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref mut w) = self.writer {
            w.serialize(record)?;
            w.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        x_dot_ms: f64
    }

    #[test]
    fn test_disabled_archiver() {
        let mut a = Archiver::default();
        assert!(!a.is_enabled());
        assert!(a.serialise(Row { time_s: 0.0, x_dot_ms: 1.0 }).is_ok());
    }

    #[test]
    fn test_archiver_writes_header_and_rows() {
        let path = std::env::temp_dir().join(format!(
            "util_archive_test_{}.csv",
            std::process::id()
        ));

        {
            let mut a = Archiver::from_file_path(&path).unwrap();
            a.serialise(Row { time_s: 0.0, x_dot_ms: 1.0 }).unwrap();
            a.serialise(Row { time_s: 0.1, x_dot_ms: -0.5 }).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["time_s,x_dot_ms", "0.0,1.0", "0.1,-0.5"]);
    }
}
