/// Multi-file conversion into one shared table.
///
/// Files are decoded and formatted independently, optionally on the rayon pool, then written in
/// input order under a single header row. A file that is missing, has the wrong extension or
/// fails to decode is skipped with a warning; it never aborts its siblings.
use std::{
    fs::OpenOptions,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    document::GdfDocument,
    format::{FormatOptions, RowFormatter},
    utm::{TransverseMercator, UtmProjector},
    Error, GdfResult,
};

pub const DEFAULT_EXTENSION: &str = "gdf";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub format: FormatOptions,
    /// Expected input extension, compared case-insensitively.
    pub extension: String,
    /// Decode files on the rayon pool.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            format: FormatOptions::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            parallel: true,
        }
    }
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Converted files and their row counts.
    pub converted: Vec<(PathBuf, usize)>,
    pub skipped: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn rows(&self) -> usize {
        self.converted.iter().map(|(_, n)| n).sum()
    }
}

/// Fails for missing files and for files without the expected extension.
pub fn check_input(path: &Path, extension: &str) -> GdfResult<()> {
    if !path.is_file() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if !matches {
        return Err(Error::UnsupportedFile(path.to_path_buf()));
    }
    Ok(())
}

pub struct Batch<P = TransverseMercator> {
    options: BatchOptions,
    formatter: RowFormatter<P>,
}

impl Batch<TransverseMercator> {
    pub fn new(options: BatchOptions) -> Self {
        let formatter = RowFormatter::new(options.format);
        Self { options, formatter }
    }
}

impl<P: UtmProjector + Sync> Batch<P> {
    pub fn with_projector(options: BatchOptions, projector: P) -> Self {
        let formatter = RowFormatter::with_projector(options.format, projector);
        Self { options, formatter }
    }

    fn render_file(&self, path: &Path) -> GdfResult<Vec<String>> {
        check_input(path, &self.options.extension)?;
        let doc = GdfDocument::from_file(path)?;
        Ok(self.formatter.document_rows(&doc))
    }

    /// Rows for every input, in input order regardless of completion order.
    pub fn render(&self, paths: &[PathBuf]) -> Vec<GdfResult<Vec<String>>> {
        if self.options.parallel {
            paths.par_iter().map(|p| self.render_file(p)).collect()
        } else {
            paths.iter().map(|p| self.render_file(p)).collect()
        }
    }

    /// Write the table for `paths` to `out`. The header row is written only when
    /// `write_header` is set.
    pub fn convert<W: Write>(
        &self,
        paths: &[PathBuf],
        out: &mut W,
        write_header: bool,
    ) -> GdfResult<BatchReport> {
        let results = self.render(paths);
        if write_header {
            writeln!(out, "{}", self.formatter.header_row())?;
        }

        let mut report = BatchReport::default();
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(rows) => {
                    for row in &rows {
                        writeln!(out, "{row}")?;
                    }
                    debug!("{}: {} rows", path.display(), rows.len());
                    report.converted.push((path.clone(), rows.len()));
                }
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    report.skipped.push((path.clone(), e));
                }
            }
        }
        out.flush()?;
        info!(
            "converted {} file(s), {} row(s); skipped {}",
            report.converted.len(),
            report.rows(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Write the table to `output`. With `append`, rows are added to an existing file and the
    /// header is only written if the file was empty.
    pub fn convert_to_file(
        &self,
        paths: &[PathBuf],
        output: &Path,
        append: bool,
    ) -> GdfResult<BatchReport> {
        let has_content = append
            && std::fs::metadata(output)
                .map(|m| m.len() > 0)
                .unwrap_or(false);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(output)?;
        let mut out = BufWriter::new(file);
        self.convert(paths, &mut out, !has_content)
    }
}
