//! Output adapters: render an extractor's rows as text.
//!
//! Every adapter walks rows × columns through
//! [`Extractor::value_at`](crate::Extractor::value_at) and renders each cell
//! with [`Format::cell`](crate::Format::cell); absent cells come out as the
//! format's absent literal. Adapters never interpret values themselves.

use std::io::Write;

use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};
use crate::extract::{Column, Extractor};
use crate::format::Format;
use crate::shape::Shaped;

/// Renders the rows of an [`Extractor`] in some output format.
pub trait Dumper {
    /// Dump every row of `extractor`, rendered with `format`.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying writer fails.
    fn dump<T: Shaped>(&mut self, extractor: &Extractor<'_, T>, format: &Format) -> Result<()>;
}

/// Dumps values in CSV format.
pub struct CsvDumper<W: Write> {
    writer: csv::Writer<W>,
    omit_header: bool,
}

impl<W: Write> CsvDumper<W> {
    /// Create a CSV dumper with default writer settings.
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            omit_header: false,
        }
    }

    /// Create a CSV dumper over a preconfigured writer (custom delimiter,
    /// quoting, ...).
    pub fn from_writer(writer: csv::Writer<W>) -> Self {
        Self {
            writer,
            omit_header: false,
        }
    }

    /// Suppress the header line.
    #[must_use]
    pub fn omit_header(mut self, omit: bool) -> Self {
        self.omit_header = omit;
        self
    }
}

impl<W: Write> Dumper for CsvDumper<W> {
    fn dump<T: Shaped>(&mut self, extractor: &Extractor<'_, T>, format: &Format) -> Result<()> {
        if !self.omit_header {
            self.writer
                .write_record(extractor.columns().iter().map(Column::name))?;
        }
        let cols = extractor.columns().len();
        let mut row = Vec::with_capacity(cols);
        for r in 0..extractor.row_count() {
            row.clear();
            for c in 0..cols {
                row.push(format.cell(extractor.value_at(c, r).as_ref()));
            }
            self.writer.write_record(&row)?;
        }
        self.writer.flush().map_err(Error::io_no_path)?;
        Ok(())
    }
}

/// Dumps values as aligned text columns.
///
/// All cells are rendered up front and padded to the widest entry of their
/// column; widths are display widths, not byte lengths.
pub struct AlignedDumper<W: Write> {
    writer: W,
    omit_header: bool,
    gap: usize,
}

impl<W: Write> AlignedDumper<W> {
    /// Create an aligned-text dumper with a single-space column gap.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            omit_header: false,
            gap: 1,
        }
    }

    /// Suppress the header line.
    #[must_use]
    pub fn omit_header(mut self, omit: bool) -> Self {
        self.omit_header = omit;
        self
    }

    /// Set the number of spaces between columns.
    #[must_use]
    pub fn gap(mut self, gap: usize) -> Self {
        self.gap = gap.max(1);
        self
    }
}

impl<W: Write> Dumper for AlignedDumper<W> {
    fn dump<T: Shaped>(&mut self, extractor: &Extractor<'_, T>, format: &Format) -> Result<()> {
        let cols = extractor.columns().len();
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(extractor.row_count() + 1);
        if !self.omit_header {
            grid.push(
                extractor
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect(),
            );
        }
        for r in 0..extractor.row_count() {
            grid.push(
                (0..cols)
                    .map(|c| format.cell(extractor.value_at(c, r).as_ref()))
                    .collect(),
            );
        }

        let mut widths = vec![0_usize; cols];
        for row in &grid {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        for row in &grid {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if i + 1 < cols {
                    let pad = widths[i] - cell.width() + self.gap;
                    line.push_str(&" ".repeat(pad));
                }
            }
            writeln!(self.writer, "{}", line.trim_end()).map_err(Error::io_no_path)?;
        }
        self.writer.flush().map_err(Error::io_no_path)?;
        Ok(())
    }
}

/// Dumps values as R vectors.
///
/// Each column becomes a `name <- c(...)` assignment, wrapped after every
/// tenth value; with [`RVecDumper::data_frame`] set, a combining
/// `data.frame` assignment follows.
pub struct RVecDumper<W: Write> {
    writer: W,
    data_frame: Option<String>,
}

impl<W: Write> RVecDumper<W> {
    /// Create an R-vector dumper.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            data_frame: None,
        }
    }

    /// Also emit a data frame of the given name combining all columns.
    #[must_use]
    pub fn data_frame(mut self, name: impl Into<String>) -> Self {
        self.data_frame = Some(name.into());
        self
    }
}

impl<W: Write> Dumper for RVecDumper<W> {
    fn dump<T: Shaped>(&mut self, extractor: &Extractor<'_, T>, format: &Format) -> Result<()> {
        let rows = extractor.row_count();
        let mut all = String::new();
        for (c, column) in extractor.columns().iter().enumerate() {
            write!(self.writer, "{} <- c(", column.name()).map_err(Error::io_no_path)?;
            for r in 0..rows {
                let mut cell = format.cell(extractor.value_at(c, r).as_ref());
                if r + 1 < rows {
                    cell.push_str(if r % 10 == 9 { ",\n" } else { ", " });
                }
                write!(self.writer, "{cell}").map_err(Error::io_no_path)?;
            }
            writeln!(self.writer, ")").map_err(Error::io_no_path)?;

            if c > 0 {
                all.push_str(", ");
            }
            all.push_str(column.name());
        }

        if let Some(name) = &self.data_frame {
            writeln!(self.writer, "{name} <- data.frame({all})").map_err(Error::io_no_path)?;
        }
        self.writer.flush().map_err(Error::io_no_path)?;
        Ok(())
    }
}
