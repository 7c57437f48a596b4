use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sheetjitter_core::{Cell, Table};

use crate::errors::StoreError;
use crate::store::TableStore;

/// Delimited text file holding a header row and data rows.
///
/// Header fields are always read as text. Data fields that parse to a finite
/// number become [`Cell::Number`]; everything else is kept verbatim. Rows of
/// uneven length are read as-is so shape checks can report them.
///
/// Cells that come back unchanged are written with the exact spelling they
/// were read with, so `03` or `1.50` outside the randomized range survive.
#[derive(Debug, Clone)]
pub struct CsvStore {
    input: PathBuf,
    output: PathBuf,
    delimiter: u8,
    raw: Vec<Vec<String>>,
}

impl CsvStore {
    /// Read from and write back to the same file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let input = path.into();
        Self {
            output: input.clone(),
            input,
            delimiter: b',',
            raw: Vec::new(),
        }
    }

    /// Write to `output` instead of overwriting the input file.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn csv_error(&self, path: &Path, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl TableStore for CsvStore {
    fn describe(&self) -> String {
        if self.input == self.output {
            self.input.display().to_string()
        } else {
            format!("{} -> {}", self.input.display(), self.output.display())
        }
    }

    fn read_all(&mut self) -> Result<Table, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_path(&self.input)
            .map_err(|err| self.csv_error(&self.input, err))?;

        let mut raw = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| self.csv_error(&self.input, err))?;
            raw.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let rows = raw
            .iter()
            .enumerate()
            .map(|(index, fields)| {
                fields
                    .iter()
                    .map(|field| parse_field(index, field))
                    .collect()
            })
            .collect();
        self.raw = raw;

        Ok(Table::new(rows))
    }

    fn write_all(&mut self, table: &Table) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        for (index, row) in table.rows().iter().enumerate() {
            let fields = row
                .iter()
                .enumerate()
                .map(|(col, cell)| self.render(index, col, cell));
            writer
                .write_record(fields)
                .map_err(|err| self.csv_error(&self.output, err))?;
        }

        let data = writer
            .into_inner()
            .map_err(|err| StoreError::Io {
                path: self.output.clone(),
                source: err.into_error(),
            })?;

        write_bytes_atomic(&self.output, &data).map_err(|source| StoreError::Io {
            path: self.output.clone(),
            source,
        })
    }
}

impl CsvStore {
    /// Original spelling when the cell still holds what was read there.
    fn render(&self, row: usize, col: usize, cell: &Cell) -> String {
        match self.raw.get(row).and_then(|fields| fields.get(col)) {
            Some(raw) if parse_field(row, raw) == *cell => raw.clone(),
            _ => cell.to_field(),
        }
    }
}

fn parse_field(row: usize, field: &str) -> Cell {
    if row > 0 {
        Cell::from_field(field)
    } else if field.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(field.to_string())
    }
}

/// Write through a sibling temp file and rename it over `path`.
fn write_bytes_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = parent {
        sync_dir(parent)?;
    }

    Ok(())
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid path for atomic write")
    })?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(label: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("sheetjitter_csv_{label}_{}.csv", uuid::Uuid::new_v4()));
        path
    }

    #[test]
    fn reads_header_as_text_and_data_as_numbers() {
        let path = temp_file("read");
        std::fs::write(&path, "ID,2024,Sent\n1,x,1000\n").expect("write fixture");

        let table = CsvStore::new(&path).read_all().expect("read csv");
        assert_eq!(table.column_names(), vec!["ID", "2024", "Sent"]);
        assert_eq!(table.get(0, 1), Some(&Cell::Text("2024".to_string())));
        assert_eq!(
            table.data_rows()[0],
            vec![Cell::Number(1.0), Cell::Text("x".to_string()), Cell::Number(1000.0)]
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn keeps_ragged_rows_for_validation() {
        let path = temp_file("ragged");
        std::fs::write(&path, "a,b,c\n1,2\n").expect("write fixture");

        let table = CsvStore::new(&path).read_all().expect("read csv");
        assert_eq!(table.data_rows()[0].len(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn writes_to_separate_output() {
        let input = temp_file("in");
        let output = temp_file("out");
        std::fs::write(&input, "Name;Sent\nspring;10\n").expect("write fixture");

        let mut store = CsvStore::new(&input)
            .with_output(&output)
            .with_delimiter(b';');
        let table = store.read_all().expect("read csv");
        store.write_all(&table).expect("write csv");

        assert_eq!(
            std::fs::read_to_string(&output).expect("read output"),
            "Name;Sent\nspring;10\n"
        );
        assert_eq!(
            std::fs::read_to_string(&input).expect("read input"),
            "Name;Sent\nspring;10\n"
        );

        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
    }

    #[test]
    fn unchanged_numbers_keep_their_spelling() {
        let path = temp_file("spelling");
        std::fs::write(&path, "Month,Rate\n03,1.50\n").expect("write fixture");

        let mut store = CsvStore::new(&path);
        let table = store.read_all().expect("read csv");
        let mut rows = table.into_rows();
        rows[1][1] = Cell::Number(2.0);
        store.write_all(&Table::new(rows)).expect("write csv");

        assert_eq!(
            std::fs::read_to_string(&path).expect("read output"),
            "Month,Rate\n03,2\n"
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_a_store_error() {
        let mut store = CsvStore::new(temp_file("missing"));
        let err = store.read_all().expect_err("missing file");
        assert!(matches!(err, StoreError::Csv { .. }));
    }
}
