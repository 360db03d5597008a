use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Sheet {
    /// Save the sheet to a CSV file
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_as_csv_with_options(path, &CsvOptions::default())
    }

    /// Save the sheet to a CSV file with custom options
    pub fn save_as_csv_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        options: &CsvOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_csv(writer, options)
    }

    /// Write the sheet to a writer as CSV
    pub fn write_csv<W: Write>(&self, writer: W, options: &CsvOptions) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .flexible(true)
            .from_writer(writer);

        for row in self.data() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the sheet to a CSV string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer, &CsvOptions::default())?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_to_csv_string_quotes_fields() {
        let sheet = Sheet::from_data(vec![
            vec!["Profissional", "Status"],
            vec!["SILVA, ANA", "FALTOSO"],
        ]);

        let csv = sheet.to_csv_string().unwrap();
        assert_eq!(csv, "Profissional,Status\n\"SILVA, ANA\",FALTOSO\n");
    }

    #[test]
    fn test_save_as_csv_with_semicolon() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let sheet = Sheet::from_data(vec![vec![1, 2], vec![3, 4]]);
        let options = CsvOptions {
            delimiter: b';',
            ..CsvOptions::default()
        };
        sheet.save_as_csv_with_options(&path, &options).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1;2\n3;4\n");
    }
}
