//! Writes a [`ResultCollection`] as a CSV or JSON table.

use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::ExportError;
use crate::models::{ExportConfig, ExportFormat, ExtractedRecord, ResultCollection};

/// Byte order mark so spreadsheet applications detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// `{prefix}_{YYYYmmdd_HHMMSS}.{ext}`
pub fn output_file_name(prefix: &str, generated_at: &DateTime<Local>, format: ExportFormat) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write the header row and one row per record, preceded by a UTF-8 BOM.
pub fn write_csv<W: Write>(mut writer: W, results: &ResultCollection) -> Result<(), ExportError> {
    writer.write_all(UTF8_BOM)?;

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ExtractedRecord::columns())?;
    for record in results {
        wtr.write_record(record.row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the records as a JSON array of objects in column order.
pub fn write_json<W: Write>(writer: W, results: &ResultCollection) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, results.records())?;
    Ok(())
}

/// Saves result tables into a directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    file_prefix: String,
    format: ExportFormat,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, config: &ExportConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: config.file_prefix.clone(),
            format: config.format,
        }
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `results` to a new timestamped file and return its path.
    pub fn export(&self, results: &ResultCollection) -> Result<PathBuf, ExportError> {
        self.export_at(results, &Local::now())
    }

    fn export_at(
        &self,
        results: &ResultCollection,
        generated_at: &DateTime<Local>,
    ) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let name = output_file_name(&self.file_prefix, generated_at, self.format);
        let (path, file) = create_unique(&self.output_dir.join(name))?;

        let mut writer = BufWriter::new(file);
        match self.format {
            ExportFormat::Csv => write_csv(&mut writer, results)?,
            ExportFormat::Json => write_json(&mut writer, results)?,
        }
        writer.flush()?;

        info!("Exported {} records to {}", results.len(), path.display());
        Ok(path)
    }
}

/// Create `path`, or `stem_2.ext`, `stem_3.ext`, ... when it already exists.
fn create_unique(path: &Path) -> Result<(PathBuf, File), ExportError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut candidate = path.to_path_buf();
    let mut n = 1;
    loop {
        match File::options().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                n += 1;
                candidate = path.with_file_name(format!("{}_{}.{}", stem, n, extension));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, FieldValues, FIELD_SCHEMA};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> ResultCollection {
        let mut fields = FieldValues::not_mentioned();
        fields.set(Field::CaseNumber, "（2023）沪0101民初1号");
        fields.set(Field::Plaintiffs, "张三、李四");
        fields.set(Field::Judgment, "驳回原告全部诉讼请求, 案件受理费由原告负担");

        [
            ExtractedRecord::success("a.pdf", "2024-03-01 10:00:00", fields),
            ExtractedRecord::failure("b.png", "2024-03-01 10:00:05", "OCR error: engine crashed", 50),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_output_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(
            output_file_name("裁判文书提取结果", &at, ExportFormat::Csv),
            "裁判文书提取结果_20240301_090507.csv"
        );
        assert_eq!(output_file_name("out", &at, ExportFormat::Json), "out_20240301_090507.json");
    }

    #[test]
    fn test_csv_layout() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &sample()).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut rdr = csv::Reader::from_reader(text.as_bytes());

        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        let mut expected = vec!["文件名".to_string(), "提取时间".to_string()];
        expected.extend(FIELD_SCHEMA.iter().map(|s| s.to_string()));
        assert_eq!(headers, expected);

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "a.pdf");
        assert_eq!(&rows[0][3], "（2023）沪0101民初1号");
        assert_eq!(&rows[0][11], "驳回原告全部诉讼请求, 案件受理费由原告负担");
        assert_eq!(&rows[1][2], "失败原因：OCR error: engine crashed...");
        assert_eq!(&rows[1][12], "提取失败");
    }

    #[test]
    fn test_reexport_is_identical() {
        let results = sample();
        let mut first = Vec::new();
        let mut second = Vec::new();
        write_csv(&mut first, &results).unwrap();
        write_csv(&mut second, &results).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_keys_in_column_order() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &sample()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let filename_at = text.find("\"文件名\"").unwrap();
        let timestamp_at = text.find("\"提取时间\"").unwrap();
        let title_at = text.find("\"文书名称\"").unwrap();
        let type_at = text.find("\"文书类型\"").unwrap();
        assert!(filename_at < timestamp_at && timestamp_at < title_at && title_at < type_at);

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0].as_object().unwrap().len(), 13);
    }

    #[test]
    fn test_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("results");
        let exporter = Exporter::new(&out, &ExportConfig::default());

        let path = exporter.export(&sample()).unwrap();

        assert!(path.starts_with(&out));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("裁判文书提取结果_"));
        assert!(name.ends_with(".csv"));
        assert!(std::fs::read(&path).unwrap().starts_with(UTF8_BOM));
    }

    #[test]
    fn test_exports_in_the_same_second_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), &ExportConfig::default());
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();

        let first = exporter.export_at(&sample(), &at).unwrap();
        let second = exporter.export_at(&ResultCollection::new(), &at).unwrap();
        let third = exporter.export_at(&ResultCollection::new(), &at).unwrap();

        assert_eq!(first.file_name().unwrap(), "裁判文书提取结果_20240301_090507.csv");
        assert_eq!(second.file_name().unwrap(), "裁判文书提取结果_20240301_090507_2.csv");
        assert_eq!(third.file_name().unwrap(), "裁判文书提取结果_20240301_090507_3.csv");

        let lines = std::fs::read_to_string(&first).unwrap().lines().count();
        assert_eq!(lines, 3);
    }

    #[test]
    fn test_export_empty_collection_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), &ExportConfig::default());

        let path = exporter.export(&ResultCollection::new()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_start_matches('\u{feff}').lines().count(), 1);
    }
}
