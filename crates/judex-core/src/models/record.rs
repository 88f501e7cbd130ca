//! The fixed field schema and the records built from it.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of schema fields.
pub const FIELD_COUNT: usize = 11;

/// Required fields in canonical order.
pub const FIELD_SCHEMA: [&str; FIELD_COUNT] = [
    "文书名称",
    "案号",
    "审理法院",
    "判决日期",
    "原告/申请人",
    "被告/被申请人",
    "案由",
    "诉讼请求",
    "法院认为",
    "判决结果",
    "文书类型",
];

/// Provenance key holding the original file name.
pub const FILENAME_KEY: &str = "文件名";

/// Provenance key holding the extraction timestamp.
pub const TIMESTAMP_KEY: &str = "提取时间";

/// Format of the extraction timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Value for information the document does not contain.
pub const NOT_MENTIONED: &str = "未提及";

/// Value for every field of a file that failed to process.
pub const EXTRACTION_FAILED: &str = "提取失败";

/// Prefix of the failure cause written into the title field.
pub const FAILURE_CAUSE_PREFIX: &str = "失败原因：";

/// Delimiter the model is asked to use between multiple parties or causes.
pub const MULTI_VALUE_DELIMITER: &str = "、";

/// Schema position of a named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title = 0,
    CaseNumber = 1,
    Court = 2,
    JudgmentDate = 3,
    Plaintiffs = 4,
    Defendants = 5,
    CauseOfAction = 6,
    Claims = 7,
    CourtReasoning = 8,
    Judgment = 9,
    DocumentType = 10,
}

impl Field {
    /// Schema key of this field.
    pub fn key(self) -> &'static str {
        FIELD_SCHEMA[self as usize]
    }

    /// Index of this field in [`FIELD_SCHEMA`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Closed set of document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Civil,
    Criminal,
    Administrative,
    Other,
}

impl DocumentType {
    /// All categories in prompt order.
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Civil,
        DocumentType::Criminal,
        DocumentType::Administrative,
        DocumentType::Other,
    ];

    /// Label as written in the record.
    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Civil => "民事",
            DocumentType::Criminal => "刑事",
            DocumentType::Administrative => "行政",
            DocumentType::Other => "其他",
        }
    }

    /// Map free text onto the closed set. Unknown values become `Other`.
    ///
    /// An exact label wins; otherwise 刑事 outranks 行政, which outranks 民事,
    /// so 刑事附带民事 is criminal.
    pub fn classify(value: &str) -> Self {
        let value = value.trim();
        if let Some(exact) = Self::ALL.into_iter().find(|t| t.label() == value) {
            return exact;
        }
        [
            DocumentType::Criminal,
            DocumentType::Administrative,
            DocumentType::Civil,
        ]
        .into_iter()
        .find(|t| value.contains(t.label()))
        .unwrap_or(DocumentType::Other)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The 11 schema values of one document, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues([String; FIELD_COUNT]);

impl FieldValues {
    /// Every field set to the same value.
    pub fn filled(value: &str) -> Self {
        Self(std::array::from_fn(|_| value.to_string()))
    }

    /// Every field set to [`NOT_MENTIONED`].
    pub fn not_mentioned() -> Self {
        Self::filled(NOT_MENTIONED)
    }

    /// Build from values already in schema order.
    pub fn from_array(values: [String; FIELD_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, field: Field) -> &str {
        &self.0[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.0[field.index()] = value.into();
    }

    /// Look a value up by schema key.
    pub fn by_key(&self, key: &str) -> Option<&str> {
        FIELD_SCHEMA
            .iter()
            .position(|k| *k == key)
            .map(|i| self.0[i].as_str())
    }

    /// `(key, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        FIELD_SCHEMA.iter().copied().zip(self.0.iter().map(String::as_str))
    }

    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.0
    }
}

/// One row of the result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Original file name.
    pub filename: String,
    /// Local time the record was produced, formatted with [`TIMESTAMP_FORMAT`].
    pub extracted_at: String,
    /// Schema values.
    pub fields: FieldValues,
}

impl ExtractedRecord {
    /// Record for a successfully extracted document.
    pub fn success(filename: impl Into<String>, extracted_at: impl Into<String>, fields: FieldValues) -> Self {
        Self {
            filename: filename.into(),
            extracted_at: extracted_at.into(),
            fields,
        }
    }

    /// Record for a document that failed at any stage.
    ///
    /// Every field holds [`EXTRACTION_FAILED`] except the title, which carries
    /// the cause truncated to `max_cause_chars` characters.
    pub fn failure(
        filename: impl Into<String>,
        extracted_at: impl Into<String>,
        cause: &str,
        max_cause_chars: usize,
    ) -> Self {
        let mut fields = FieldValues::filled(EXTRACTION_FAILED);
        fields.set(
            Field::Title,
            format!("{}{}...", FAILURE_CAUSE_PREFIX, truncate_chars(cause, max_cause_chars)),
        );

        Self {
            filename: filename.into(),
            extracted_at: extracted_at.into(),
            fields,
        }
    }

    /// Whether this is a failure record.
    pub fn is_failure(&self) -> bool {
        self.fields.get(Field::Title).starts_with(FAILURE_CAUSE_PREFIX)
            && self
                .fields
                .iter()
                .skip(1)
                .all(|(_, v)| v == EXTRACTION_FAILED)
    }

    /// Column headers in export order.
    pub fn columns() -> Vec<&'static str> {
        let mut columns = Vec::with_capacity(FIELD_COUNT + 2);
        columns.push(FILENAME_KEY);
        columns.push(TIMESTAMP_KEY);
        columns.extend(FIELD_SCHEMA);
        columns
    }

    /// Row values in export order.
    pub fn row(&self) -> Vec<&str> {
        let mut row = Vec::with_capacity(FIELD_COUNT + 2);
        row.push(self.filename.as_str());
        row.push(self.extracted_at.as_str());
        row.extend(self.fields.values().iter().map(String::as_str));
        row
    }
}

impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT + 2))?;
        for (key, value) in Self::columns().into_iter().zip(self.row()) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Records of one batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultCollection {
    records: Vec<ExtractedRecord>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ExtractedRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    /// Number of failure records.
    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failure()).count()
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a ExtractedRecord;
    type IntoIter = std::slice::Iter<'a, ExtractedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<ExtractedRecord> for ResultCollection {
    fn from_iter<I: IntoIterator<Item = ExtractedRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Take at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[test]
    fn test_field_keys_match_schema() {
        assert_eq!(Field::Title.key(), "文书名称");
        assert_eq!(Field::JudgmentDate.key(), "判决日期");
        assert_eq!(Field::DocumentType.key(), "文书类型");
        assert_eq!(Field::DocumentType.index(), FIELD_COUNT - 1);
    }

    #[test]
    fn test_failure_record() {
        let cause = "OCR error: engine unavailable (tesseract): No such file or directory";
        let record = ExtractedRecord::failure("scan.png", "2024-03-01 10:00:00", cause, 10);

        assert_eq!(record.fields.get(Field::Title), "失败原因：OCR error:...");
        assert!(record.fields.iter().skip(1).all(|(_, v)| v == EXTRACTION_FAILED));
        assert!(record.is_failure());
    }

    #[test]
    fn test_success_record_is_not_failure() {
        let record = ExtractedRecord::success("a.txt", "2024-03-01 10:00:00", FieldValues::not_mentioned());
        assert!(!record.is_failure());
    }

    #[test]
    fn test_serialized_keys_are_exactly_schema_plus_provenance() {
        let record = ExtractedRecord::success("a.txt", "2024-03-01 10:00:00", FieldValues::not_mentioned());
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        let keys: BTreeSet<&str> = object.keys().map(String::as_str).collect();
        let mut expected: BTreeSet<&str> = FIELD_SCHEMA.into_iter().collect();
        expected.insert(FILENAME_KEY);
        expected.insert(TIMESTAMP_KEY);

        assert_eq!(keys, expected);
        assert!(object.values().all(|v| v.is_string()));
    }

    #[test]
    fn test_columns_order() {
        let columns = ExtractedRecord::columns();
        assert_eq!(columns[0], "文件名");
        assert_eq!(columns[1], "提取时间");
        assert_eq!(&columns[2..], &FIELD_SCHEMA[..]);
    }

    #[test]
    fn test_document_type_classify() {
        assert_eq!(DocumentType::classify("民事"), DocumentType::Civil);
        assert_eq!(DocumentType::classify("刑事判决书"), DocumentType::Criminal);
        assert_eq!(DocumentType::classify(" 行政 "), DocumentType::Administrative);
        assert_eq!(DocumentType::classify("执行裁定"), DocumentType::Other);
        assert_eq!(DocumentType::classify(""), DocumentType::Other);
    }

    #[test]
    fn test_classify_incidental_civil_claim_is_criminal() {
        assert_eq!(DocumentType::classify("刑事附带民事判决书"), DocumentType::Criminal);
        assert_eq!(DocumentType::classify("刑事附带民事"), DocumentType::Criminal);
        assert_eq!(DocumentType::classify("行政附带民事裁定书"), DocumentType::Administrative);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("判决书全文", 2), "判决");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
