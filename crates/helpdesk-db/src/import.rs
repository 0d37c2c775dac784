use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::Database;
use crate::models::NewMessage;
use crate::repository::MessageRepository;

/// One row of the customer message export.
#[derive(Debug, Deserialize)]
struct CsvMessage {
    #[serde(rename = "User ID")]
    user_id: i64,
    #[serde(rename = "Timestamp (UTC)")]
    timestamp: String,
    #[serde(rename = "Message Body")]
    message_body: String,
}

impl Database {
    /// Load a CSV export into the message table. Any bad row aborts the whole
    /// load and nothing is stored.
    pub fn import_messages_csv(&self, path: &Path) -> Result<usize> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open message CSV {}", path.display()))?;
        let count = self
            .import_messages(file)
            .with_context(|| format!("Failed to import {}", path.display()))?;

        info!("Imported {} messages from {}", count, path.display());
        Ok(count)
    }

    pub fn import_messages<R: Read>(&self, reader: R) -> Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        let mut record = csv::StringRecord::new();
        let mut messages = Vec::new();

        // Quoted bodies may span lines, so report the record's own start line.
        while rdr.read_record(&mut record).context("Malformed CSV")? {
            let line = record.position().map_or(0, |p| p.line());
            let row: CsvMessage = record
                .deserialize(Some(&headers))
                .with_context(|| format!("Invalid CSV row at line {line}"))?;
            messages.push(NewMessage {
                userid: row.user_id,
                timestamp: row.timestamp,
                message_body: row.message_body,
            });
        }

        self.insert_messages(&messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
User ID,Timestamp (UTC),Message Body
208,2017-02-01 19:29:27,\"So it means if I pay 3,000 it's ok?\"
1131,2017-02-01 19:16:47,When will I get my loan?
";

    #[test]
    fn imports_every_row() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.import_messages(EXPORT.as_bytes()).unwrap(), 2);

        let rows = db.list_messages().unwrap();
        assert_eq!(rows[0].userid, 208);
        assert_eq!(rows[0].message_body, "So it means if I pay 3,000 it's ok?");
        assert_eq!(rows[1].timestamp, "2017-02-01 19:16:47");
        assert!(rows.iter().all(|r| r.response.is_none()));
    }

    #[test]
    fn non_numeric_user_id_stores_nothing() {
        let db = Database::open_in_memory().unwrap();
        let bad = format!("{EXPORT}abc,2017-02-01 19:00:00,hello\n");

        let err = db.import_messages(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 4"));
        assert!(db.list_messages().unwrap().is_empty());
    }

    #[test]
    fn error_line_counts_multiline_bodies() {
        let db = Database::open_in_memory().unwrap();
        let export = "\
User ID,Timestamp (UTC),Message Body
208,2017-02-01 19:29:27,\"first line
second line\"
1131,2017-02-01 19:16:47,When will I get my loan?
x1,2017-02-01 19:00:00,hello
";

        let err = db.import_messages(export.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 5"), "{err}");
        assert!(db.list_messages().unwrap().is_empty());
    }

    #[test]
    fn multiline_body_is_kept_intact() {
        let db = Database::open_in_memory().unwrap();
        let export = "User ID,Timestamp (UTC),Message Body\n7,2017-02-01 19:29:27,\"a\nb\"\n";
        assert_eq!(db.import_messages(export.as_bytes()).unwrap(), 1);
        assert_eq!(db.list_messages().unwrap()[0].message_body, "a\nb");
    }

    #[test]
    fn missing_file_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .import_messages_csv(Path::new("/nonexistent/customer_messages.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
