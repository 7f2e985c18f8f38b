//! Line-by-line reader for the archive's `.jsonlines` dumps
//!
//! Dumps are large (hundreds of MB for subjects), so records are decoded one
//! line at a time and never collected. An optional limit caps the number of
//! records handed out, for partial runs.

use bangumi_common::records::{decode_line, JsonRecord};
use bangumi_common::Result;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Typed reader over one dump file
pub struct JsonLinesReader<T> {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    records_read: usize,
    limit: Option<usize>,
    _record: PhantomData<T>,
}

impl<T: JsonRecord> JsonLinesReader<T> {
    /// Open the dump file for `T` inside `data_folder`
    ///
    /// A missing file is an I/O error.
    pub async fn open(data_folder: &Path) -> Result<Self> {
        Self::open_path(data_folder.join(T::KIND.file_name())).await
    }

    pub async fn open_path(path: PathBuf) -> Result<Self> {
        let file = File::open(&path).await.map_err(|e| {
            std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
        })?;

        tracing::debug!(file = %path.display(), "Reading {}", T::KIND);

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
            records_read: 0,
            limit: None,
            _record: PhantomData,
        })
    }

    /// Stop after `limit` records (`None` reads to the end)
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Next `(line number, record)`, skipping blank lines
    ///
    /// Line numbers are 1-based. A line that does not decode is an error.
    pub async fn next_record(&mut self) -> Result<Option<(usize, T)>> {
        if self.limit_reached() {
            return Ok(None);
        }

        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = decode_line(&self.path, self.line_number, &line)?;
            self.records_read += 1;
            return Ok(Some((self.line_number, record)));
        }
        Ok(None)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    pub fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.records_read >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bangumi_common::records::{PersonRecord, SubjectRecord};
    use bangumi_common::Error;

    #[tokio::test]
    async fn test_reads_records_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("person.jsonlines"),
            "{\"id\":1,\"name\":\"A\",\"type\":1}\n\n   \n{\"id\":2,\"name\":\"B\",\"type\":2}\n",
        )
        .unwrap();

        let mut reader = JsonLinesReader::<PersonRecord>::open(dir.path()).await.unwrap();

        let (line, first) = reader.next_record().await.unwrap().unwrap();
        assert_eq!((line, first.id), (1, 1));
        let (line, second) = reader.next_record().await.unwrap().unwrap();
        assert_eq!((line, second.id), (4, 2));
        assert!(reader.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_limit_stops_reading() {
        let dir = tempfile::tempdir().unwrap();
        let lines: String = (1..=5)
            .map(|id| format!("{{\"id\":{},\"name\":\"p\",\"type\":1}}\n", id))
            .collect();
        std::fs::write(dir.path().join("person.jsonlines"), lines).unwrap();

        let mut reader = JsonLinesReader::<PersonRecord>::open(dir.path())
            .await
            .unwrap()
            .with_limit(Some(2));

        let mut ids = Vec::new();
        while let Some((_, person)) = reader.next_record().await.unwrap() {
            ids.push(person.id);
        }

        assert_eq!(ids, vec![1, 2]);
        assert!(reader.limit_reached());
        assert_eq!(reader.records_read(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = JsonLinesReader::<SubjectRecord>::open(dir.path()).await;

        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_bad_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("subject.jsonlines"),
            "{\"id\":1,\"type\":2,\"name\":\"ok\"}\nnot json\n",
        )
        .unwrap();

        let mut reader = JsonLinesReader::<SubjectRecord>::open(dir.path()).await.unwrap();
        reader.next_record().await.unwrap();

        match reader.next_record().await {
            Err(Error::Decode { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected decode error, got {:?}", other.map(|r| r.map(|(l, _)| l))),
        }
    }
}
