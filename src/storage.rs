use crate::models::{InsurerRecord, NAME};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid insurer data: {0}")]
    Validation(String),

    #[error("insurer not found: {0}")]
    NotFound(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Insurer collection persisted as one pretty-printed JSON array.
///
/// Every operation reads the file, so edits made outside the server are picked up.
/// Writes from this process are serialized; across processes the last writer wins.
#[derive(Clone)]
pub struct InsurerStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl InsurerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get_all(&self) -> Result<Vec<InsurerRecord>, StoreError> {
        read_records(&self.path).await
    }

    pub async fn replace_all(&self, records: Vec<InsurerRecord>) -> Result<(), StoreError> {
        ensure_unique_names(&records)?;
        let _guard = self.write_lock.lock().await;
        write_records(&self.path, &records).await?;
        info!(count = records.len(), "replaced insurer collection");
        Ok(())
    }

    pub async fn update_invoice_date(
        &self,
        name: &str,
        new_date: &str,
    ) -> Result<InsurerRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = read_records(&self.path).await?;
        let record = records
            .iter_mut()
            .find(|record| record.name() == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        record.set_last_invoice(new_date);
        let updated = record.clone();

        write_records(&self.path, &records).await?;
        info!(insurer = name, last_invoice = new_date, "updated invoice date");
        Ok(updated)
    }
}

/// Parses a request payload that must be a JSON array of insurer records.
pub fn records_from_json(bytes: &[u8]) -> Result<Vec<InsurerRecord>, StoreError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| StoreError::Validation(format!("malformed JSON: {err}")))?;
    records_from_value(value)
}

pub fn records_from_value(value: Value) -> Result<Vec<InsurerRecord>, StoreError> {
    let Value::Array(items) = value else {
        return Err(StoreError::Validation("expected an array of insurers".into()));
    };
    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let has_name = item
                .get(NAME)
                .and_then(Value::as_str)
                .is_some_and(|name| !name.trim().is_empty());
            if !item.is_object() || !has_name {
                return Err(StoreError::Validation(format!(
                    "insurer at index {index} needs a non-empty string name"
                )));
            }
            serde_json::from_value(item).map_err(|err| {
                StoreError::Validation(format!("invalid insurer at index {index}: {err}"))
            })
        })
        .collect::<Result<Vec<InsurerRecord>, _>>()?;
    ensure_unique_names(&records)?;
    Ok(records)
}

fn ensure_unique_names(records: &[InsurerRecord]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.name()) {
            return Err(StoreError::Validation(format!(
                "duplicate insurer name: {}",
                record.name()
            )));
        }
    }
    Ok(())
}

async fn read_records(path: &Path) -> Result<Vec<InsurerRecord>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
            error!("failed to parse data file {}: {err}", path.display());
            StoreError::Corrupt(err)
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            Err(StoreError::Io(err))
        }
    }
}

async fn write_records(path: &Path, records: &[InsurerRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(records)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await.inspect_err(|err| {
        error!("failed to write data file {}: {err}", staging.display());
    })?;
    fs::rename(&staging, path).await?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> InsurerStore {
        InsurerStore::new(dir.path().join("data").join("insurers.json"))
    }

    fn sample() -> Vec<InsurerRecord> {
        records_from_value(json!([
            {
                "name": "AOK Bayern",
                "turnus": "30-tägig",
                "last_invoice": "01.01.2025, per Mail",
                "dokumentenart": "Sammelrechnung",
                "bezugsweg": "Portal"
            },
            { "name": "IKK classic", "settlementCompleted": true, "kontakt": "Frau Weber" }
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_then_get_returns_same_records() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let records = sample();

        store.replace_all(records.clone()).await.unwrap();
        assert_eq!(store.get_all().await.unwrap(), records);

        store.replace_all(Vec::new()).await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_two_space_indented_array() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.replace_all(vec![InsurerRecord::new("TK")]).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"name\": \"TK\""));
        assert!(!staging_path(store.path()).exists());
    }

    #[tokio::test]
    async fn update_invoice_date_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.replace_all(sample()).await.unwrap();

        let updated = store
            .update_invoice_date("AOK Bayern", "14.02.2025")
            .await
            .unwrap();
        assert_eq!(updated.last_invoice(), Some("14.02.2025"));

        let stored = store.get_all().await.unwrap();
        assert_eq!(stored[0].last_invoice(), Some("14.02.2025"));
        assert_eq!(stored[1], sample()[1]);
    }

    #[tokio::test]
    async fn update_unknown_insurer_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.replace_all(sample()).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let err = store
            .update_invoice_date("Unbekannt", "01.03.2025")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(name) if name == "Unbekannt"));
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.get_all().await, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn rejects_non_array_payloads() {
        let err = records_from_json(br#"{"name":"AOK"}"#).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(matches!(
            records_from_json(b"not json"),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            records_from_json(r#"[{"turnus":"30-tägig"}]"#.as_bytes()),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            records_from_json(br#"[{"name":42}]"#),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            records_from_json(br#"["AOK"]"#),
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn irregular_records_do_not_hide_the_collection() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let raw = r#"[
  { "name": "AOK", "turnus": "30-tägig", "last_invoice": "01.01.2025" },
  { "name": "TK", "settlementCompleted": null },
  { "name": "DAK", "turnus": 30, "last_invoice": null }
]"#;
        std::fs::write(store.path(), raw).unwrap();

        let records = store.get_all().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].turnus(), Some("30-tägig"));
        assert!(!records[1].settlement_completed());
        assert_eq!(records[2].turnus(), None);

        let reread: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_value(&records).unwrap(), reread);
    }

    #[tokio::test]
    async fn update_matches_names_exactly() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .replace_all(vec![InsurerRecord::new(" BIG direkt ")])
            .await
            .unwrap();

        assert!(matches!(
            store.update_invoice_date("BIG direkt", "01.03.2025").await,
            Err(StoreError::NotFound(_))
        ));
        let updated = store
            .update_invoice_date(" BIG direkt ", "01.03.2025")
            .await
            .unwrap();
        assert_eq!(updated.name(), " BIG direkt ");
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = records_from_json(br#"[{"name":"AOK"},{"name":"AOK"}]"#).unwrap_err();
        assert!(matches!(err, StoreError::Validation(message) if message.contains("AOK")));
    }
}
