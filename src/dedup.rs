use crate::errors::AppError;
use crate::store::{StoredEntry, VocabEntry, VocabStore};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::instrument;

/// One duplicate set: the pair and how many rows carried it before the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Definition")]
    pub definition: String,
    #[serde(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub groups: Vec<DuplicateGroup>,
    pub removed: u64,
}

/// Result of grouping the collection: the duplicate sets and the row ids that
/// have to go so that each pair keeps only its oldest row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicatePlan {
    pub groups: Vec<DuplicateGroup>,
    pub doomed_ids: Vec<i64>,
}

/// `entries` must be ordered by insertion (ascending id).
pub fn plan_removals(entries: &[StoredEntry]) -> DuplicatePlan {
    let mut index: HashMap<VocabEntry, usize> = HashMap::new();
    let mut seen: Vec<(VocabEntry, usize)> = Vec::new();
    let mut doomed_ids = Vec::new();

    for entry in entries {
        let key = entry.key();
        match index.get(&key) {
            Some(&slot) => {
                seen[slot].1 += 1;
                doomed_ids.push(entry.id);
            }
            None => {
                index.insert(key.clone(), seen.len());
                seen.push((key, 1));
            }
        }
    }

    let groups = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, count)| DuplicateGroup {
            word: key.word,
            definition: key.definition,
            count,
        })
        .collect();

    DuplicatePlan { groups, doomed_ids }
}

pub fn write_report(path: &Path, groups: &[DuplicateGroup]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;
    if groups.is_empty() {
        writer.write_record(["Word", "Definition", "Count"])?;
    }
    for group in groups {
        writer.serialize(group)?;
    }
    writer.flush()?;
    Ok(())
}

/// Deletes every row except the earliest-inserted one of each duplicate set,
/// then rewrites the duplicate report. A failed delete leaves the old report.
#[instrument(name = "removing duplicate vocabulary words", skip(store))]
pub async fn remove_duplicates(
    store: &VocabStore,
    report_path: &Path,
) -> Result<DedupReport, AppError> {
    let entries = store.all_entries().await?;
    let plan = plan_removals(&entries);

    let mut transaction = store.pool().begin().await?;
    let mut removed = 0;
    for id in &plan.doomed_ids {
        removed += sqlx::query("DELETE FROM words WHERE id = ?")
            .bind(id)
            .execute(&mut *transaction)
            .await?
            .rows_affected();
    }
    transaction.commit().await?;
    write_report(report_path, &plan.groups)?;

    if !plan.groups.is_empty() {
        tracing::info!(
            groups = plan.groups.len(),
            removed,
            report = %report_path.display(),
            "removed duplicate vocabulary words"
        );
    }

    Ok(DedupReport {
        groups: plan.groups,
        removed,
    })
}
