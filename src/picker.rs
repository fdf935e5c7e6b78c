use crate::errors::AppError;
use crate::store::{VocabEntry, VocabStore};

/// A uniformly random entry, or `None` when the store holds nothing.
pub async fn pick_random(store: &VocabStore) -> Result<Option<VocabEntry>, AppError> {
    store.random_entry().await
}
