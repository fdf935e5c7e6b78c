#![allow(dead_code)]

use std::path::{Path, PathBuf};
use uuid::Uuid;
use vocab_sms::AppState;
use vocab_sms::configuration::{
    DatabaseSettings, EmailClientSettings, FileSettings, ScheduleSettings, Settings,
};
use vocab_sms::errors::AppError;
use vocab_sms::store::VocabStore;

pub struct TestApp {
    pub state: AppState,
    pub email_server: mockito::ServerGuard,
    pub dir: PathBuf,
}

impl TestApp {
    pub fn write_word_list(&self, contents: &str) {
        std::fs::write(&self.state.conf.files.import_path, contents).expect("error writing word list");
    }

    pub fn summary_log(&self) -> String {
        std::fs::read_to_string(&self.state.conf.files.summary_log_path).unwrap_or_default()
    }

    pub fn duplicates_report(&self) -> String {
        std::fs::read_to_string(&self.state.conf.files.duplicates_report_path)
            .expect("duplicates report missing")
    }

    pub fn store(&self) -> &VocabStore {
        &self.state.store
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub fn test_settings(dir: &Path, email_server_url: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            path: dir.join("vocab.db"),
            create_if_missing: true,
        },
        email_client: EmailClientSettings {
            base_url: email_server_url.to_string(),
            sender_email: "vocab@example.com".to_string(),
            authorization_token: "test-token".to_string(),
            timeout_milliseconds: 2000,
            recipients: vec![
                "5555550100@txt.att.net".to_string(),
                "5555550100@tmomail.net".to_string(),
            ],
        },
        files: FileSettings {
            import_path: dir.join("vocab_words.csv"),
            duplicates_report_path: dir.join("duplicates_removed.csv"),
            summary_log_path: dir.join("summary.txt"),
        },
        schedule: ScheduleSettings {
            tick_seconds: 60,
            import: "0 0 0 * * Mon".to_string(),
            deliveries: vec!["0 0 9 * * *".to_string(), "0 0 19 * * *".to_string()],
        },
    }
}

/// A fresh, migrated database in its own temp directory plus a mock email API.
pub async fn spawn_app() -> Result<TestApp, AppError> {
    let email_server = mockito::Server::new_async().await;
    let dir = std::env::temp_dir().join(format!("vocab_sms-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;

    let conf = test_settings(&dir, &email_server.url());
    let state = AppState::build(conf).await?;

    Ok(TestApp {
        state,
        email_server,
        dir,
    })
}

/// Inserts rows verbatim, bypassing the importer's duplicate check.
pub async fn insert_raw(store: &VocabStore, rows: &[(&str, &str)]) {
    for (word, definition) in rows {
        sqlx::query("INSERT INTO words (word, definition) VALUES (?, ?)")
            .bind(*word)
            .bind(*definition)
            .execute(store.pool())
            .await
            .expect("error inserting row");
    }
}
