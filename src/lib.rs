pub mod configuration;
pub mod dedup;
pub mod email_client;
pub mod errors;
pub mod import;
pub mod notifier;
pub mod picker;
pub mod scheduler;
pub mod store;
pub mod telemetry;
pub mod validation;

use crate::configuration::{Settings, get_configuration};
use crate::dedup::{DedupReport, remove_duplicates};
use crate::email_client::EmailClient;
use crate::errors::AppError;
use crate::import::{ImportSummary, import_words};
use crate::notifier::{DeliveryOutcome, send_word_of_the_day};
use crate::scheduler::{JobKind, Scheduler};
use crate::store::VocabStore;
use crate::validation::ValidatedEmail;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Startup passes, then the scheduler loop.
    #[default]
    Run,
    Import,
    Dedup,
    Send,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: VocabStore,
    pub email_client: Arc<EmailClient>,
    pub recipients: Arc<Vec<ValidatedEmail>>,
    pub conf: Arc<Settings>,
}

impl AppState {
    pub async fn build(conf: Settings) -> Result<Self, AppError> {
        let store = VocabStore::connect(&conf.database).await?;
        Self::with_store(conf, store)
    }

    pub fn with_store(conf: Settings, store: VocabStore) -> Result<Self, AppError> {
        let sender = conf.email_client.parse_email()?;
        let recipients = conf.email_client.parse_recipients()?;
        let email_client = EmailClient::new(
            &conf.email_client.base_url,
            sender,
            &conf.email_client.authorization_token,
            conf.email_client.timeout(),
        )?;
        Ok(Self {
            store,
            email_client: Arc::new(email_client),
            recipients: Arc::new(recipients),
            conf: Arc::new(conf),
        })
    }

    pub async fn dedup(&self) -> Result<DedupReport, AppError> {
        remove_duplicates(&self.store, &self.conf.files.duplicates_report_path).await
    }

    pub async fn import(&self) -> Result<ImportSummary, AppError> {
        import_words(
            &self.store,
            &self.conf.files.import_path,
            &self.conf.files.summary_log_path,
        )
        .await
    }

    pub async fn send(&self) -> DeliveryOutcome {
        send_word_of_the_day(&self.store, &self.email_client, &self.recipients).await
    }

    /// Runs one scheduled job. Errors are logged so the scheduler keeps going.
    pub async fn run_job(&self, job: JobKind) {
        match job {
            JobKind::ImportWords => {
                if let Err(e) = self.import().await {
                    tracing::error!(error = %e, "scheduled import failed");
                }
            }
            JobKind::SendWord => {
                self.send().await;
            }
        }
    }

    /// Dedup then import, as done once before the scheduler starts.
    pub async fn startup(&self) -> Result<(), AppError> {
        self.dedup().await?;
        match self.import().await {
            Ok(_) => {}
            Err(AppError::IoError(e)) => {
                tracing::warn!(
                    error = %e,
                    path = %self.conf.files.import_path.display(),
                    "word list not readable, skipping initial import"
                );
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub async fn run_scheduler(&self) -> Result<(), AppError> {
        let mut scheduler = Scheduler::from_settings(&self.conf.schedule, Local::now())?;
        for job in scheduler.jobs() {
            tracing::info!(
                job = ?job.kind,
                cron = %job.cron_expr,
                next = ?job.next_after(&Local::now()),
                "scheduled job"
            );
        }

        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.conf.schedule.tick_seconds.max(1)));
        loop {
            ticker.tick().await;
            for job in scheduler.due_jobs(Local::now()) {
                self.run_job(job).await;
            }
        }
    }
}

pub async fn run(command: Command) -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    telemetry::init_subscriber("info");

    let conf = get_configuration()?;
    let app_state = AppState::build(conf).await?;

    match command {
        Command::Run => {
            app_state.startup().await?;
            app_state.run_scheduler().await
        }
        Command::Import => app_state.import().await.map(|_| ()),
        Command::Dedup => app_state.dedup().await.map(|_| ()),
        Command::Send => {
            app_state.send().await;
            Ok(())
        }
    }
}
