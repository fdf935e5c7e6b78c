use crate::email_client::EmailClient;
use crate::picker::pick_random;
use crate::store::{VocabEntry, VocabStore};
use crate::validation::ValidatedEmail;
use tracing::instrument;

pub const SUBJECT: &str = "Word of the Day";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent(VocabEntry),
    NoData,
    Failed,
}

pub fn message_body(entry: &VocabEntry) -> String {
    format!("Word of the Day:\n{}: {}", entry.word, entry.definition)
}

fn is_sendable(entry: &VocabEntry) -> bool {
    !entry.word.is_empty() && !entry.definition.is_empty()
}

/// Picks a random word and sends it to every recipient. Nothing in here
/// propagates: a failed pick or a failed delivery is logged and reported
/// through the outcome.
#[instrument(name = "sending word of the day", skip_all, fields(recipients = recipients.len()))]
pub async fn send_word_of_the_day(
    store: &VocabStore,
    email_client: &EmailClient,
    recipients: &[ValidatedEmail],
) -> DeliveryOutcome {
    let entry = match pick_random(store).await {
        Ok(Some(entry)) if is_sendable(&entry) => entry,
        Ok(Some(entry)) => {
            tracing::warn!(word = %entry.word, "picked entry has an empty field, not sending");
            return DeliveryOutcome::NoData;
        }
        Ok(None) => {
            tracing::info!("no vocabulary words available to send");
            return DeliveryOutcome::NoData;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to pick a vocabulary word");
            return DeliveryOutcome::Failed;
        }
    };

    match email_client
        .send_email(recipients, SUBJECT, &message_body(&entry))
        .await
    {
        Ok(()) => {
            tracing::info!(word = %entry.word, "SMS sent successfully");
            DeliveryOutcome::Sent(entry)
        }
        Err(e) => {
            tracing::error!(word = %entry.word, error = ?e, "failed to send SMS");
            DeliveryOutcome::Failed
        }
    }
}
