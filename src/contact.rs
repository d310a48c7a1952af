//! Contact form: field validators and the simulated submission desk.
//!
//! Nothing leaves the process; a submission is logged and walked through
//! the same pauses a real round trip would take.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use tokio::{
    sync::{oneshot, Mutex},
    time::sleep,
};
use tracing::info;

use crate::{config::SubmissionTimings, error::AppError, schema::ContactSchema};

pub const MESSAGE_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub reason: &'static str,
}

impl FieldError {
    fn new(field: Field, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z\s'-]+$").expect("valid name pattern"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
    })
}

pub fn validate_name(raw: &str) -> Result<(), FieldError> {
    let name = raw.trim();
    let fail = |reason| Err(FieldError::new(Field::Name, reason));

    if name.is_empty() {
        return fail("Please enter your name");
    }
    let len = name.chars().count();
    if len < 2 {
        return fail("Name must be at least 2 characters");
    }
    if len > 50 {
        return fail("Name is too long (max 50 characters)");
    }
    if !name_pattern().is_match(name) {
        return fail("Name can only contain letters, spaces, hyphens, and apostrophes");
    }

    Ok(())
}

pub fn validate_email(raw: &str) -> Result<(), FieldError> {
    let email = raw.trim();
    let fail = |reason| Err(FieldError::new(Field::Email, reason));

    if email.is_empty() {
        return fail("Please enter your email address");
    }
    if !email_pattern().is_match(email) {
        return fail("Please enter a valid email address (e.g., name@example.com)");
    }
    if email.chars().count() > 100 {
        return fail("Email is too long (max 100 characters)");
    }

    Ok(())
}

pub fn validate_message(raw: &str) -> Result<(), FieldError> {
    let message = raw.trim();
    let fail = |reason| Err(FieldError::new(Field::Message, reason));

    if message.is_empty() {
        return fail("Please enter a message");
    }
    let len = message.chars().count();
    if len < 10 {
        return fail("Message must be at least 10 characters");
    }
    if len > MESSAGE_LIMIT {
        return fail("Message is too long (max 500 characters)");
    }

    Ok(())
}

/// Every failing field, in form order.
pub fn field_errors(form: &ContactSchema) -> Vec<FieldError> {
    [
        validate_name(&form.name),
        validate_email(&form.email),
        validate_message(&form.message),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// Returns the trimmed form when all three fields pass.
pub fn validate_form(form: &ContactSchema) -> Result<ContactSchema, AppError> {
    let errors = field_errors(form);
    if !errors.is_empty() {
        return Err(AppError::InvalidForm(errors));
    }

    Ok(ContactSchema {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        message: form.message.trim().to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterLevel {
    Normal,
    Warning,
    Over,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCounter {
    pub text: String,
    pub level: CounterLevel,
}

pub fn message_counter(message: &str) -> MessageCounter {
    let len = message.chars().count();
    let level = match len {
        n if n > MESSAGE_LIMIT => CounterLevel::Over,
        n if n > 450 => CounterLevel::Warning,
        _ => CounterLevel::Normal,
    };

    MessageCounter {
        text: format!("{len} / {MESSAGE_LIMIT}"),
        level,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
    /// First invalid field, which receives focus.
    pub focus: Option<Field>,
    pub counter: MessageCounter,
}

pub fn report(form: &ContactSchema) -> ContactReport {
    let errors = field_errors(form);

    ContactReport {
        valid: errors.is_empty(),
        focus: errors.first().map(|e| e.field),
        counter: message_counter(&form.message),
        errors,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskStatus {
    pub phase: SubmissionPhase,
    pub submit_enabled: bool,
    pub success_visible: bool,
}

impl Default for DeskStatus {
    fn default() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            submit_enabled: true,
            success_visible: false,
        }
    }
}

#[derive(Debug)]
pub struct ContactDesk {
    timings: SubmissionTimings,
    status: Arc<Mutex<DeskStatus>>,
}

impl ContactDesk {
    pub fn new(timings: SubmissionTimings) -> Self {
        Self {
            timings,
            status: Arc::new(Mutex::new(DeskStatus::default())),
        }
    }

    pub async fn status(&self) -> DeskStatus {
        *self.status.lock().await
    }

    /// Validates and simulates sending the form. Resolves once the submission
    /// is confirmed; the reset and notice timeout continue in the background.
    pub async fn submit(&self, form: &ContactSchema) -> Result<ContactSchema, AppError> {
        let contact = validate_form(form)?;

        {
            let mut status = self.status.lock().await;
            if status.phase != SubmissionPhase::Idle {
                return Err(AppError::Conflict(
                    "A submission is already in progress".to_string(),
                ));
            }
            *status = DeskStatus {
                phase: SubmissionPhase::Submitting,
                submit_enabled: false,
                success_visible: false,
            };
        }

        let (confirmed_tx, confirmed_rx) = oneshot::channel();
        let status = self.status.clone();
        let timings = self.timings;
        let logged = contact.clone();

        // runs detached so a dropped request cannot leave the desk disabled
        tokio::spawn(async move {
            sleep(timings.submit).await;

            info!(
                name = %logged.name,
                email = %logged.email,
                message = %logged.message,
                "Form submitted successfully!"
            );
            {
                let mut status = status.lock().await;
                status.phase = SubmissionPhase::Confirmed;
                status.success_visible = true;
            }
            let _ = confirmed_tx.send(());

            sleep(timings.reset).await;
            {
                let mut status = status.lock().await;
                status.phase = SubmissionPhase::Idle;
                status.submit_enabled = true;
            }

            sleep(timings.notice).await;
            let mut status = status.lock().await;
            if status.phase == SubmissionPhase::Idle {
                status.success_visible = false;
            }
        });

        let _ = confirmed_rx.await;
        Ok(contact)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactSchema {
        ContactSchema {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Mary-Jane O'Neil").is_ok());
        assert_eq!(validate_name("   ").unwrap_err().reason, "Please enter your name");
        assert_eq!(validate_name("A").unwrap_err().reason, "Name must be at least 2 characters");
        assert!(validate_name(&"a".repeat(51)).is_err());
        assert!(validate_name(&"a".repeat(50)).is_ok());
        assert_eq!(
            validate_name("R2D2").unwrap_err().reason,
            "Name can only contain letters, spaces, hyphens, and apostrophes"
        );
    }

    #[test]
    fn email_rules() {
        assert!(validate_email(" name@example.com ").is_ok());
        assert!(validate_email("name.example.com").is_err());
        assert!(validate_email("name@example").is_err());
        assert_eq!(
            validate_email("").unwrap_err().reason,
            "Please enter your email address"
        );

        let long = format!("{}@example.com", "a".repeat(90));
        assert_eq!(
            validate_email(&long).unwrap_err().reason,
            "Email is too long (max 100 characters)"
        );
    }

    #[test]
    fn message_length_bounds() {
        assert!(validate_message("0123456789").is_ok());
        assert_eq!(
            validate_message("012345678").unwrap_err().reason,
            "Message must be at least 10 characters"
        );
        assert!(validate_message(&"x".repeat(500)).is_ok());
        assert!(validate_message(&"x".repeat(501)).is_err());
        // trimmed before measuring
        assert!(validate_message("  12345678  ").is_err());
    }

    #[test]
    fn report_focuses_first_invalid_field() {
        let report = report(&form("Ada", "ada-at-example", "short"));
        assert!(!report.valid);
        assert_eq!(report.focus, Some(Field::Email));
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.counter.text, "5 / 500");
    }

    #[test]
    fn counter_levels() {
        assert_eq!(message_counter("hi").level, CounterLevel::Normal);
        assert_eq!(message_counter(&"x".repeat(451)).level, CounterLevel::Warning);
        assert_eq!(message_counter(&"x".repeat(501)).level, CounterLevel::Over);
    }

    #[tokio::test]
    async fn submit_walks_through_phases() {
        let desk = ContactDesk::new(SubmissionTimings {
            submit: Duration::from_millis(5),
            reset: Duration::from_millis(100),
            notice: Duration::from_millis(100),
        });

        let contact = desk
            .submit(&form(" Ada Lovelace ", "ada@example.com", "Hello there, engine!"))
            .await
            .unwrap();
        assert_eq!(contact.name, "Ada Lovelace");

        let status = desk.status().await;
        assert_eq!(status.phase, SubmissionPhase::Confirmed);
        assert!(!status.submit_enabled);
        assert!(status.success_visible);

        let err = desk
            .submit(&form("Ada Lovelace", "ada@example.com", "Hello there, engine!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        sleep(Duration::from_millis(400)).await;
        assert_eq!(desk.status().await, DeskStatus::default());
    }

    #[tokio::test]
    async fn invalid_submit_leaves_desk_idle() {
        let desk = ContactDesk::new(SubmissionTimings::instant());
        let err = desk.submit(&form("", "", "")).await.unwrap_err();

        match err {
            AppError::InvalidForm(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(desk.status().await.phase, SubmissionPhase::Idle);
    }
}
