//! Templated invitation notifier.
//!
//! Renders invitation emails with accept/decline links and hands them to a
//! structured log; an actual mail transport sits outside this crate and
//! consumes the same rendered payload.

use async_trait::async_trait;
use minijinja::Environment;
use serde_json::{Map, Value};

use crate::project::ports::{InvitationNotice, InvitationNotifier, NotificationError};

const SUBJECT_TEMPLATE: &str =
    "{{ inviter_name }} invited you to collaborate on {{ project_name }}";

const BODY_TEMPLATE: &str = "\
Hello,

{{ inviter_name }} has invited you to join the project \"{{ project_name }}\" \
as {{ role }}.

Accept:  {{ base_url }}/email/invitation-response?token={{ token }}&action=accept
Decline: {{ base_url }}/email/invitation-response?token={{ token }}&action=decline

This invitation expires seven days after it was sent.
";

/// Notifier rendering invitation emails from templates.
#[derive(Debug, Clone)]
pub struct TemplatedInvitationNotifier {
    base_url: String,
}

impl TemplatedInvitationNotifier {
    /// Creates a notifier building links against the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Renders the subject line for a notice.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Template`] when rendering fails.
    pub fn render_subject(&self, notice: &InvitationNotice) -> Result<String, NotificationError> {
        self.render(SUBJECT_TEMPLATE, notice)
    }

    /// Renders the body, including accept and decline links carrying the
    /// invitation token.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Template`] when rendering fails.
    pub fn render_body(&self, notice: &InvitationNotice) -> Result<String, NotificationError> {
        self.render(BODY_TEMPLATE, notice)
    }

    fn render(&self, template: &str, notice: &InvitationNotice) -> Result<String, NotificationError> {
        let environment = Environment::new();
        let context = self.build_context(notice);
        Ok(environment.render_str(template, context)?)
    }

    fn build_context(&self, notice: &InvitationNotice) -> Map<String, Value> {
        let mut context = Map::new();
        context.insert(
            "base_url".to_owned(),
            Value::String(self.base_url.clone()),
        );
        context.insert(
            "inviter_name".to_owned(),
            Value::String(notice.inviter_name.clone()),
        );
        context.insert(
            "project_name".to_owned(),
            Value::String(notice.project_name.clone()),
        );
        context.insert(
            "role".to_owned(),
            Value::String(notice.role.as_str().to_owned()),
        );
        context.insert("token".to_owned(), Value::String(notice.token.clone()));
        context
    }
}

#[async_trait]
impl InvitationNotifier for TemplatedInvitationNotifier {
    async fn invitation_created(&self, notice: &InvitationNotice) -> Result<(), NotificationError> {
        let subject = self.render_subject(notice)?;
        let body = self.render_body(notice)?;
        tracing::info!(
            to = %notice.to,
            %subject,
            body_bytes = body.len(),
            "invitation notification rendered for delivery"
        );
        Ok(())
    }
}
