//! Emails rendered from templates.

use django_core_common::error::{CoreError, CoreResult};
use django_core_common::settings::CoreSettings;
use pulldown_cmark::{html, Options, Parser};
use serde_json::Value;

use crate::backends::EmailBackend;
use crate::message::{Attachment, EmailMessage};

/// Name the default base HTML template is registered under.
pub const BASE_EMAIL_TEMPLATE_NAME: &str = "django_core/mail/base_email.html";

const BASE_EMAIL_TEMPLATE: &str = "<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"></head>
<body>
{{ email_content | safe }}
</body>
</html>
";

/// Converts CommonMark (with tables and strikethrough) to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// Adds the default base HTML email template to `tera`.
pub fn register_templates(tera: &mut tera::Tera) -> CoreResult<()> {
    tera.add_raw_template(BASE_EMAIL_TEMPLATE_NAME, BASE_EMAIL_TEMPLATE)
        .map_err(|e| CoreError::TemplateError(format!("{BASE_EMAIL_TEMPLATE_NAME}: {e}")))
}

/// The templates an email's bodies are rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplates {
    /// One markdown template for both bodies. The rendered markdown is the
    /// text body; the HTML body is the settings' base HTML template with the
    /// markdown converted to HTML as `email_content`.
    Markdown(String),
    /// Separate text and HTML templates.
    TextAndHtml { text: String, html: String },
}

/// An email to render and send to one or many recipients.
///
/// ```
/// use django_core_mail::TemplateEmail;
///
/// let email = TemplateEmail::text_and_html("Welcome", "welcome.txt", "welcome.html")
///     .from_email("team@example.com")
///     .insert("name", "Ann");
/// assert_eq!(email.context["name"], "Ann");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateEmail {
    pub subject: String,
    /// Sender; the settings' `default_from_email` when unset.
    pub from_email: Option<String>,
    pub templates: EmailTemplates,
    pub context: serde_json::Map<String, Value>,
    /// Attached to every message sent.
    pub attachments: Vec<Attachment>,
    /// Backend failures are logged instead of returned.
    pub fail_silently: bool,
}

impl TemplateEmail {
    pub fn new(subject: impl Into<String>, templates: EmailTemplates) -> Self {
        Self {
            subject: subject.into(),
            from_email: None,
            templates,
            context: serde_json::Map::new(),
            attachments: Vec::new(),
            fail_silently: false,
        }
    }

    pub fn markdown(subject: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(subject, EmailTemplates::Markdown(template.into()))
    }

    pub fn text_and_html(
        subject: impl Into<String>,
        text_template: impl Into<String>,
        html_template: impl Into<String>,
    ) -> Self {
        Self::new(
            subject,
            EmailTemplates::TextAndHtml {
                text: text_template.into(),
                html: html_template.into(),
            },
        )
    }

    #[must_use]
    pub fn from_email(mut self, from_email: impl Into<String>) -> Self {
        self.from_email = Some(from_email.into());
        self
    }

    #[must_use]
    pub fn context(mut self, context: serde_json::Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    #[must_use]
    pub const fn fail_silently(mut self) -> Self {
        self.fail_silently = true;
        self
    }

    /// Renders the `(text, html)` bodies.
    pub fn render(&self, engine: &tera::Tera, settings: &CoreSettings) -> CoreResult<(String, String)> {
        match &self.templates {
            EmailTemplates::Markdown(template) => {
                let text = render(engine, template, &self.context)?;
                let mut context = self.context.clone();
                context.insert("email_content".into(), markdown_to_html(&text).into());
                let html = render(engine, &settings.base_html_email_template, &context)?;
                Ok((text, html))
            }
            EmailTemplates::TextAndHtml { text, html } => Ok((
                render(engine, text, &self.context)?,
                render(engine, html, &self.context)?,
            )),
        }
    }

    /// One message per recipient, each with the HTML alternative and every
    /// attachment.
    pub fn build_messages<S: AsRef<str>>(
        &self,
        to_emails: &[S],
        text: &str,
        html: &str,
        settings: &CoreSettings,
    ) -> Vec<EmailMessage> {
        let from_email = self
            .from_email
            .as_deref()
            .unwrap_or(&settings.default_from_email);
        to_emails
            .iter()
            .map(|to| {
                let mut message = EmailMessage::new(
                    self.subject.clone(),
                    text,
                    from_email,
                    vec![to.as_ref().to_string()],
                )
                .with_html_body(html);
                if !self.attachments.is_empty() {
                    message.mixed_subtype = "related".to_string();
                    message.attachments.clone_from(&self.attachments);
                }
                message
            })
            .collect()
    }
}

fn render(
    engine: &tera::Tera,
    template_name: &str,
    context: &serde_json::Map<String, Value>,
) -> CoreResult<String> {
    tera::Context::from_serialize(context)
        .and_then(|ctx| engine.render(template_name, &ctx))
        .map_err(|e| CoreError::TemplateError(format!("{template_name}: {e}")))
}

/// Renders `email` once and sends a separate message to each address in
/// `to_emails`. Returns how many messages were sent; an empty recipient list
/// sends nothing.
pub async fn send_emails_from_template<S: AsRef<str> + Sync>(
    to_emails: &[S],
    email: &TemplateEmail,
    engine: &tera::Tera,
    settings: &CoreSettings,
    backend: &dyn EmailBackend,
) -> CoreResult<usize> {
    if to_emails.is_empty() {
        return Ok(0);
    }
    let (text, html) = email.render(engine, settings)?;
    let messages = email.build_messages(to_emails, &text, &html, settings);
    tracing::info!(subject = %email.subject, count = messages.len(), "sending templated emails");
    match backend.send_messages(&messages).await {
        Ok(sent) => Ok(sent),
        Err(e) if email.fail_silently => {
            tracing::warn!(error = %e, subject = %email.subject, "email sending failed");
            Ok(0)
        }
        Err(e) => Err(e),
    }
}

/// [`send_emails_from_template`] for a single recipient.
pub async fn send_email_from_template(
    to_email: &str,
    email: &TemplateEmail,
    engine: &tera::Tera,
    settings: &CoreSettings,
    backend: &dyn EmailBackend,
) -> CoreResult<usize> {
    send_emails_from_template(&[to_email], email, engine, settings, backend).await
}
