//! Email messages.

use std::collections::HashMap;
use std::fmt::Write;

use django_core_common::error::{CoreError, CoreResult};
use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::{Attachment as MimeAttachment, Mailbox, Message, MultiPart, SinglePart};

/// A file attached to an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub mimetype: String,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, content: Vec<u8>, mimetype: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content,
            mimetype: mimetype.into(),
        }
    }
}

/// An email with a text body and optional alternative renderings.
///
/// ```
/// use django_core_mail::EmailMessage;
///
/// let email = EmailMessage::new("Hi", "Hello", "me@example.com", vec!["you@example.com".into()])
///     .with_html_body("<p>Hello</p>");
/// assert_eq!(email.html_body(), Some("<p>Hello</p>"));
/// assert_eq!(email.recipients(), vec!["you@example.com"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    /// The plain text body.
    pub body: String,
    pub from_email: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub headers: HashMap<String, String>,
    /// `(content, mimetype)` renderings of the body besides the text one.
    pub alternatives: Vec<(String, String)>,
    pub attachments: Vec<Attachment>,
    /// Multipart subtype used when the message has attachments.
    pub mixed_subtype: String,
}

impl EmailMessage {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        from_email: impl Into<String>,
        to: Vec<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            from_email: from_email.into(),
            to,
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            headers: HashMap::new(),
            alternatives: Vec::new(),
            attachments: Vec::new(),
            mixed_subtype: "mixed".to_string(),
        }
    }

    #[must_use]
    pub fn with_alternative(mut self, content: impl Into<String>, mimetype: impl Into<String>) -> Self {
        self.alternatives.push((content.into(), mimetype.into()));
        self
    }

    /// Adds a `text/html` alternative.
    #[must_use]
    pub fn with_html_body(self, html: impl Into<String>) -> Self {
        self.with_alternative(html, "text/html")
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// The first `text/html` alternative.
    pub fn html_body(&self) -> Option<&str> {
        self.alternatives
            .iter()
            .find(|(_, mimetype)| mimetype == "text/html")
            .map(|(content, _)| content.as_str())
    }

    /// Every recipient: to, cc and bcc.
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
            .collect()
    }

    /// A human readable rendering of the message.
    pub fn format_message(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "From: {}", self.from_email);
        let _ = writeln!(output, "To: {}", self.to.join(", "));
        if !self.cc.is_empty() {
            let _ = writeln!(output, "Cc: {}", self.cc.join(", "));
        }
        if !self.reply_to.is_empty() {
            let _ = writeln!(output, "Reply-To: {}", self.reply_to.join(", "));
        }
        let mut headers: Vec<_> = self.headers.iter().collect();
        headers.sort();
        for (key, value) in headers {
            let _ = writeln!(output, "{key}: {value}");
        }
        let _ = writeln!(output, "Subject: {}", self.subject);
        let _ = writeln!(output, "\n{}", self.body);

        for (content, mimetype) in &self.alternatives {
            let _ = writeln!(output, "\n--- {mimetype} ---\n{content}");
        }
        if !self.attachments.is_empty() {
            let _ = writeln!(output, "\n--- Attachments ({}) ---", self.mixed_subtype);
            for att in &self.attachments {
                let _ = writeln!(
                    output,
                    "  {} ({}, {} bytes)",
                    att.filename,
                    att.mimetype,
                    att.content.len()
                );
            }
        }
        output
    }
}

fn mailbox(address: &str) -> CoreResult<Mailbox> {
    address
        .parse()
        .map_err(|e| CoreError::BadRequest(format!("Invalid email address {address:?}: {e}")))
}

fn content_type(mimetype: &str) -> CoreResult<ContentType> {
    ContentType::parse(mimetype)
        .map_err(|e| CoreError::BadRequest(format!("Invalid mimetype {mimetype:?}: {e}")))
}

impl EmailMessage {
    /// Builds the MIME message handed to an SMTP relay.
    ///
    /// The text body and each alternative form a `multipart/alternative`
    /// part, wrapped with the attachments in a `multipart/<mixed_subtype>`.
    pub fn to_mime(&self) -> CoreResult<Message> {
        let mut builder = Message::builder()
            .from(mailbox(&self.from_email)?)
            .subject(self.subject.clone());
        for address in &self.to {
            builder = builder.to(mailbox(address)?);
        }
        for address in &self.cc {
            builder = builder.cc(mailbox(address)?);
        }
        for address in &self.bcc {
            builder = builder.bcc(mailbox(address)?);
        }
        for address in &self.reply_to {
            builder = builder.reply_to(mailbox(address)?);
        }

        let mut body = MultiPart::alternative().singlepart(SinglePart::plain(self.body.clone()));
        for (content, mimetype) in &self.alternatives {
            body = body.singlepart(
                SinglePart::builder()
                    .header(content_type(mimetype)?)
                    .body(content.clone()),
            );
        }
        if !self.attachments.is_empty() {
            let mut mixed = if self.mixed_subtype == "related" {
                MultiPart::related().multipart(body)
            } else {
                MultiPart::mixed().multipart(body)
            };
            for attachment in &self.attachments {
                mixed = mixed.singlepart(
                    MimeAttachment::new(attachment.filename.clone())
                        .body(attachment.content.clone(), content_type(&attachment.mimetype)?),
                );
            }
            body = mixed;
        }

        let mut headers: Vec<_> = self.headers.iter().collect();
        headers.sort();
        for (name, value) in headers {
            let name = HeaderName::new_from_ascii(name.clone())
                .map_err(|e| CoreError::BadRequest(format!("Invalid header {name:?}: {e}")))?;
            builder = builder.raw_header(HeaderValue::new(name, value.clone()));
        }
        builder
            .multipart(body)
            .map_err(|e| CoreError::BadRequest(format!("Invalid email: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let mut email = EmailMessage::new("Report", "See attached", "a@example.com", vec!["b@example.com".into()])
            .with_html_body("<b>See attached</b>")
            .with_attachment(Attachment::new("r.csv", b"a,b".to_vec(), "text/csv"));
        email.cc.push("c@example.com".into());
        email.bcc.push("hidden@example.com".into());

        let text = email.format_message();
        assert!(text.contains("Subject: Report"));
        assert!(text.contains("Cc: c@example.com"));
        assert!(!text.contains("hidden@example.com"));
        assert!(text.contains("--- text/html ---\n<b>See attached</b>"));
        assert!(text.contains("r.csv (text/csv, 3 bytes)"));
        assert_eq!(email.recipients().len(), 3);
    }

    #[test]
    fn test_to_mime() {
        let mut email = EmailMessage::new("Report", "See attached", "a@example.com", vec!["b@example.com".into()])
            .with_html_body("<b>See attached</b>")
            .with_attachment(Attachment::new("r.csv", b"a,b".to_vec(), "text/csv"));
        email.headers.insert("X-Campaign".into(), "spring".into());
        email.bcc.push("hidden@example.com".into());

        let mime = email.to_mime().unwrap();
        assert_eq!(mime.envelope().to().len(), 2);
        let raw = String::from_utf8(mime.formatted()).unwrap();
        assert!(raw.contains("Subject: Report"));
        assert!(raw.contains("X-Campaign: spring"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("filename=\"r.csv\""));
        assert!(!raw.contains("hidden@example.com"));
    }

    #[test]
    fn test_to_mime_rejects_bad_address() {
        let email = EmailMessage::new("s", "b", "not an address", vec!["b@example.com".into()]);
        assert!(matches!(email.to_mime(), Err(CoreError::BadRequest(_))));
    }

    #[test]
    fn test_html_body_absent() {
        let email = EmailMessage::new("s", "b", "f@example.com", vec![])
            .with_alternative("{}", "application/json");
        assert_eq!(email.html_body(), None);
    }
}
