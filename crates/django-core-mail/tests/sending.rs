use django_core_common::error::CoreError;
use django_core_common::settings::CoreSettings;
use django_core_mail::{
    markdown_to_html, register_templates, send_email_from_template, send_emails_from_template,
    Attachment, EmailBackend, EmailMessage, InMemoryBackend, TemplateEmail,
};

fn engine() -> tera::Tera {
    let mut tera = tera::Tera::default();
    register_templates(&mut tera).unwrap();
    tera.add_raw_templates(vec![
        ("welcome.txt", "Hello {{ name }}"),
        ("welcome.html", "<h1>Hello {{ name }}</h1>"),
        (
            "notice.md",
            "Dear {{ name }},\n\nYour order **shipped**.\n\n- [track](https://example.com/t)",
        ),
    ])
    .unwrap();
    tera
}

#[tokio::test]
async fn test_one_message_per_recipient() {
    let backend = InMemoryBackend::new();
    let email = TemplateEmail::text_and_html("Welcome", "welcome.txt", "welcome.html")
        .insert("name", "Ann")
        .attachment(Attachment::new("logo.png", vec![1, 2, 3], "image/png"));
    let settings = CoreSettings::default();

    let sent = send_emails_from_template(
        &["a@example.com", "b@example.com"],
        &email,
        &engine(),
        &settings,
        &backend,
    )
    .await
    .unwrap();
    assert_eq!(sent, 2);

    let outbox = backend.outbox().await;
    assert_eq!(outbox[0].to, vec!["a@example.com"]);
    assert_eq!(outbox[1].to, vec!["b@example.com"]);
    for message in &outbox {
        assert_eq!(message.subject, "Welcome");
        assert_eq!(message.from_email, settings.default_from_email);
        assert_eq!(message.body, "Hello Ann");
        assert_eq!(message.html_body(), Some("<h1>Hello Ann</h1>"));
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.mixed_subtype, "related");
    }
}

#[tokio::test]
async fn test_empty_recipient_list_is_a_noop() {
    let backend = InMemoryBackend::new();
    let email = TemplateEmail::text_and_html("s", "missing.txt", "missing.html");
    let to: [&str; 0] = [];
    let sent = send_emails_from_template(&to, &email, &engine(), &CoreSettings::default(), &backend)
        .await
        .unwrap();
    assert_eq!(sent, 0);
    assert!(backend.is_empty().await);
}

#[tokio::test]
async fn test_markdown_email() {
    let backend = InMemoryBackend::new();
    let email = TemplateEmail::markdown("Shipped", "notice.md")
        .from_email("shop@example.com")
        .insert("name", "Bo");

    send_email_from_template("bo@example.com", &email, &engine(), &CoreSettings::default(), &backend)
        .await
        .unwrap();

    let message = &backend.outbox().await[0];
    assert_eq!(message.from_email, "shop@example.com");
    assert_eq!(
        message.body,
        "Dear Bo,\n\nYour order **shipped**.\n\n- [track](https://example.com/t)"
    );
    let html = message.html_body().unwrap();
    assert!(html.contains("<p>Dear Bo,</p>"));
    assert!(html.contains("<p>Your order <strong>shipped</strong>.</p>"));
    assert!(html.contains("<li><a href=\"https://example.com/t\">track</a></li>"));
    assert!(html.starts_with("<!DOCTYPE html>"));
}

#[tokio::test]
async fn test_missing_template_is_a_template_error() {
    let email = TemplateEmail::text_and_html("s", "nope.txt", "welcome.html");
    let err = send_email_from_template(
        "a@example.com",
        &email,
        &engine(),
        &CoreSettings::default(),
        &InMemoryBackend::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::TemplateError(_)));
}

#[test]
fn test_markdown_to_html() {
    assert_eq!(markdown_to_html("**x**"), "<p><strong>x</strong></p>\n");
    assert_eq!(markdown_to_html("# Hi\n"), "<h1>Hi</h1>\n");
}

struct Broken;

#[async_trait::async_trait]
impl EmailBackend for Broken {
    async fn send(&self, _message: &EmailMessage) -> django_core_common::CoreResult<()> {
        Err(CoreError::InternalServerError("relay down".into()))
    }
}

#[tokio::test]
async fn test_fail_silently() {
    let email = TemplateEmail::text_and_html("s", "welcome.txt", "welcome.html");
    let settings = CoreSettings::default();
    assert!(
        send_email_from_template("a@example.com", &email, &engine(), &settings, &Broken)
            .await
            .is_err()
    );

    let quiet = email.fail_silently();
    let sent = send_email_from_template("a@example.com", &quiet, &engine(), &settings, &Broken)
        .await
        .unwrap();
    assert_eq!(sent, 0);
}
