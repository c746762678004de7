//! SMTP delivery against a minimal in-process relay.

use django_core_mail::{EmailBackend, EmailMessage, SmtpBackend};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accepts one connection, answers the SMTP dialogue and returns every
/// command line plus the DATA payload.
async fn relay() -> (u16, JoinHandle<(Vec<String>, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut commands = Vec::new();
        let mut data = String::new();

        write.write_all(b"220 relay ready\r\n").await.unwrap();
        while let Some(line) = lines.next_line().await.unwrap() {
            let verb = line.split_whitespace().next().unwrap_or("").to_uppercase();
            commands.push(line.clone());
            match verb.as_str() {
                "DATA" => {
                    write.write_all(b"354 go ahead\r\n").await.unwrap();
                    while let Some(body_line) = lines.next_line().await.unwrap() {
                        if body_line == "." {
                            break;
                        }
                        data.push_str(&body_line);
                        data.push('\n');
                    }
                    write.write_all(b"250 queued\r\n").await.unwrap();
                }
                "QUIT" => {
                    write.write_all(b"221 bye\r\n").await.unwrap();
                    break;
                }
                _ => write.write_all(b"250 ok\r\n").await.unwrap(),
            }
        }
        (commands, data)
    });
    (port, handle)
}

#[tokio::test]
async fn test_smtp_delivers_to_relay() {
    let (port, handle) = relay().await;
    let mut email = EmailMessage::new(
        "Shipped",
        "Your order shipped",
        "shop@example.com",
        vec!["bo@example.com".into()],
    )
    .with_html_body("<p>Your order shipped</p>");
    email.bcc.push("audit@example.com".into());

    let smtp = SmtpBackend::new("127.0.0.1", port);
    assert_eq!(smtp.send_messages(&[email]).await.unwrap(), 1);

    let (commands, data) = handle.await.unwrap();
    assert!(commands.iter().any(|c| c.starts_with("MAIL FROM:<shop@example.com>")));
    assert!(commands.iter().any(|c| c.starts_with("RCPT TO:<bo@example.com>")));
    assert!(commands.iter().any(|c| c.starts_with("RCPT TO:<audit@example.com>")));
    assert!(data.contains("Subject: Shipped"));
    assert!(data.contains("Your order shipped"));
    assert!(data.contains("text/html"));
    assert!(!data.contains("audit@example.com"));
}
