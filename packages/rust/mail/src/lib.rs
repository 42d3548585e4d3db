//! SMTP mail dispatch via `lettre`.
//!
//! Each send opens a STARTTLS session to the configured relay, logs in with
//! the sender's credentials and delivers one `multipart/mixed` message: a
//! plain-text body plus the rendered artifact as an attachment.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, instrument};

use askmail_core::MailDispatcher;
use askmail_shared::{Artifact, AskmailError, MailSettings, PLACEHOLDER_CREDENTIALS, Result};

/// Sender identity and relay, all present and non-placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Login<'a> {
    sender: &'a str,
    secret: &'a str,
    host: &'a str,
    port: u16,
}

fn login(settings: &MailSettings) -> Result<Login<'_>> {
    let sender = present("sender address", settings.sender.as_deref())?;
    let secret = present("sender secret", settings.secret.as_deref())?;
    let host = present("SMTP host", settings.host.as_deref())?;
    let port = settings
        .port
        .ok_or_else(|| AskmailError::CredentialsMissing("SMTP port".into()))?;

    Ok(Login {
        sender,
        secret,
        host,
        port,
    })
}

fn present<'a>(what: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        None | Some("") => Err(AskmailError::CredentialsMissing(what.to_string())),
        Some(v) if PLACEHOLDER_CREDENTIALS.contains(&v) => Err(AskmailError::CredentialsMissing(
            format!("{what} is still the placeholder {v:?}"),
        )),
        Some(v) => Ok(v),
    }
}

/// Assemble the outgoing message. Bad addresses or MIME types are
/// transport errors.
fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
    attachment: &Artifact,
    content: Vec<u8>,
) -> Result<Message> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| AskmailError::Transport(format!("invalid sender address {from:?}: {e}")))?;
    let to: Mailbox = to
        .parse()
        .map_err(|e| AskmailError::Transport(format!("invalid recipient address {to:?}: {e}")))?;
    let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
        AskmailError::Transport(format!(
            "invalid content type {:?}: {e}",
            attachment.content_type
        ))
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(
                    Attachment::new(attachment.file_name.clone()).body(content, content_type),
                ),
        )
        .map_err(|e| AskmailError::Transport(format!("build message: {e}")))
}

async fn read_attachment(attachment: &Artifact) -> Result<Vec<u8>> {
    match tokio::fs::read(attachment.path()).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AskmailError::AttachmentNotFound {
                path: attachment.path().to_path_buf(),
            })
        }
        Err(e) => Err(AskmailError::io(attachment.path(), e)),
    }
}

/// [`MailDispatcher`] backed by an SMTP relay.
pub struct SmtpDispatcher {
    settings: MailSettings,
}

impl SmtpDispatcher {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl MailDispatcher for SmtpDispatcher {
    #[instrument(skip_all, fields(to = %to))]
    async fn send(&self, to: &str, subject: &str, body: &str, attachment: &Artifact) -> Result<()> {
        let login = login(&self.settings)?;
        let content = read_attachment(attachment).await?;
        debug!(bytes = content.len(), file = %attachment.file_name, "attachment loaded");

        let message = build_message(login.sender, to, subject, body, attachment, content)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(login.host)
            .map_err(|e| AskmailError::Transport(format!("{}: {e}", login.host)))?
            .port(login.port)
            .credentials(Credentials::new(
                login.sender.to_string(),
                login.secret.to_string(),
            ))
            .build();

        let response = transport
            .send(message)
            .await
            .map_err(|e| AskmailError::Transport(format!("{}:{}: {e}", login.host, login.port)))?;

        info!(code = %response.code(), host = login.host, "mail accepted by relay");
        Ok(())
    }
}
