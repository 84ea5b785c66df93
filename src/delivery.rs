use std::fs;
use std::path::PathBuf;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, SmtpTransport, Transport};

use crate::config::SmtpConfig;
use crate::email::Message;
use crate::error::Error;

/// Consumes a finished message; the HTML is passed through untouched
pub trait Deliver {
    fn deliver(&self, message: &Message) -> Result<(), Error>;
}

/// Writes the HTML to `path` and the plain-text part beside it as `.md`
pub struct FileDelivery {
    path: PathBuf,
}

impl FileDelivery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn text_path(&self) -> PathBuf {
        self.path.with_extension("md")
    }
}

impl Deliver for FileDelivery {
    fn deliver(&self, message: &Message) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &message.html)?;
        let text_path = self.text_path();
        fs::write(&text_path, &message.text)?;
        tracing::info!(
            subject = %message.subject,
            html = %self.path.display(),
            text = %text_path.display(),
            "briefing delivered"
        );
        Ok(())
    }
}

/// Sends the message as a plain-text + HTML alternative over SMTP
pub struct SmtpDelivery {
    host: String,
    port: u16,
    credentials: Credentials,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl std::fmt::Debug for SmtpDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpDelivery")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl SmtpDelivery {
    /// Build from config, letting process environment variables win.
    pub fn from_env(config: &SmtpConfig) -> Result<Self, Error> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Build from config and a variable lookup.
    pub fn from_lookup(
        config: &SmtpConfig,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let host = var("SMTP_HOST").unwrap_or_else(|| config.host.clone());
        if host.is_empty() {
            return Err(Error::MissingEnv("SMTP_HOST"));
        }
        let port = match var("SMTP_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::InvalidEnv {
                    name: "SMTP_PORT",
                    value,
                })?,
            None => config.port,
        };
        let user = var("SMTP_USER").ok_or(Error::MissingEnv("SMTP_USER"))?;
        let pass = var("SMTP_PASS").ok_or(Error::MissingEnv("SMTP_PASS"))?;

        let from = var("FROM_EMAIL").unwrap_or_else(|| config.from.clone());
        if from.is_empty() {
            return Err(Error::MissingEnv("FROM_EMAIL"));
        }
        let address: Address = from.trim().parse()?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let to = match var("TO_EMAILS") {
            Some(list) => parse_recipients(&list),
            None => config.to.clone(),
        };
        if to.is_empty() {
            return Err(Error::NoRecipients);
        }
        let to = to
            .iter()
            .map(|address| address.parse::<Mailbox>())
            .collect::<Result<Vec<Mailbox>, _>>()?;

        Ok(Self {
            host,
            port,
            credentials: Credentials::new(user, pass),
            from,
            to,
        })
    }

    /// Implicit TLS on 465, STARTTLS otherwise
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }

    pub fn email(&self, message: &Message) -> Result<lettre::Message, Error> {
        let builder = lettre::Message::builder()
            .from(self.from.clone())
            .subject(message.subject.as_str());
        let builder = self
            .to
            .iter()
            .cloned()
            .fold(builder, |builder, to| builder.to(to));
        let email = builder.multipart(MultiPart::alternative_plain_html(
            message.text.clone(),
            message.html.clone(),
        ))?;
        Ok(email)
    }

    fn transport(&self) -> Result<SmtpTransport, Error> {
        let builder = if self.implicit_tls() {
            SmtpTransport::relay(&self.host)?
        } else {
            SmtpTransport::starttls_relay(&self.host)?
        };
        Ok(builder
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }
}

impl Deliver for SmtpDelivery {
    fn deliver(&self, message: &Message) -> Result<(), Error> {
        let email = self.email(message)?;
        let transport = self.transport()?;

        if !transport.test_connection()? {
            return Err(Error::SmtpUnverified {
                host: self.host.clone(),
            });
        }
        tracing::info!(host = %self.host, port = self.port, "SMTP connection verified");

        transport.send(&email)?;
        let recipients: Vec<String> = self.to.iter().map(ToString::to_string).collect();
        tracing::info!(
            subject = %message.subject,
            to = %recipients.join(", "),
            "briefing sent"
        );
        Ok(())
    }
}

/// Split a comma-separated address list, dropping blanks
pub fn parse_recipients(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(String::from)
        .collect()
}
