//! Minimal SMTP handshake used to test mailbox acceptance without sending mail.
//!
//! The probe connects to a mail exchanger, reads the greeting, introduces
//! itself, and issues `MAIL FROM` and `RCPT TO`. A 2xx answer to `RCPT TO`
//! reads as deliverable. The whole exchange, including connection setup and
//! the closing `QUIT`, runs inside one deadline; dropping the stream on any
//! exit path closes the socket.

use crate::models::email::{ProbeFailureKind, SmtpCheck};
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, instrument};

/// Longest reply line accepted before the server is treated as misbehaving.
const MAX_LINE_LEN: usize = 2048;
/// Most continuation lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 128;
/// Upper bound on waiting for the server's `221` after `QUIT`.
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Checks whether a mail exchanger accepts a recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailboxProbe: Send + Sync {
    /// Never fails: every error is folded into an unsuccessful [`SmtpCheck`],
    /// and the call returns within `timeout` (plus scheduling slack).
    async fn probe(&self, mx_host: &str, candidate: &str, timeout: Duration) -> SmtpCheck;
}

/// A failed probe, classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProbeError {
    pub kind: ProbeFailureKind,
    pub message: String,
    pub code: Option<u16>,
}

impl ProbeError {
    fn new(kind: ProbeFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    fn rejected(stage: &str, reply: &SmtpReply) -> Self {
        Self {
            kind: ProbeFailureKind::Rejected,
            message: format!("{} rejected: {} {}", stage, reply.code, reply.text()),
            code: Some(reply.code),
        }
    }

    fn timeout(budget: Duration) -> Self {
        Self::new(
            ProbeFailureKind::Timeout,
            format!("SMTP probe timed out after {}ms", budget.as_millis()),
        )
    }

    fn protocol(message: impl Into<String>) -> Self {
        Self::new(ProbeFailureKind::ProtocolError, message)
    }

    fn io(stage: &str, err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::TimedOut => ProbeFailureKind::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => ProbeFailureKind::ConnectionRefused,
            _ => ProbeFailureKind::ProtocolError,
        };
        Self::new(kind, format!("{}: {}", stage, err))
    }
}

impl From<ProbeError> for SmtpCheck {
    fn from(err: ProbeError) -> Self {
        SmtpCheck::failed(err.kind, err.message, err.code)
    }
}

/// A complete (possibly multi-line) server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Command/reply exchange over any byte stream.
pub struct SmtpSession<S> {
    stream: BufReader<S>,
    greeted: bool,
    last_code: Option<u16>,
}

impl<S> SmtpSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            greeted: false,
            last_code: None,
        }
    }

    /// Whether the server greeting has been read, i.e. `QUIT` is meaningful.
    pub fn greeted(&self) -> bool {
        self.greeted
    }

    pub fn last_code(&self) -> Option<u16> {
        self.last_code
    }

    pub async fn read_reply(&mut self) -> Result<SmtpReply, ProbeError> {
        let mut lines = Vec::new();
        let mut code = None;

        loop {
            let mut raw = String::new();
            let read = (&mut self.stream)
                .take(MAX_LINE_LEN as u64 + 1)
                .read_line(&mut raw)
                .await
                .map_err(|e| ProbeError::io("read", e))?;
            if read == 0 {
                return Err(ProbeError::protocol("connection closed by server"));
            }
            if raw.len() > MAX_LINE_LEN {
                return Err(ProbeError::protocol("reply line too long"));
            }

            let line = raw.trim_end_matches(['\r', '\n']);
            let (line_code, more, text) = parse_reply_line(line)?;
            match code {
                None => code = Some(line_code),
                Some(c) if c != line_code => {
                    return Err(ProbeError::protocol(format!(
                        "inconsistent reply codes {} and {}",
                        c, line_code
                    )));
                }
                Some(_) => {}
            }
            lines.push(text.to_string());

            if !more {
                break;
            }
            if lines.len() >= MAX_REPLY_LINES {
                return Err(ProbeError::protocol("reply has too many lines"));
            }
        }

        let code = code.unwrap_or_default();
        self.last_code = Some(code);
        Ok(SmtpReply { code, lines })
    }

    pub async fn send_command(&mut self, command: &str) -> Result<(), ProbeError> {
        let stream = self.stream.get_mut();
        stream
            .write_all(format!("{}\r\n", command).as_bytes())
            .await
            .map_err(|e| ProbeError::io("write", e))?;
        stream.flush().await.map_err(|e| ProbeError::io("write", e))
    }

    async fn command(&mut self, command: &str) -> Result<SmtpReply, ProbeError> {
        self.send_command(command).await?;
        self.read_reply().await
    }

    /// Greeting, `EHLO` (or `HELO`), `MAIL FROM`, `RCPT TO`.
    ///
    /// Returns the `RCPT TO` reply when it is 2xx.
    pub async fn handshake(
        &mut self,
        helo: &str,
        sender: &str,
        recipient: &str,
    ) -> Result<SmtpReply, ProbeError> {
        let greeting = self.read_reply().await?;
        self.greeted = true;
        if !greeting.is_positive() {
            return Err(ProbeError::rejected("Greeting", &greeting));
        }

        let ehlo = self.command(&format!("EHLO {}", helo)).await?;
        if !ehlo.is_positive() {
            if !ehlo.is_permanent_failure() {
                return Err(ProbeError::rejected("EHLO", &ehlo));
            }
            let helo_reply = self.command(&format!("HELO {}", helo)).await?;
            if !helo_reply.is_positive() {
                return Err(ProbeError::rejected("HELO", &helo_reply));
            }
        }

        let mail = self.command(&format!("MAIL FROM:<{}>", sender)).await?;
        if !mail.is_positive() {
            return Err(ProbeError::rejected("MAIL FROM", &mail));
        }

        let rcpt = self.command(&format!("RCPT TO:<{}>", recipient)).await?;
        if !rcpt.is_positive() {
            return Err(ProbeError::rejected("RCPT TO", &rcpt));
        }

        Ok(rcpt)
    }

    /// Sends `QUIT` and waits for the server's answer. Errors are irrelevant
    /// at this point and discarded.
    pub async fn quit(&mut self) {
        if self.send_command("QUIT").await.is_ok() {
            let _ = self.read_reply().await;
        }
    }
}

/// Splits `250-text` / `250 text` / `250` into code, continuation flag and text.
fn parse_reply_line(line: &str) -> Result<(u16, bool, &str), ProbeError> {
    let code = line
        .get(..3)
        .filter(|c| c.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|c| c.parse::<u16>().ok())
        .filter(|c| (200..600).contains(c))
        .ok_or_else(|| ProbeError::protocol(format!("malformed reply: {:?}", line)))?;

    match line.as_bytes().get(3) {
        None => Ok((code, false, "")),
        Some(b' ') => Ok((code, false, &line[4..])),
        Some(b'-') => Ok((code, true, &line[4..])),
        Some(_) => Err(ProbeError::protocol(format!("malformed reply: {:?}", line))),
    }
}

/// Identity and target port used by [`SmtpProbe`].
#[derive(Debug, Clone)]
pub struct SmtpProbeConfig {
    pub port: u16,
    /// Fixed `MAIL FROM` address owned by the operator.
    pub sender: String,
    pub helo: String,
}

impl Default for SmtpProbeConfig {
    fn default() -> Self {
        Self {
            port: 25,
            sender: "verify@example.com".to_string(),
            helo: "localhost".to_string(),
        }
    }
}

/// [`MailboxProbe`] speaking SMTP over TCP.
#[derive(Debug, Clone, Default)]
pub struct SmtpProbe {
    config: SmtpProbeConfig,
}

impl SmtpProbe {
    pub fn new(config: SmtpProbeConfig) -> Self {
        Self { config }
    }

    async fn run(
        &self,
        mx_host: &str,
        candidate: &str,
        budget: Duration,
        deadline: Instant,
    ) -> Result<SmtpReply, ProbeError> {
        if candidate.contains(['\r', '\n']) || mx_host.is_empty() {
            return Err(ProbeError::protocol("refusing to probe a malformed address"));
        }

        let stream = timeout_at(deadline, TcpStream::connect((mx_host, self.config.port)))
            .await
            .map_err(|_| ProbeError::timeout(budget))?
            .map_err(|e| {
                let mut err = ProbeError::io("connect", e);
                if err.kind == ProbeFailureKind::ProtocolError {
                    err.kind = ProbeFailureKind::ConnectionRefused;
                }
                err
            })?;

        let mut session = SmtpSession::new(stream);
        let outcome = timeout_at(
            deadline,
            session.handshake(&self.config.helo, &self.config.sender, candidate),
        )
        .await
        .unwrap_or_else(|_| Err(ProbeError::timeout(budget)));
        let last_code = session.last_code();

        if session.greeted() {
            let grace = deadline.min(Instant::now() + QUIT_GRACE);
            if timeout_at(grace, session.quit()).await.is_err() {
                debug!(mx_host, "QUIT not acknowledged, closing connection");
            }
        }

        outcome.map_err(|mut e| {
            if e.code.is_none() {
                e.code = last_code;
            }
            e
        })
    }
}

#[async_trait]
impl MailboxProbe for SmtpProbe {
    #[instrument(skip(self, candidate), fields(port = self.config.port))]
    async fn probe(&self, mx_host: &str, candidate: &str, timeout: Duration) -> SmtpCheck {
        let deadline = Instant::now() + timeout;
        match self.run(mx_host, candidate, timeout, deadline).await {
            Ok(reply) => SmtpCheck::deliverable(
                format!(
                    "Mailbox appears deliverable at {}; acceptance does not guarantee final delivery",
                    mx_host
                ),
                reply.code,
            ),
            Err(e) => {
                debug!(mx_host, kind = ?e.kind, error = %e, "SMTP probe failed");
                e.into()
            }
        }
    }
}
