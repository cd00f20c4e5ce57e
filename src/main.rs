use dotenvy::dotenv;
use line_command_bot::bot::{Dispatcher, LineReplyClient, ReplySender};
use line_command_bot::commands::default_registry;
use line_command_bot::config::Settings;
use line_command_bot::server::{self, AppState};
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    bearer: Regex,
    access_token: Regex,
    api_key_param: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bearer: Regex::new(r"(?i)(bearer\s+)[A-Za-z0-9+/=._-]+")?,
            access_token: Regex::new(r"(ACCESS_TOKEN=)[^\s&]+")?,
            api_key_param: Regex::new(r#"([?&]key=)[^&\s"]+"#)?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self.bearer.replace_all(&output, "${1}[MASKED]").to_string();
        output = self
            .access_token
            .replace_all(&output, "${1}[MASKED]")
            .to_string();
        output = self
            .api_key_param
            .replace_all(&output, "${1}[MASKED]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length; the redacted text may differ in size.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);
    init_logging(patterns);

    info!("Starting LINE command bot...");

    let settings = init_settings();

    let registry = default_registry(&settings)?;
    info!(
        commands = ?registry.iter().map(|c| c.name()).collect::<Vec<_>>(),
        "Command registry built"
    );

    let sender: Arc<dyn ReplySender> = Arc::new(LineReplyClient::new(
        &settings.line_reply_url,
        &settings.access_token,
        settings.http_timeout(),
    ));
    let state = Arc::new(AppState::new(
        Dispatcher::new(Arc::new(registry)),
        sender,
    ));

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("Webhook listening on {}", listener.local_addr()?);

    server::serve(listener, state).await?;
    info!("Shutdown complete");
    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Settings {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}
