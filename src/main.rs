use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use briefing::delivery::{Deliver, FileDelivery, SmtpDelivery};
use briefing::email::{Message, render_email};
use briefing::prompt::{BriefingDates, DEFAULT_TEMPLATE, build_prompt};
use briefing::source::{AnthropicSource, FileSource, Source};
use briefing::{Config, StyleConfig, markdown_to_html_with_config};

#[derive(Parser)]
#[command(name = "briefing")]
#[command(about = "Turn a markdown briefing into a styled HTML email")]
struct Cli {
    /// Config file; built-in defaults are used when it does not exist
    #[arg(short, long, global = true, default_value = "briefing.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a Markdown file to HTML
    Render {
        /// Input Markdown file, or `-` for stdin
        input: PathBuf,

        /// Output HTML file (defaults to input name with .html extension, stdout for stdin)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Wrap the fragment in the full email document
        #[arg(long)]
        email: bool,

        /// Emit structural markup without element styles
        #[arg(long)]
        unstyled: bool,
    },
    /// Fetch today's briefing, render it and email it
    Run {
        /// Write the HTML (and a .md text part) here instead of sending over SMTP
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the prompt `run` would send
    Prompt,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Render {
            input,
            output,
            email,
            unstyled,
        } => render(&config, &input, output, email, unstyled),
        Command::Run { output } => run(&config, output),
        Command::Prompt => {
            let dates = BriefingDates::today(config.briefing.cutoff_days);
            println!("{}", build_prompt(&prompt_template(&config)?, &dates));
            Ok(())
        }
    }
}

fn prompt_template(config: &Config) -> Result<String> {
    match &config.briefing.prompt_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading prompt template {}", path.display())),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

fn render(
    config: &Config,
    input: &Path,
    output: Option<PathBuf>,
    email: bool,
    unstyled: bool,
) -> Result<()> {
    let markdown = FileSource::new(input)
        .fetch()
        .with_context(|| format!("reading {}", input.display()))?;

    let mut config = config.clone();
    if unstyled {
        config.style = StyleConfig::unstyled();
    }

    let fragment = markdown_to_html_with_config(&markdown, &config);
    let html = if email {
        let dates = BriefingDates::today(config.briefing.cutoff_days);
        render_email(&fragment, &config.email, &dates)
    } else {
        fragment
    };

    let from_stdin = input.as_os_str() == "-";
    let output = match output {
        Some(path) => path,
        None if from_stdin => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            writeln!(stdout)?;
            return Ok(());
        }
        None => input.with_extension("html"),
    };

    fs::write(&output, html).with_context(|| format!("writing {}", output.display()))?;
    println!("Created {}", output.display());
    Ok(())
}

fn run(config: &Config, output: Option<PathBuf>) -> Result<()> {
    // Settle delivery before spending an API call
    let delivery: Box<dyn Deliver> = match output {
        Some(path) => Box::new(FileDelivery::new(path)),
        None => Box::new(SmtpDelivery::from_env(&config.smtp).context("configuring SMTP")?),
    };

    let dates = BriefingDates::today(config.briefing.cutoff_days);
    let prompt = build_prompt(&prompt_template(config)?, &dates);

    let source = AnthropicSource::from_env(config.briefing.clone(), prompt)?;
    let markdown = source.fetch().context("fetching briefing")?;

    let fragment = markdown_to_html_with_config(&markdown, config);
    let message = Message::new(&markdown, &fragment, &config.email, &dates);

    delivery.deliver(&message).context("delivering briefing")?;
    Ok(())
}
