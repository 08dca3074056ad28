//! ECG Monitor CLI
//!
//! Command-line client for the ECG backend:
//! - Log in and register
//! - Watch the live display state
//! - Export the current chart

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecg_monitor::auth::{self, LoginOutcome};
use ecg_monitor::chart::{time_label, ChartLayout};
use ecg_monitor::config::{generate_default_config, Config, LoggingConfig};
use ecg_monitor::export::{render_svg, write_csv, ExportFormat};
use ecg_monitor::{
    Credentials, DisplayState, EcgClient, FileSessionStore, Locale, MessageId, Poller,
    SessionStore,
};

#[derive(Parser)]
#[command(name = "ecg-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Watch ECG samples from the monitoring backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Message language (ru, en)
    #[arg(long, global = true)]
    pub locale: Option<Locale>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        login: String,
        #[arg(short, long)]
        password: String,
    },

    /// Register a new account
    Register {
        login: String,
        #[arg(short, long)]
        password: String,
    },

    /// Poll the backend and print each update until interrupted
    Watch,

    /// Fetch once and export the chart
    Export {
        /// Output format (svg, csv)
        #[arg(short, long, default_value = "svg")]
        format: ExportFormat,
        /// Output file (default: ecg-chart.<format>; "-" for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(locale) = cli.locale {
        config.ui.locale = locale;
    }

    init_logging(&config.logging);

    let locale = config.ui.locale;
    let store = FileSessionStore::new(&config.session.path);

    match cli.command {
        Commands::Login { login, password } => {
            let client = EcgClient::new(&config.api.base_url)?;
            let outcome = auth::login(&client, &store, &Credentials::new(login, password)).await?;

            match outcome {
                LoginOutcome::LoggedIn(session) => {
                    println!(
                        "Logged in (user_id {}), session saved to {}",
                        session.user_id,
                        store.path().display()
                    );
                }
                LoginOutcome::Rejected(id) => {
                    eprintln!("{}", id.text(locale));
                    std::process::exit(1);
                }
            }
        }

        Commands::Register { login, password } => {
            let client = EcgClient::new(&config.api.base_url)?;
            let outcome = auth::register(&client, &Credentials::new(login, password)).await;

            let notice = outcome.notice();
            if outcome.redirect().is_some() {
                println!("{}", notice.text(locale));
            } else {
                eprintln!("{}", notice.text(locale));
                std::process::exit(1);
            }
        }

        Commands::Watch => {
            let client = EcgClient::new(&config.api.base_url)?;
            let threshold = config.poll.warning_threshold;
            let handle = Poller::new(client, store.load()?, config.poll.poll_config()).start();
            let mut updates = handle.subscribe();

            println!("{}", MessageId::Loading.text(locale));

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = updates.borrow_and_update().clone();
                        print_state(&state, threshold, locale);
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            handle.stop().await;
        }

        Commands::Export { format, output } => {
            let client = EcgClient::new(&config.api.base_url)?;
            let poller = Poller::new(client, store.load()?, config.poll.poll_config());

            let state = poller.tick().await;
            let Some(frame) = state.frame() else {
                if let Some(id) = state.placeholder() {
                    eprintln!("{}", id.text(locale));
                }
                std::process::exit(1);
            };

            let mut content = Vec::new();
            match format {
                ExportFormat::Svg => {
                    let svg = render_svg(
                        frame,
                        &ChartLayout::default(),
                        config.poll.warning_threshold,
                        locale,
                    );
                    content.extend_from_slice(svg.as_bytes());
                }
                ExportFormat::Csv => write_csv(frame, &mut content)?,
            }

            let output = output.unwrap_or_else(|| PathBuf::from(format.file_name()));
            if output.as_os_str() == "-" {
                use std::io::Write;
                std::io::stdout().write_all(&content)?;
            } else {
                std::fs::write(&output, content)?;
                println!("Exported {} samples to {}", frame.len(), output.display());
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &config)?;
                println!("Config written to {}", path.display());
            } else {
                print!("{}", config);
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("ecg_monitor={},ecg_cli={}", config.level, config.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_state(state: &DisplayState, threshold: f64, locale: Locale) {
    let now = chrono::Local::now().format("%H:%M:%S");

    let Some(frame) = state.frame() else {
        if let Some(id) = state.placeholder() {
            println!("[{}] {}", now, id.text(locale));
        }
        return;
    };

    let latest = frame
        .latest()
        .map(|s| format!("{:.3} @ {}", s.ecg_signal, time_label(&s.timestamp)))
        .unwrap_or_default();

    println!(
        "[{}] {} samples, latest {}, axis [{:.2}, {:.2}]",
        now,
        frame.len(),
        latest,
        frame.y_bounds.min,
        frame.y_bounds.max,
    );
    println!("    {}", sparkline(frame.samples.iter().map(|s| s.ecg_signal)));

    if frame.warning {
        println!(
            "    !! {} (> {}) | {}: tel:112",
            MessageId::ThresholdWarning.text(locale),
            threshold,
            MessageId::EmergencyCall.text(locale),
        );
    }
}

/// One-line block-character rendering of the most recent values
fn sparkline(values: impl Iterator<Item = f64>) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    const WIDTH: usize = 60;

    let values: Vec<f64> = values.collect();
    let tail = &values[values.len().saturating_sub(WIDTH)..];

    let (min, max) = tail
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = max - min;

    tail.iter()
        .map(|v| {
            if span <= 0.0 {
                BARS[BARS.len() / 2]
            } else {
                let idx = ((v - min) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            }
        })
        .collect()
}
