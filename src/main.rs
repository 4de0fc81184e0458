//! ETF Arb Trader - Main Entry Point
//!
//! Feeds a JSON-lines gateway event stream through the trading core and
//! writes the resulting commands to stdout, one JSON object per line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use etf_arb_trader::config::Config;
use etf_arb_trader::gateway::{
    pump_events, write_commands, ChannelGateway, GatewayEvent, JsonLinesSource,
};
use etf_arb_trader::AutoTrader;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Inbound events buffered between the reader task and the core.
const EVENT_QUEUE_DEPTH: usize = 1024;

/// ETF Arb Trader CLI
#[derive(Parser)]
#[command(name = "etf-arb-trader")]
#[command(version, about = "ETF/Future arbitrage with immediate futures hedging")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trader over a JSON-lines event stream
    Run {
        /// Event file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        events: String,
    },

    /// Print the effective configuration and exit
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logging()?;

    let config = Config::load()?;
    config.validate()?;

    match cli.command {
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Run { events }) => run(config, &events).await,
        None => run(config, "-").await,
    }
}

/// Wire the event source, the single core worker and the command writer.
async fn run(config: Config, events: &str) -> Result<()> {
    info!(
        "ETF Arb Trader v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    log_config(&config);

    let (event_tx, mut event_rx) = mpsc::channel::<GatewayEvent>(EVENT_QUEUE_DEPTH);
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let writer = tokio::spawn(write_commands(command_rx, tokio::io::stdout()));

    let reader = if events == "-" {
        info!("Reading events from stdin");
        let source = JsonLinesSource::new(BufReader::new(tokio::io::stdin()));
        tokio::spawn(pump_events(source, event_tx))
    } else {
        info!(path = %events, "Reading events from file");
        let file = tokio::fs::File::open(events)
            .await
            .with_context(|| format!("Failed to open event file: {}", events))?;
        let source = JsonLinesSource::new(BufReader::new(file));
        tokio::spawn(pump_events(source, event_tx))
    };

    let mut trader = AutoTrader::new(&config, ChannelGateway::new(command_tx));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut hold_off = HoldOffSignal::new()?;

    // Single consumer: every event is fully handled before the next is read
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = hold_off.recv() => {
                info!("Hold-off signal received");
                trader.hold_off();
            }
            event = event_rx.recv() => match event {
                Some(event) => trader.handle_event(event),
                None => {
                    info!("Event stream ended");
                    break;
                }
            },
        }
    }

    let stats = trader.stats().clone();
    info!(
        position = trader.position(),
        net_delta = trader.ledger().net_delta(),
        open_orders = trader.registry().len(),
        "Final state"
    );

    // Dropping the trader closes the command channel so the writer can finish
    drop(trader);
    reader.abort();

    match writer.await {
        Ok(Ok(written)) => info!(written, "Command stream flushed"),
        Ok(Err(e)) => error!(error = %e, "Command writer failed"),
        Err(e) => error!(error = %e, "Command writer task panicked"),
    }

    info!(uptime_secs = stats.uptime_secs(), "SESSION_SUMMARY: {}", stats.to_json());
    Ok(())
}

/// Operator request to stop trading until the next own fill (SIGUSR1).
struct HoldOffSignal {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
}

impl HoldOffSignal {
    #[cfg(unix)]
    fn new() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        let inner = signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;
        Ok(Self { inner })
    }

    #[cfg(not(unix))]
    fn new() -> Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        if self.inner.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        std::future::pending::<()>().await
    }
}

/// Initialize logging to stderr and a rolling file. stdout carries commands.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // File appender for detailed logs
    let file_appender = tracing_appender::rolling::hourly("logs", "etf-arb-trader.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep it alive for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("etf_arb_trader=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stderr.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .init();

    Ok(())
}

/// Log configuration on startup.
fn log_config(config: &Config) {
    info!("Configuration:");
    info!("   Tick Size: {}", config.trading.tick_size);
    info!("   Min Edge: {}", config.trading.min_edge);
    info!("   Max Order Volume: {}", config.trading.max_order_volume);
    info!(
        "   Hedge Prices: sell @ {}, buy @ {}",
        config.trading.min_bid_nearest_tick(),
        config.trading.max_ask_nearest_tick()
    );
    info!("   Position Threshold: {}", config.risk.position_threshold);
    info!(
        "   Max Outstanding Orders: {}",
        config.risk.max_outstanding_orders
    );
}
