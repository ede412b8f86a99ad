use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use apod_timeline::carousel::input::DeltaMode;
use apod_timeline::carousel::typewriter::TypingState;
use apod_timeline::carousel::{
    CarouselEvent, CarouselSession, LoaderPages, PageSource, RemotePageSource,
};
use apod_timeline::client::NasaApodClient;
use apod_timeline::config::Config;
use apod_timeline::dates::{parse_base_date, today};
use apod_timeline::loader::ApodLoader;
use apod_timeline::server::{self, AppState};
use apod_timeline::{logging, metrics};

#[derive(Parser)]
#[command(name = "apod_timeline")]
#[command(about = "Astronomy Picture of the Day timeline service")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Install the Prometheus recorder and expose /metrics
        #[arg(long = "metrics")]
        enable_metrics: bool,
    },
    /// Load one window of entries and print it as JSON
    Load {
        /// Newest date of the window (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Number of days in the window
        #[arg(long)]
        count: Option<usize>,
    },
    /// Drive a headless carousel session with synthetic wheel input
    Tour {
        /// Newest date of the first page (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Number of wheel events to send
        #[arg(long, default_value = "24")]
        steps: usize,
        /// Pixel delta of each wheel event
        #[arg(long, default_value = "600")]
        delta: f64,
        /// Page through a running service instead of calling NASA directly
        #[arg(long)]
        remote: Option<String>,
    },
}

fn local_loader(config: &Config) -> Result<ApodLoader> {
    let client = NasaApodClient::from_config(reqwest::Client::new(), config)?;
    Ok(ApodLoader::new(Arc::new(client)))
}

async fn run_tour(
    config: &Config,
    date: Option<String>,
    steps: usize,
    delta: f64,
    remote: Option<String>,
) -> Result<()> {
    let batch_size = config.carousel.batch_size;
    let base = parse_base_date(date.as_deref(), today())?;

    let pages: Arc<dyn PageSource> = match remote {
        Some(url) => {
            info!(%url, "Paging through remote service");
            Arc::new(RemotePageSource::new(reqwest::Client::new(), &url))
        }
        None => Arc::new(LoaderPages::new(local_loader(config)?, batch_size)),
    };

    let initial = pages.load_page(base).await?;
    let handle = CarouselSession::spawn(initial, base, batch_size, pages);

    let mut last_index = None;
    for _ in 0..steps {
        if !handle
            .send(CarouselEvent::Wheel {
                delta_y: delta,
                delta_mode: DeltaMode::Pixel,
            })
            .await
        {
            warn!("Session ended early");
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let frame = handle.current_frame();
        if let Some(card) = frame.card {
            if last_index != Some(card.index) {
                println!(
                    "[{}/{}] {} - {}",
                    card.index + 1,
                    frame.item_count,
                    card.date,
                    card.title
                );
                last_index = Some(card.index);
            }
        }
        if let Some(toast) = frame.toast {
            println!("   ! {}: {}", toast.title, toast.message);
        }
    }

    // Reveal the description of wherever the tour stopped
    handle.send(CarouselEvent::Activate).await;
    let mut frames = handle.frames();
    let reveal = async {
        while frames.changed().await.is_ok() {
            let done = frames
                .borrow()
                .card
                .as_ref()
                .map_or(true, |card| card.typing == TypingState::Completed);
            if done {
                break;
            }
        }
    };
    if tokio::time::timeout(Duration::from_secs(30), reveal).await.is_err() {
        warn!("Typewriter did not finish within 30s");
    }
    if let Some(card) = handle.current_frame().card {
        println!("\n{}\n", card.revealed_text);
    }

    handle.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load()?;
    let _log_guard = logging::init_logging(&config.logging);

    match cli.command {
        Commands::Serve {
            port,
            enable_metrics,
        } => {
            if enable_metrics {
                metrics::init().unwrap_or_else(|e| {
                    warn!("Failed to initialize metrics: {}", e);
                });
            }
            let port = port.unwrap_or(config.server.port);
            let state = Arc::new(AppState::from_config(config)?);
            server::start_server(state, port).await?;
        }
        Commands::Load { date, count } => {
            let base = parse_base_date(date.as_deref(), today())?;
            let count = count.unwrap_or(config.carousel.batch_size);
            let result = local_loader(&config)?.load(count, base).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Tour {
            date,
            steps,
            delta,
            remote,
        } => {
            run_tour(&config, date, steps, delta, remote).await?;
        }
    }
    Ok(())
}
