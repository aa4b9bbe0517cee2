use clap::Parser;
use clipfetch::config::ClientConfigBuilder;
use clipfetch::progress::TaskProgress;
use clipfetch::{ClientConfig, ClientError, ConvertManager, ConvertRequest, MediaFormat, TaskEvent};
use indicatif::MultiProgress;
use log::{error, info};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "clipfetch")]
#[command(about = "Submit media URLs to a conversion backend and fetch the results", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, value_name = "URL", default_value = "http://127.0.0.1:10000")]
    backend: String,

    /// Output format: mp3 or mp4
    #[arg(short, long, default_value = "mp4")]
    format: String,

    #[arg(short, long, value_name = "DIR", default_value = "downloads")]
    output: PathBuf,

    /// Seconds between status queries
    #[arg(short, long, default_value_t = 2)]
    interval: u64,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short = 'u', long = "urls", value_name = "URLS", num_args = 1.., required = true)]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let format: MediaFormat = cli.format.parse()?;

    let config = match cli.config {
        Some(path) => ClientConfig::from_file(&path)
            .map_err(|e| ClientError::ConfigError(e.to_string()))?,
        None => ClientConfigBuilder::new()
            .backend_url(cli.backend)
            .download_dir(cli.output)
            .poll_interval(Duration::from_secs(cli.interval))
            .debug(cli.verbose)
            .build()?,
    };

    info!("Backend: {}", config.backend_url);
    info!("Download directory: {}", config.download_dir.display());

    let manager = ConvertManager::new(config)?;
    manager.init()?;

    // Ctrl-C cancels the active poll; run_to_completion then returns Canceled
    let manager_clone = Arc::clone(&manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, canceling");
            manager_clone.shutdown();
        }
    });

    let rx = manager.subscribe_events();
    tokio::spawn(async move {
        let mut rx = rx;
        let multi = MultiProgress::new();
        let mut bars: HashMap<String, TaskProgress> = HashMap::new();
        let mut fetching: HashMap<String, bool> = HashMap::new();

        while let Ok(event) = rx.recv().await {
            match event {
                TaskEvent::Submitted(id) => {
                    bars.insert(id.clone(), TaskProgress::new(&id, &multi));
                }
                TaskEvent::Progress {
                    id,
                    percent,
                    message,
                } => {
                    if let Some(bar) = bars.get(&id) {
                        bar.update(percent, &message);
                    }
                }
                TaskEvent::Downloading {
                    id,
                    received,
                    total,
                } => {
                    if let Some(bar) = bars.get(&id) {
                        if !fetching.get(&id).copied().unwrap_or(false) {
                            bar.start_fetch(total);
                            fetching.insert(id.clone(), true);
                        }
                        bar.fetched(received, total);
                    }
                }
                TaskEvent::Downloaded { id, path } => {
                    if let Some(bar) = bars.get(&id) {
                        bar.finish(&path);
                    }
                }
                TaskEvent::Error(id, err) => {
                    if let Some(bar) = bars.get(&id) {
                        bar.fail(&err.to_string());
                    }
                }
                TaskEvent::Complete { .. } => {}
            }
        }
    });

    // one task at a time; a failure aborts the run, as on the page
    for url in cli.urls {
        let request = ConvertRequest::builder(url.clone()).format(format).build();
        match manager.run_to_completion(request).await {
            Ok(path) => {
                info!("Saved '{}' -> {}", url, path.display());
            }
            Err(ClientError::Canceled(id)) => {
                info!("Task {} canceled, stopping", id);
                break;
            }
            Err(e) => {
                error!("'{}' failed: {}", url, e);
                manager.shutdown();
                return Err(e);
            }
        }
    }

    manager.shutdown();
    info!("All done");
    Ok(())
}
