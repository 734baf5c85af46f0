use clap::Parser;
use ferrous_ipstack_domain::CliOverrides;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info};

mod bootstrap;
mod di;

const LINK_UP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "ferrous-ipstack")]
#[command(version)]
#[command(about = "Ferrous IP Stack - DNS client over a minimal IP task")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server to query (ip or ip:port)
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Per-attempt reply timeout in milliseconds
    #[arg(short = 't', long)]
    timeout_ms: Option<u64>,

    /// Retries after the first attempt
    #[arg(short = 'r', long)]
    retries: Option<u8>,

    /// Receive replies into owned buffers instead of pool descriptors
    #[arg(long)]
    no_zero_copy: bool,

    /// Host interface to watch
    #[arg(short = 'i', long)]
    interface: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Hostnames to resolve
    #[arg(required = true)]
    hostnames: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_server: cli.server.clone(),
        query_timeout_ms: cli.timeout_ms,
        retry_budget: cli.retries,
        zero_copy: cli.no_zero_copy.then_some(false),
        log_level: cli.log_level.clone(),
        interface: cli.interface.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    info!("Starting Ferrous IP Stack v{}", env!("CARGO_PKG_VERSION"));

    let stack = di::StackServices::start(&config).await?;
    let dns = di::DnsServices::new(&config, &stack)?;

    stack.wait_until_up(LINK_UP_TIMEOUT).await?;

    let mut lookups = JoinSet::new();
    for (position, hostname) in cli.hostnames.iter().cloned().enumerate() {
        let resolve = dns.resolve.clone();
        lookups.spawn(async move {
            let result = resolve.execute(&hostname).await;
            (position, hostname, result)
        });
    }

    let mut results = Vec::with_capacity(cli.hostnames.len());
    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok(outcome) => results.push(outcome),
            Err(e) => error!(error = %e, "Resolution task failed"),
        }
    }
    results.sort_by_key(|(position, _, _)| *position);

    let mut failed = 0usize;
    for (_, hostname, result) in &results {
        match result {
            Ok(addresses) => {
                let list: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();
                println!("{hostname}: {}", list.join(", "));
            }
            Err(e) => {
                failed += 1;
                println!("{hostname}: {}", e.as_str());
            }
        }
    }

    let stats = stack.pool.stats();
    info!(
        sockets_opened = dns.engine.transport().stats().opened,
        buffers_free = stats.free,
        buffers_low_water_mark = stats.low_water_mark,
        "Resolution run complete"
    );

    stack.shutdown().await;

    if failed > 0 {
        anyhow::bail!("{} of {} hostnames could not be resolved", failed, results.len());
    }
    Ok(())
}
