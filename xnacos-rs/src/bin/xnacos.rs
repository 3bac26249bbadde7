//! CLI for xnacos: resolve a service through a Nacos registry, or hammer it from several worker threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xnacos_rs::{HostModule, NacosParams};

#[derive(Parser)]
#[command(name = "xnacos")]
#[command(about = "Query a Nacos naming service the way load-test scripts do")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Log filter when RUST_LOG is unset (e.g. debug, xnacos_core=debug)
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    #[arg(long, env = "NACOS_ADDR", default_value = "127.0.0.1")]
    ip_addr: String,
    #[arg(long, env = "NACOS_PORT", default_value_t = 8848)]
    port: u64,
    #[arg(long, env = "NACOS_USERNAME", default_value = "")]
    username: String,
    #[arg(long, env = "NACOS_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,
    /// Namespace id; empty for public
    #[arg(long, env = "NACOS_NAMESPACE", default_value = "")]
    namespace: String,
    /// Group used when a query names none
    #[arg(long, env = "NACOS_GROUP", default_value = "")]
    group: String,
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
}

impl ConnectionArgs {
    fn into_params(self) -> NacosParams {
        NacosParams {
            ip_addr: self.ip_addr,
            port: self.port,
            username: self.username,
            password: self.password,
            namespace_id: self.namespace,
            group: self.group,
            timeout_ms: Some(self.timeout_ms),
            context_path: None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print one healthy instance (weighted random) as JSON.
    SelectOne {
        service: String,
        #[arg(long)]
        group: Option<String>,
    },
    /// Print all instances, healthy or not, as JSON.
    SelectAll {
        service: String,
        #[arg(long)]
        group: Option<String>,
    },
    /// Run select-one from several threads sharing one client and print a summary.
    Bench {
        service: String,
        #[arg(long)]
        group: Option<String>,
        /// Concurrent workers (one thread each)
        #[arg(long, default_value_t = 4)]
        workers: usize,
        /// Queries per worker
        #[arg(long, default_value_t = 100)]
        iterations: usize,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_bench(
    module: &HostModule,
    key: &str,
    service: &str,
    group: Option<&str>,
    workers: usize,
    iterations: usize,
) -> serde_json::Value {
    let ok = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let first_error: Mutex<Option<String>> = Mutex::new(None);
    let started = Instant::now();
    std::thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| {
                for _ in 0..iterations {
                    match module.select_one_healthy_instance(key, service, group) {
                        Ok(_) => {
                            ok.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            let mut first = first_error.lock().unwrap_or_else(|p| p.into_inner());
                            if first.is_none() {
                                *first = Some(e.to_string());
                            }
                        }
                    }
                }
            });
        }
    });
    let elapsed = started.elapsed();
    let total = workers * iterations;
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { total as f64 / secs } else { 0.0 };
    serde_json::json!({
        "requests": total,
        "ok": ok.load(Ordering::Relaxed),
        "errors": failed.load(Ordering::Relaxed),
        "elapsedMs": elapsed.as_millis() as u64,
        "requestsPerSec": rate,
        "firstError": first_error.into_inner().unwrap_or_else(|p| p.into_inner()),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let module = Arc::new(HostModule::new()?);
    let client = module.construct_config(&cli.connection.into_params().into_config())?;
    tracing::debug!(key = client.key(), "client registered");

    let output = match cli.command {
        Commands::SelectOne { service, group } => {
            serde_json::to_value(client.select_one_healthy_instance(&service, group.as_deref())?)?
        }
        Commands::SelectAll { service, group } => {
            serde_json::to_value(client.select_all_instances(&service, group.as_deref())?)?
        }
        Commands::Bench {
            service,
            group,
            workers,
            iterations,
        } => run_bench(&module, client.key(), &service, group.as_deref(), workers.max(1), iterations),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
