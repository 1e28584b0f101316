//! CLI command handler: harvest forever by default; --once runs one pass; --dump prints the store.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, bounded};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::pass_progress;
use crate::pipeline::{PipelineContext, run_forever};
use crate::source::YouTubeSource;
use crate::store::{KeyedStore, open_store, open_store_read_only};
use crate::utils::config::{
    DEFAULT_CHANNEL_ID, DEFAULT_WRITE_CONCURRENCY, EnvKeys, PASS_INTERVAL, PASS_RETRY_INTERVAL,
    PackagePaths, channel_store_key,
};
use crate::utils::settings_toml::{apply_file_to_opts, load_settings_toml};
use crate::utils::{api_key, env_value, load_env_file, setup_logging};
use crate::Opts;

/// Built-in defaults, before env, settings file and CLI.
pub fn default_opts() -> Opts {
    Opts {
        channel_id: DEFAULT_CHANNEL_ID.to_string(),
        store_path: PathBuf::from(PackagePaths::get().default_store_filename()),
        write_concurrency: DEFAULT_WRITE_CONCURRENCY,
        pass_interval: PASS_INTERVAL,
        retry_interval: PASS_RETRY_INTERVAL,
        once: false,
        verbose: false,
    }
}

fn apply_env_to_opts(opts: &mut Opts) {
    if let Some(id) = env_value(EnvKeys::CHANNEL_ID) {
        opts.channel_id = id;
    }
    if let Some(p) = env_value(EnvKeys::STORE_PATH) {
        opts.store_path = PathBuf::from(p);
    }
}

fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if let Some(ref id) = cli.channel {
        opts.channel_id = id.clone();
    }
    if let Some(ref p) = cli.store {
        opts.store_path = p.clone();
    }
    if let Some(j) = cli.jobs {
        opts.write_concurrency = usize::from(j);
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts.once = cli.once;
}

/// Defaults → env → settings file in the working directory → CLI flags.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = default_opts();
    apply_env_to_opts(&mut opts);
    if let Some(file) = load_settings_toml(Path::new(".")) {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts);
    opts
}

/// Ctrl+C: first press asks the loop to stop, second exits immediately.
fn install_shutdown_handler() -> Result<Receiver<()>> {
    let (tx, rx) = bounded::<()>(1);
    let requested = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler(move || {
        if requested.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
        log::warn!("Stop requested; finishing current pass (Ctrl+C again to exit now)");
        let _ = tx.try_send(());
    })
    .context("set Ctrl+C handler")?;
    Ok(rx)
}

/// Print the channel's collection as a JSON object `{field: record JSON}`.
pub fn dump_collection(store: &dyn KeyedStore, channel_id: &str) -> Result<String> {
    let fields = store.get_all_fields(&channel_store_key(channel_id))?;
    serde_json::to_string_pretty(&fields).context("serialize collection")
}

/// Run harvesting (default) or dump the store when --dump.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let env_path = load_env_file(cli.env_file.as_deref())?;
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    match env_path {
        Some(path) => info!("Loaded environment from {}", path.display()),
        None => debug!("No .env file found; using process environment"),
    }
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );

    if cli.dump {
        let store = open_store_read_only(&opts.store_path)?;
        println!("{}", dump_collection(&store, &opts.channel_id)?);
        return Ok(());
    }

    let store = Arc::new(open_store(&opts.store_path)?);

    let source = Arc::new(YouTubeSource::new(api_key()?));
    let ctx = PipelineContext::new(
        opts.channel_id.clone(),
        source,
        store,
        opts.write_concurrency,
    );
    let shutdown = install_shutdown_handler()?;
    info!(
        "Harvesting channel {} into {}",
        opts.channel_id,
        opts.store_path.display()
    );
    run_forever(&ctx, &opts, &shutdown, || pass_progress(opts.verbose))
}
