use anyhow::Result;
use sketchlog::browser::Capturer;
use sketchlog::cli::Cli;
use sketchlog::config::Config;
use sketchlog::server::FileServer;
use sketchlog::{capture, error, history, info, report, stage, status};

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = Config::from_cli(&cli)?;

    // stage the clone; the working tree, server thread and browser are all
    // owned values below, so any failure path still tears them down
    stage::prepare_dirs(&config)?;
    let staging = stage::Staging::clone(&config)?;
    let remote_base_url = staging.remote_base_url()?;
    let commits = history::commits(staging.repo(), &remote_base_url)?;

    status!("processing {}", config.url);
    info!(
        "{} commit(s) to capture on branch {}",
        commits.len(),
        config.branch
    );

    let server = FileServer::start(&config.repo_dir, config.port)?;
    status!("serving working tree at {}", server.base_url());
    let capturer = Capturer::launch(config.wait)?;

    let entries = capture::capture_all(&config, &staging, &commits, &capturer, &server.base_url())?;

    let report_path = report::write_report(&config, &entries)?;
    status!("report written to {}", report_path.display());

    // explicit teardown order: serve loop, browser, then the cloned tree
    server.shutdown();
    drop(capturer);
    drop(staging);

    Ok(())
}
