use anyhow::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(installtool::cli::log_filter(
            &std::env::var("RUST_LOG").unwrap_or_default(),
        ))
        .with_writer(std::io::stderr)
        .init();

    installtool::cli::run()
}
