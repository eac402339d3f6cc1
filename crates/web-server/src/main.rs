use std::path::Path;

// Entry point for `cargo run -p web-server`; the main binary's `serve`
// subcommand does the same with CLI overrides.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config(Path::new("config.toml"))?;
    let _guard = configuration::init_logging(&config.logging)?;
    web_server::run_server(config).await
}
