use clap::Parser;

#[tokio::main]
async fn main() {
    gatehouse::config::load_dotenv();
    let cli = gatehouse::cli::Cli::parse();
    if let Err(e) = gatehouse::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
