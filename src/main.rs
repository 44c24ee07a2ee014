use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = jobmail::cli::Cli::parse();

    if let Err(err) = jobmail::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
