#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = classtrack_rust::run().await {
        eprintln!("classtrack-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
