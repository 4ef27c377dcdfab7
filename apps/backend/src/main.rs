#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nihongo_backend::run().await
}
