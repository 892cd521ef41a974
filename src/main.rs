#[tokio::main]
async fn main() -> anyhow::Result<()> {
    x_analyser::run().await
}
