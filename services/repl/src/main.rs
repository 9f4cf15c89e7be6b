use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    repl_server::run_server().await
}
