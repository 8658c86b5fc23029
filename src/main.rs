#[tokio::main]
async fn main() -> anyhow::Result<()> {
    paycollect_api::cli::run_with_sys_args().await
}
