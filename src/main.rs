#[tokio::main]
async fn main() -> Result<(), kite_panel::error::AppError> {
    kite_panel::run().await
}
