#[tokio::main]
async fn main() {
    if let Err(e) = billpay_core::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
