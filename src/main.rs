use std::process;

#[tokio::main]
async fn main() {
    match mixtape_sync::cli::run().await {
        Ok(()) => {}
        Err(err) => {
            println!("{err}");
            process::exit(1);
        }
    }
}
