use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match carrater_server::start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("carrater_server: {err}");
            ExitCode::FAILURE
        }
    }
}
