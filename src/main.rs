use std::process::ExitCode;

fn main() -> ExitCode {
    match chat_export_explorer::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
