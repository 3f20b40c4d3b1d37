use phrasebox_lib::Exit;
use std::process::ExitCode;

fn main() -> ExitCode {
    match phrasebox_lib::run() {
        Ok(Exit::Ok) => ExitCode::SUCCESS,
        Ok(Exit::Alert(message)) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("phrasebox: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
