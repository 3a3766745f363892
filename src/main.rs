//! Binary entrypoint that starts the learning assistant server.

use std::process::ExitCode;

use learning_assistant::start_server;

fn main() -> ExitCode {
    start_server::run()
}
