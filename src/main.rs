use clap::Parser;
use lloconv::cli;

fn main() {
    let code = match cli::Args::try_parse() {
        Ok(args) => cli::run(args),
        Err(err) => {
            let _ = err.print();
            cli::usage_exit_code(&err)
        }
    };
    cli::terminate(code)
}
