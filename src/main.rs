use tagdex::{cli, router};

fn main() {
    let cli = cli::parse();
    if let Err(err) = router::dispatch(cli) {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        std::process::exit(err.exit_code());
    }
}
