fn main() {
    if let Err(e) = arix::cli::main() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
