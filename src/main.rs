fn main() {
    if let Err(err) = grade_rank::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
