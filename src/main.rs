use colored::Colorize;

fn main() {
    if let Err(err) = edgemigrate::run() {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}
