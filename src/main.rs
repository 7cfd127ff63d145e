use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    confide::cli::main()
}
