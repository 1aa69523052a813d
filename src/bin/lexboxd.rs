use anyhow::Result;

fn main() -> Result<()> {
    lexbox::cli::run()
}
