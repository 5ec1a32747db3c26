fn main() -> anyhow::Result<()> {
    colornotes::cli::run()
}
