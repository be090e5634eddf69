fn main() -> anyhow::Result<()> {
    cnc_formatter::run()
}
