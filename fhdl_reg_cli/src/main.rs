fn main() -> anyhow::Result<()> {
    fhdl_reg_cli::run_cli()
}
