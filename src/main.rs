pub mod cli;
pub mod fetch;
pub mod generate;
pub mod pipeline;
pub mod swagger;
pub mod type_expr;

fn main() -> anyhow::Result<()> {
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
