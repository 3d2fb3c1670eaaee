use argh::FromArgs;

mod cmd_generate;
mod cmd_parse;

#[derive(FromArgs)]
/// An Earley chart parser with shared packed parse forests
struct Args {
    #[argh(subcommand)]
    subcommand: Subcommand,
}

#[derive(FromArgs)]
/// parse or generate sentences
#[argh(subcommand)]
enum Subcommand {
    Parse(cmd_parse::Parse),
    Generate(cmd_generate::Generate),
}

impl Subcommand {
    fn run(self) {
        match self {
            Subcommand::Parse(cmd) => cmd.run(),
            Subcommand::Generate(cmd) => cmd.run(),
        }
    }
}

fn main() {
    env_logger::init();
    argh::from_env::<Args>().subcommand.run();
}
