use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, ensure};
use clap::{ArgMatches, Command, arg, command, value_parser};
use regvm::codegen::{self, RenderOptions};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn cli() -> Command {
    command!()
        .about("Compiles a regular expression into Rust source that runs it on the regvm Pike VM")
        .arg(arg!(-p --pattern <PATTERN> "Regular expression to compile").required(true))
        .arg(
            arg!(-f --func <NAME> "Name of the generated matching function")
                .default_value("regex_match"),
        )
        .arg(
            arg!(-o --out <PATH> "Output file [default: <NAME>_regex.rs]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--runtime <PATH> "Path to the regvm crate as seen from the generated code")
                .default_value("regvm"),
        )
        .arg(arg!(--dump "Print the compiled program to stdout"))
}

fn generate(args: &ArgMatches) -> anyhow::Result<()> {
    let pattern = args
        .get_one::<String>("pattern")
        .context("missing --pattern")?;
    let options = RenderOptions {
        function_name: args
            .get_one::<String>("func")
            .cloned()
            .unwrap_or_default(),
        runtime: args
            .get_one::<String>("runtime")
            .cloned()
            .unwrap_or_default(),
    };

    ensure!(
        codegen::is_identifier(&options.function_name),
        "`{}` is not a valid function name",
        options.function_name
    );
    ensure!(
        codegen::is_path(&options.runtime),
        "`{}` is not a valid crate path",
        options.runtime
    );

    let regex = regvm::Regex::new(pattern)
        .with_context(|| format!("can not compile pattern {pattern:?}"))?;

    if args.get_flag("dump") {
        print!("{}", regex.program());
    }

    let out = args
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("{}_regex.rs", options.function_name)));

    let file =
        File::create(&out).with_context(|| format!("can not create `{}`", out.display()))?;
    let mut writer = BufWriter::new(file);

    codegen::render(&mut writer, pattern, regex.program(), &options)
        .and_then(|_| writer.flush())
        .with_context(|| format!("can not write `{}`", out.display()))?;

    log::info!(
        "wrote {} instructions for {pattern:?} to {}",
        regex.program().len(),
        out.display()
    );

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    generate(&cli().get_matches())
}
