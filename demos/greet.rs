use flagchain::{Builder, Error, ErrorHandling, FlagSet};
use std::{env, process};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut builder = Builder::with_set(FlagSet::shared("greet", ErrorHandling::Continue));
    let name = builder
        .string_flag("name", "Who to greet")
        .alias('n')
        .default("world".into())
        .build_var();
    let times = builder
        .uint_flag("times", "How many greetings")
        .alias('t')
        .default(1)
        .build_var();
    let loud = builder.bool_flag("loud", "Shout the greeting").alias('l').build_var();
    let extra = builder
        .string_flag("also", "Someone else to greet; repeatable")
        .alias('a')
        .build_slice();
    let help = builder.bool_flag("help", "Show this help message").alias('h').build_var();

    // The flag-set has already reported the error and the usage.
    if let Err(error) = builder.parse(env::args().skip(1)) {
        process::exit(if matches!(error, Error::Help) { 0 } else { 2 });
    }
    if help.get() {
        if let Err(error) = builder.print_usage() {
            warn!(%error, "failed to print usage");
        }
        return;
    }

    let mut names = vec![name.get()];
    names.extend(extra.get());
    for _ in 0..times.get() {
        for name in &names {
            let greeting = format!("Hello, {name}!");
            if loud.get() {
                println!("{}", greeting.to_uppercase());
            } else {
                println!("{greeting}");
            }
        }
    }
}
