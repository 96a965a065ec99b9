//! Command line driver for the `ort` in-core tree merge engine. Everything
//! this binary adds on top of `libort` - argument parsing, the on-disk
//! object store, printing results - is explicitly out of the core's scope
//! (see `libort`'s crate docs); this crate is just one possible caller.

mod cli;
mod store;

#[macro_use]
extern crate anyhow;

pub fn main() -> ! {
    env_logger::builder().parse_env("ORT_LOG").init();
    if let Err(err) = cli::run(std::env::args_os()) {
        eprintln!("error: {err:#}");
        std::process::exit(1)
    } else {
        std::process::exit(0)
    }
}
