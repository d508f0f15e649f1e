use clap::arg;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("portalfinder")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("portalfinder")
        .about("Probe hosts for login, registration and password-reset pages")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-l --"list" <PATH>)
                .required(true)
                .help("Path to a newline-delimited file of base URLs (scheme included)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save hosts with an account portal to this file")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Output format: text (one URL per line) or json (full report)")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(--"append")
                .required(false)
                .help("Append each match to the output file as soon as it is found")
                .action(clap::ArgAction::SetTrue)
                .requires("output")
                .conflicts_with("format"),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Show all results (both with and without account portals)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .help("JSON configuration file (paths, keywords, limits)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-p --"preset" <PRESET>)
                .required(false)
                .help("Built-in path/keyword set")
                .value_parser(["extended", "compact"]),
        )
        .arg(
            arg!(-P --"paths-file" <PATH>)
                .required(false)
                .help("Newline-delimited path suffixes to probe, replacing the preset's")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-k --"keywords-file" <PATH>)
                .required(false)
                .help("Newline-delimited keywords to match, replacing the preset's")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-t --"threads" <NUM_WORKERS>)
                .required(false)
                .help("The number of async workers scanning hosts concurrently")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Per-request timeout in seconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            arg!(--"no-progress")
                .required(false)
                .help("Do not draw the progress spinner")
                .action(clap::ArgAction::SetTrue),
        )
}
