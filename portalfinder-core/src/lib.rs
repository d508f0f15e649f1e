use colored::Colorize;

pub mod config;
pub mod progress;
pub mod scan;
pub mod sink;

const BANNER: &str = r#"
 ____            _        _ _____ _           _
|  _ \ ___  _ __| |_ __ _| |  ___(_)_ __   __| | ___ _ __
| |_) / _ \| '__| __/ _` | | |_  | | '_ \ / _` |/ _ \ '__|
|  __/ (_) | |  | || (_| | |  _| | | | | | (_| |  __/ |
|_|   \___/|_|   \__\__,_|_|_|   |_|_| |_|\__,_|\___|_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_blue().bold());
    println!(
        "\t{} {}\n",
        "PortalFinder - Account Portal Detection".bright_green().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
