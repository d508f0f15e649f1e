pub mod commands;

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    handle_scan, init_tracing, load_candidates_from_file, overrides_from_args,
    parse_candidate_line, resolve_from_args,
};
