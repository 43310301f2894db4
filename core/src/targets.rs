pub const REGISTRATION: &str = "mmflink::registration";
pub const PRINT_JOB: &str = "mmflink::print_job";
pub const DISPATCH: &str = "mmflink::dispatch";
pub const SETTINGS: &str = "mmflink::settings";
pub const COMMAND: &str = "mmflink::command";
pub const PUSH: &str = "mmflink::push";
pub const UI: &str = "mmflink::ui";

pub const ALL: [&str; 7] = [REGISTRATION, PRINT_JOB, DISPATCH, SETTINGS, COMMAND, PUSH, UI];
