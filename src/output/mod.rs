mod response;

pub use response::{exit_code_for, print_envelope, OutputFormat};
