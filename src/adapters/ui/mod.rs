pub mod banner;
pub mod console;

/// Prints the welcome banner and applies the theme for all subsequent inquire prompts.
/// Call once before the console chat starts.
pub fn init_ui() {
    banner::print_welcome();
    console::apply_theme();
}
