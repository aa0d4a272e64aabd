use sculpt_codegen::Confirm;

/// Interactive confirmation for the `ask` override policy. Blocks the run
/// until the operator answers; a failed prompt counts as a decline.
pub struct InquireConfirm;

impl Confirm for InquireConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}
