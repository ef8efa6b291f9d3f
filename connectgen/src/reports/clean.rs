//! Clean command report.

use super::output::{Output, Report};

/// Report data from removing the output directory.
#[derive(Debug)]
pub struct CleanReport {
    pub out_dir: String,
    /// False when there was nothing to remove.
    pub removed: bool,
}

impl Report for CleanReport {
    fn render(&self, out: &mut dyn Output) {
        if !self.removed {
            out.preformatted(&format!("Nothing to clean, {} does not exist.", self.out_dir));
            return;
        }
        out.section("Deleted");
        out.removed_item(&self.out_dir);
    }
}
