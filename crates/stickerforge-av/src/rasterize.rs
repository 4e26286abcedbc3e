//! Vector (TGS) to animated WEBP rasterization.

use std::sync::Arc;

use stickerforge_core::config::RasterizerConfig;
use stickerforge_core::Result;

use crate::command::{CommandRunner, ToolCommand};
use crate::reducer::QualityBudget;
use crate::workspace::Workspace;

const INPUT_FILE: &str = "input.tgs";
const OUTPUT_FILE: &str = "output.webp";

/// Renders a vector sticker into animated WEBP bytes at a given budget.
pub trait VectorRasterizer: Send + Sync {
    /// Rasterize `tgs` at `budget`, using `workspace` for scratch files.
    fn rasterize(&self, workspace: &Workspace, tgs: &[u8], budget: QualityBudget)
        -> Result<Vec<u8>>;
}

/// Rasterizer backed by an external program described by a command template.
pub struct ExternalRasterizer {
    config: RasterizerConfig,
    runner: Arc<dyn CommandRunner>,
}

impl ExternalRasterizer {
    /// Create a rasterizer running `config.program` through `runner`.
    pub fn new(config: RasterizerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Substitute `{input}`, `{output}`, `{fps}` and `{quality}` in the
    /// configured arguments.
    fn render_args(&self, workspace: &Workspace, budget: QualityBudget) -> Vec<String> {
        let input = workspace.file(INPUT_FILE).display().to_string();
        let output = workspace.file(OUTPUT_FILE).display().to_string();
        let fps = budget.fps.to_string();
        let quality = budget.quality.to_string();

        self.config
            .args
            .iter()
            .map(|a| {
                a.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{fps}", &fps)
                    .replace("{quality}", &quality)
            })
            .collect()
    }
}

impl VectorRasterizer for ExternalRasterizer {
    fn rasterize(
        &self,
        workspace: &Workspace,
        tgs: &[u8],
        budget: QualityBudget,
    ) -> Result<Vec<u8>> {
        workspace.write(INPUT_FILE, tgs)?;
        // A previous attempt's output must never be mistaken for this one's.
        let output = workspace.file(OUTPUT_FILE);
        if output.exists() {
            std::fs::remove_file(&output)?;
        }

        ToolCommand::new(&self.config.program)
            .args(self.render_args(workspace, budget))
            .current_dir(workspace.dir())
            .execute(self.runner.as_ref())?;

        workspace.read(OUTPUT_FILE)
    }
}
