//! External tool discovery.
//!
//! The [`ToolRegistry`] resolves the binaries named in
//! [`ToolsConfig`] (ffmpeg, convert, webpmux and the TGS rasterizer) and
//! reports whether each one can actually be run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stickerforge_core::config::ToolsConfig;

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Role of the tool in the pipeline (e.g. "webpmux").
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// First line of the version output, if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding the resolved tool paths.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<(&'static str, PathBuf, Option<PathBuf>)>,
}

impl ToolRegistry {
    /// Resolve every configured tool with [`which::which`].
    ///
    /// Tools that are not found stay in the registry as unavailable.
    pub fn discover(config: &ToolsConfig) -> Self {
        let tools = [
            ("ffmpeg", &config.ffmpeg),
            ("convert", &config.convert),
            ("webpmux", &config.webpmux),
            ("rasterizer", &config.rasterizer.program),
        ]
        .into_iter()
        .map(|(name, configured)| {
            let resolved = which::which(configured).ok();
            if resolved.is_none() {
                tracing::debug!(tool = name, path = %configured.display(), "tool not found");
            }
            (name, configured.clone(), resolved)
        })
        .collect();

        Self { tools }
    }

    /// Check all tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|(name, _configured, resolved)| match resolved {
                Some(path) => ToolInfo {
                    name: (*name).to_string(),
                    available: true,
                    version: detect_version(name, path),
                    path: Some(path.clone()),
                },
                None => ToolInfo {
                    name: (*name).to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

/// Run the tool's version command and return the first non-empty line.
fn detect_version(name: &str, path: &Path) -> Option<String> {
    let version_arg = match name {
        "ffmpeg" => "-version",
        "webpmux" => "-version",
        _ => "--version",
    };

    let output = std::process::Command::new(path)
        .arg(version_arg)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|l| !l.trim().is_empty())
        .map(|s| s.trim().to_string())
}
