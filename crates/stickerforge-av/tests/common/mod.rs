//! Shared fixtures for converter integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use stickerforge_av::{CommandRunner, QualityBudget, ToolCommand, ToolOutput, VectorRasterizer, Workspace};
use stickerforge_core::{Config, Result};
use tempfile::TempDir;

/// Bytes `webpmux` fakes append to show the chunk was spliced in.
pub const EXIF_MARKER: &[u8] = b"<exif>";

type Handler = Box<dyn Fn(&ToolCommand) -> ToolOutput + Send + Sync>;

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub tool: String,
    pub args: Vec<String>,
    pub dir_existed: bool,
}

/// A [`CommandRunner`] that dispatches on the tool name to scripted handlers.
#[derive(Default)]
pub struct ScriptedRunner {
    handlers: HashMap<String, Handler>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        tool: &str,
        handler: impl Fn(&ToolCommand) -> ToolOutput + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(tool.to_string(), Box::new(handler));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, tool: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.tool == tool).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let tool = command.program_name();
        self.calls.lock().unwrap().push(Call {
            tool: tool.clone(),
            args: command.arguments().to_vec(),
            dir_existed: command.working_dir().is_some_and(Path::is_dir),
        });
        Ok(match self.handlers.get(&tool) {
            Some(handler) => handler(command),
            None => fail(&format!("{tool}: not scripted")),
        })
    }
}

pub fn ok() -> ToolOutput {
    ToolOutput {
        code: Some(0),
        ..Default::default()
    }
}

pub fn fail(stderr: &str) -> ToolOutput {
    ToolOutput {
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Every tool in the pipeline takes its output path last.
pub fn output_path(command: &ToolCommand) -> PathBuf {
    PathBuf::from(command.arguments().last().expect("command has no arguments"))
}

/// Argument following `flag`.
pub fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Handler writing fixed bytes to the output path.
pub fn writes(data: &'static [u8]) -> impl Fn(&ToolCommand) -> ToolOutput + Send + Sync {
    move |cmd| {
        std::fs::write(output_path(cmd), data).unwrap();
        ok()
    }
}

/// `webpmux -set exif <chunk> <input> -o <output>`: output = input + marker.
pub fn webpmux_appends_marker() -> impl Fn(&ToolCommand) -> ToolOutput + Send + Sync {
    |cmd| {
        let input = &cmd.arguments()[3];
        let mut data = std::fs::read(input).unwrap();
        data.extend_from_slice(EXIF_MARKER);
        std::fs::write(output_path(cmd), data).unwrap();
        ok()
    }
}

/// Rasterizer producing a payload whose size depends on the budget.
pub struct FakeRasterizer {
    size_for: Box<dyn Fn(QualityBudget) -> Result<usize> + Send + Sync>,
    calls: AtomicU32,
    budgets: Mutex<Vec<QualityBudget>>,
}

impl FakeRasterizer {
    pub fn new(size_for: impl Fn(QualityBudget) -> Result<usize> + Send + Sync + 'static) -> Self {
        Self {
            size_for: Box::new(size_for),
            calls: AtomicU32::new(0),
            budgets: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn budgets(&self) -> Vec<QualityBudget> {
        self.budgets.lock().unwrap().clone()
    }
}

impl VectorRasterizer for FakeRasterizer {
    fn rasterize(&self, workspace: &Workspace, _tgs: &[u8], budget: QualityBudget) -> Result<Vec<u8>> {
        assert!(workspace.dir().is_dir());
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.budgets.lock().unwrap().push(budget);
        let size = (self.size_for)(budget)?;
        Ok(vec![b'w'; size])
    }
}

/// Config with its scratch root inside a fresh temp dir.
pub fn test_config() -> (TempDir, Config) {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.scratch.root = tmp.path().join("downloads");
    (tmp, config)
}

/// Whether the scratch root holds no job directories.
pub fn scratch_is_empty(config: &Config) -> bool {
    match std::fs::read_dir(&config.scratch.root) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
