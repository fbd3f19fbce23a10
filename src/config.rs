use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use fontpic::{Rgba, SheetLayout};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FontConfig {
    #[serde(default)]
    pub default_font: Option<String>,
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
    #[serde(default = "default_foreground")]
    pub foreground: [u8; 4],
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    #[serde(default)]
    pub spacing: [i32; 2],
    #[serde(default = "default_per_line")]
    pub per_line: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FontEntry {
    Binary {
        name: String,
        path: PathBuf,
        #[serde(default = "default_width")]
        width: u32,
        #[serde(default)]
        charset: Option<String>,
    },
    Sheet {
        name: String,
        path: PathBuf,
        layout: SheetLayout,
    },
}

impl FontEntry {
    pub fn name(&self) -> &str {
        match self {
            FontEntry::Binary { name, .. } | FontEntry::Sheet { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FontEntry::Binary { path, .. } | FontEntry::Sheet { path, .. } => path,
        }
    }

    /// Resolves a relative font path against the config file's directory.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let (FontEntry::Binary { path, .. } | FontEntry::Sheet { path, .. }) = &mut self;
        if path.is_relative() {
            *path = base.join(&*path);
        }
        self
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            default_font: None,
            fonts: Vec::new(),
            foreground: default_foreground(),
            background: default_background(),
            spacing: [0, 0],
            per_line: default_per_line(),
        }
    }
}

impl FontConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let mut cfg: FontConfig = serde_json::from_str(&raw)?;
        let base = path.parent().unwrap_or(Path::new("."));
        cfg.fonts = cfg.fonts.into_iter().map(|f| f.relative_to(base)).collect();
        Ok(cfg)
    }

    /// The named font, else the configured default, else the first one.
    pub fn font(&self, name: Option<&str>) -> Option<&FontEntry> {
        match name.or(self.default_font.as_deref()) {
            Some(name) => self.fonts.iter().find(|f| f.name() == name),
            None => self.fonts.first(),
        }
    }

    pub fn foreground(&self) -> Rgba {
        self.foreground.into()
    }

    pub fn background(&self) -> Rgba {
        self.background.into()
    }
}

fn default_foreground() -> [u8; 4] {
    [0xa8, 0xa8, 0xa8, 0xff]
}

fn default_background() -> [u8; 4] {
    [0, 0, 0, 0xff]
}

fn default_per_line() -> usize {
    32
}

fn default_width() -> u32 {
    8
}
