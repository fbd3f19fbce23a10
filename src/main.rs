mod config;

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use config::{FontConfig, FontEntry};
use fontpic::{
    Canvas, Charset, GlyphSource, GlyphTable, Point, RgbaImage, SheetLayout, SpriteSheetFont,
    Surface,
};

const USAGE: &str = "usage: fontpic [--config PATH] [--font NAME | --fnt PATH [--width N] | --sheet PATH] \
                     <sample OUT.png [--per-line N] | render OUT.png TEXT... | export OUT.fnt [--ypad N]>";

fn main() -> Result<()> {
    let opts = parse_options()?;
    let config = match &opts.config_path {
        Some(path) => FontConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => FontConfig::default(),
    };

    let entry = font_entry(&opts, &config)?;
    let font = LoadedFont::load(&entry).with_context(|| {
        format!(
            "failed to load font {} from {}",
            entry.name(),
            entry.path().display()
        )
    })?;

    eprintln!(
        "Using {} font {} ({}x{})",
        font.kind(),
        entry.name(),
        font.cell_size().0,
        font.cell_size().1
    );

    match &opts.command {
        Command::Sample { out } => {
            let per_line = opts.per_line.unwrap_or(config.per_line);
            let image = font
                .to_table(0)?
                .sample_color(per_line, config.foreground(), config.background())?;
            write_png(&image, out)?;
        }
        Command::Render { out, text } => {
            let image = font.render(text, &config)?;
            write_png(&image, out)?;
        }
        Command::Export { out } => {
            let table = font.to_table(opts.ypad.unwrap_or(0))?;
            let file =
                File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
            write_buffered(file, |w| table.write_to(w))
                .with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!(
                "Wrote {} ({}x{}, {} bytes)",
                out.display(),
                table.width(),
                table.height(),
                table.as_bytes().len()
            );
        }
    }

    Ok(())
}

enum LoadedFont {
    Binary(GlyphTable),
    Sheet(SpriteSheetFont),
}

impl LoadedFont {
    fn load(entry: &FontEntry) -> Result<Self> {
        match entry {
            FontEntry::Binary {
                path,
                width,
                charset,
                ..
            } => {
                let mut table = GlyphTable::load(path, *width)?;
                if let Some(charset) = charset {
                    table = table.with_charset(charset.as_str());
                }
                Ok(LoadedFont::Binary(table))
            }
            FontEntry::Sheet { path, layout, .. } => {
                let file = File::open(path)?;
                Ok(LoadedFont::Sheet(SpriteSheetFont::load(layout.clone(), file)?))
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            LoadedFont::Binary(_) => "binary",
            LoadedFont::Sheet(_) => "sprite-sheet",
        }
    }

    fn cell_size(&self) -> (u32, u32) {
        match self {
            LoadedFont::Binary(table) => table.cell_size(),
            LoadedFont::Sheet(sheet) => sheet.cell_size(),
        }
    }

    fn to_table(&self, y_padding: u8) -> Result<GlyphTable> {
        match self {
            LoadedFont::Binary(table) => Ok(table.clone()),
            LoadedFont::Sheet(sheet) => Ok(sheet.to_glyph_table(y_padding)?),
        }
    }

    fn render(&self, text: &str, config: &FontConfig) -> Result<RgbaImage> {
        match self {
            LoadedFont::Binary(table) => {
                let bytes = match table.charset().and_then(Charset::by_name) {
                    Some(charset) => charset.translate(text),
                    None => text.as_bytes().to_vec(),
                };
                let mut canvas = canvas_for(table, config);
                canvas.render_text(bytes)?;
                Ok(canvas.into_image()?)
            }
            LoadedFont::Sheet(sheet) => {
                let mut canvas = canvas_for(sheet, config);
                canvas.render_str_at(text, Point::ORIGIN)?;
                Ok(canvas.into_image()?)
            }
        }
    }
}

fn canvas_for<'a, F: GlyphSource>(font: &'a F, config: &FontConfig) -> Canvas<&'a F, RgbaImage> {
    Canvas::new(font)
        .with_spacing(config.spacing[0], config.spacing[1])
        .with_foreground(config.foreground())
        .with_background(config.background())
}

fn write_png(image: &RgbaImage, out: &Path) -> Result<()> {
    let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
    write_buffered(file, |w| fontpic::pngio::encode(image, w))
        .with_context(|| format!("failed to encode {}", out.display()))?;
    eprintln!("Wrote {} ({}x{})", out.display(), image.width(), image.height());
    Ok(())
}

/// Runs `write` through a buffer over `inner` and flushes it before
/// returning.
fn write_buffered<W: Write>(
    inner: W,
    write: impl FnOnce(&mut BufWriter<W>) -> fontpic::Result<()>,
) -> Result<()> {
    let mut writer = BufWriter::new(inner);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Picks the font from the command line first, then from the profile.
fn font_entry(opts: &Options, config: &FontConfig) -> Result<FontEntry> {
    if let Some(path) = &opts.fnt_path {
        return Ok(FontEntry::Binary {
            name: file_name(path),
            path: path.clone(),
            width: opts.width.unwrap_or(fontpic::table::DEFAULT_WIDTH),
            charset: None,
        });
    }
    if let Some(path) = &opts.sheet_path {
        return Ok(FontEntry::Sheet {
            name: file_name(path),
            path: path.clone(),
            layout: SheetLayout::microfont(),
        });
    }
    match config.font(opts.font.as_deref()) {
        Some(entry) => Ok(entry.clone()),
        None => match &opts.font {
            Some(name) => bail!("no font named {name} in the profile"),
            None => bail!("no font configured; pass --fnt, --sheet or --config\n{USAGE}"),
        },
    }
}

fn file_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

enum Command {
    Sample { out: PathBuf },
    Render { out: PathBuf, text: String },
    Export { out: PathBuf },
}

struct Options {
    config_path: Option<PathBuf>,
    font: Option<String>,
    fnt_path: Option<PathBuf>,
    sheet_path: Option<PathBuf>,
    width: Option<u32>,
    per_line: Option<usize>,
    ypad: Option<u8>,
    command: Command,
}

fn parse_options() -> Result<Options> {
    let mut config_path: Option<PathBuf> = None;
    let mut font = None;
    let mut fnt_path = None;
    let mut sheet_path = None;
    let mut width = None;
    let mut per_line = None;
    let mut ypad = None;
    let mut positional = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--font" => font = args.next(),
            "--fnt" => fnt_path = args.next().map(PathBuf::from),
            "--sheet" => sheet_path = args.next().map(PathBuf::from),
            "--width" => width = Some(parse_number(args.next(), "--width")?),
            "--per-line" => per_line = Some(parse_number(args.next(), "--per-line")?),
            "--ypad" => ypad = Some(parse_number(args.next(), "--ypad")?),
            "-h" | "--help" => {
                eprintln!("{USAGE}");
                std::process::exit(0);
            }
            _ => positional.push(arg),
        }
    }

    let config_path = config_path.or_else(|| {
        // Priority: ./fontpic.json → ~/.config/fontpic/fontpic.json
        let local = PathBuf::from("fontpic.json");
        if local.exists() {
            return Some(local);
        }
        let xdg = PathBuf::from(env::var_os("HOME")?).join(".config/fontpic/fontpic.json");
        xdg.exists().then_some(xdg)
    });

    let mut positional = positional.into_iter();
    let (Some(command), Some(out)) = (positional.next(), positional.next()) else {
        bail!("{USAGE}");
    };
    let out = PathBuf::from(out);
    let command = match command.as_str() {
        "sample" => Command::Sample { out },
        "render" => Command::Render {
            out,
            text: positional.collect::<Vec<_>>().join(" "),
        },
        "export" => Command::Export { out },
        other => bail!("unknown command {other}\n{USAGE}"),
    };

    Ok(Options {
        config_path,
        font,
        fnt_path,
        sheet_path,
        width,
        per_line,
        ypad,
        command,
    })
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, flag: &str) -> Result<T> {
    let Some(value) = value else {
        bail!("{flag} needs a value");
    };
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{flag}: invalid number {value}"))
}
