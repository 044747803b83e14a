use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use open_editors_layout::LayoutSnapshot;
use open_editors_settings::{SettingsStore, ViewSettings};
use open_editors_tree::{MemorySurface, Surface, TreeNode};
use open_editors_view::{InMemoryWorkspace, TreeSynchronizer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "error";

#[derive(Parser)]
#[command(
    name = "open-editors",
    about = "Inspect the Open Editors tree for a workspace layout dump",
    author,
    version
)]
struct Cli {
    /// 檢視設定檔（標籤與圖示）。 / View settings file (labels and icons).
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// 日誌過濾條件；預設讀取 RUST_LOG。 / Log filter; falls back to RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 顯示版面對應的樹狀大綱。 / Print the tree outline for a layout dump.
    Render(RenderArgs),
    /// 點擊節點或其動作，並顯示主機呼叫。 / Click a node or one of its actions and show the host calls.
    Act(ActArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// 版面傾印 JSON 檔。 / Layout dump JSON file.
    snapshot: PathBuf,
}

#[derive(Args)]
struct ActArgs {
    /// 版面傾印 JSON 檔。 / Layout dump JSON file.
    snapshot: PathBuf,

    /// 以點分隔的節點路徑，例如 `0.1.2`。 / Dot-separated node path such as `0.1.2`.
    #[arg(long, value_name = "PATH")]
    node: String,

    /// 動作標籤或索引；省略時點擊節點本身。 / Action label or index; clicks the node itself when omitted.
    #[arg(long, value_name = "LABEL|INDEX")]
    action: Option<String>,
}

struct Session {
    host: Rc<InMemoryWorkspace>,
    surface: Rc<MemorySurface>,
    view: TreeSynchronizer<InMemoryWorkspace>,
}

impl Session {
    fn open(snapshot: &Path, settings: ViewSettings) -> Result<Self> {
        let layout = LayoutSnapshot::load(snapshot)
            .with_context(|| format!("failed to load layout from {}", snapshot.display()))?;
        let host = Rc::new(InMemoryWorkspace::new(layout));
        let surface = Rc::new(MemorySurface::new());
        let view = TreeSynchronizer::new(
            Rc::clone(&host),
            Rc::clone(&surface) as Rc<dyn Surface>,
            settings,
        );
        view.activate();
        Ok(Self {
            host,
            surface,
            view,
        })
    }

    fn outline(&self) -> Result<String> {
        let root = self
            .view
            .root()
            .ok_or_else(|| anyhow!("open editors view is not active"))?;
        Ok(self.surface.outline(root))
    }

    fn print_diagnostics(&self) {
        let diagnostics = self.view.diagnostics();
        if diagnostics.is_empty() {
            return;
        }
        println!("Diagnostics:");
        for diagnostic in diagnostics {
            println!("  - {diagnostic}");
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        settings,
        log_level,
        command,
    } = Cli::parse();
    init_tracing(log_level.as_deref())?;
    let settings = load_settings(settings.as_deref())?;
    match command {
        Commands::Render(args) => execute_render(args, settings),
        Commands::Act(args) => execute_act(args, settings),
    }
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log filter '{level}'"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<ViewSettings> {
    let Some(path) = path else {
        return Ok(ViewSettings::default());
    };
    let store = SettingsStore::load(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    debug!(path = %store.path().display(), "loaded view settings");
    Ok(store.into_settings())
}

fn execute_render(args: RenderArgs, settings: ViewSettings) -> Result<()> {
    let session = Session::open(&args.snapshot, settings)?;
    print!("{}", session.outline()?);
    session.print_diagnostics();
    Ok(())
}

fn execute_act(args: ActArgs, settings: ViewSettings) -> Result<()> {
    let session = Session::open(&args.snapshot, settings)?;
    let path = parse_node_path(&args.node)?;

    let action = match args.action.as_deref() {
        Some(action) => Some(resolve_action(&session.view, &path, &args.node, action)?),
        None => None,
    };
    let handled = match action {
        Some(index) => session.view.click_action(&path, index),
        None => session.view.click(&path),
    };
    if !handled {
        bail!("no tree node at '{}'", args.node);
    }

    let delivered = session.host.dispatch_events();
    debug!(delivered, "delivered layout notifications");

    let journal = session.host.journal();
    println!("Host calls:");
    if journal.is_empty() {
        println!("  (none)");
    }
    for call in journal {
        println!("  {call}");
    }
    println!();
    print!("{}", session.outline()?);
    session.print_diagnostics();
    Ok(())
}

fn parse_node_path(raw: &str) -> Result<Vec<usize>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("node path must not be empty");
    }
    trimmed
        .split('.')
        .map(|part| {
            part.parse::<usize>()
                .with_context(|| format!("invalid segment '{part}' in node path '{raw}'"))
        })
        .collect()
}

/// Maps `--action` to an index, accepting either a number or a label (case-insensitive).
fn resolve_action(
    view: &TreeSynchronizer<InMemoryWorkspace>,
    path: &[usize],
    raw_path: &str,
    action: &str,
) -> Result<usize> {
    view.with_forest(|windows| -> Result<usize> {
        let node =
            node_at(windows, path).ok_or_else(|| anyhow!("no tree node at '{raw_path}'"))?;
        let actions = node.actions();
        if let Ok(index) = action.parse::<usize>() {
            if index < actions.len() {
                return Ok(index);
            }
            bail!(
                "'{}' has {} action(s); index {index} is out of range",
                node.label(),
                actions.len()
            );
        }
        actions
            .iter()
            .position(|candidate| candidate.label().eq_ignore_ascii_case(action))
            .ok_or_else(|| anyhow!("'{}' has no action named '{action}'", node.label()))
    })
}

fn node_at<'a>(windows: &'a [TreeNode], path: &[usize]) -> Option<&'a TreeNode> {
    let (head, rest) = path.split_first()?;
    windows.get(*head)?.node_at(rest)
}
