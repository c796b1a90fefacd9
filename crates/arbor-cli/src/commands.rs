use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context};
use arbor_store::{LooseObjectStore, ObjectKind, ObjectStore, StoreConfig, CONFIG_FILE};
use arbor_tree::{EntryMode, Tree, TreeBuilder, TreeWalk};
use arbor_types::ObjectId;
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::cli::*;

pub fn run_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.repo.join(CONFIG_FILE));
    match cli.command {
        Command::Init(args) => cmd_init(&cli.repo, &config_path, args, out),
        Command::Mktree(args) => {
            let store = open_store(&cli.repo, &config_path)?;
            cmd_mktree(&store, args, cli.format, out)
        }
        Command::LsTree(args) => {
            let store = open_store(&cli.repo, &config_path)?;
            cmd_ls_tree(&store, args, cli.format, out)
        }
        Command::CatTree(args) => {
            let store = open_store(&cli.repo, &config_path)?;
            cmd_cat_tree(&store, args, cli.format, out)
        }
    }
}

fn load_config(repo: &Path, config_path: &Path) -> anyhow::Result<StoreConfig> {
    let mut config = StoreConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if config.root.is_relative() {
        config.root = repo.join(&config.root);
    }
    Ok(config)
}

fn open_store(repo: &Path, config_path: &Path) -> anyhow::Result<LooseObjectStore> {
    let config = load_config(repo, config_path)?;
    if !config.objects_dir().is_dir() {
        bail!(
            "{} is not an arbor repository (run `arbor init`)",
            config.root.display()
        );
    }
    Ok(LooseObjectStore::open(config)?)
}

fn cmd_init(
    repo: &Path,
    config_path: &Path,
    args: InitArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(repo).with_context(|| format!("creating {}", repo.display()))?;

    let reinit = config_path.exists();
    if !reinit {
        let mut config = StoreConfig::default();
        if let Some(level) = args.compression_level {
            config.compression_level = level;
        }
        config.fsync = args.fsync;
        config.save(config_path)?;
    }

    let store = LooseObjectStore::open(load_config(repo, config_path)?)?;
    let objects = store.config().objects_dir();
    info!(objects = %objects.display(), reinit, "store initialized");

    let verb = if reinit { "Reinitialized" } else { "Initialized" };
    writeln!(
        out,
        "{} {} Arbor store in {}",
        "✓".green().bold(),
        verb,
        objects.display().to_string().bold()
    )?;
    Ok(())
}

/// Parse one `<mode> SP <type> SP <oid> TAB <name>` line.
fn parse_entry_line(line: &str) -> anyhow::Result<(String, EntryMode, ObjectId)> {
    let (meta, name) = line
        .split_once('\t')
        .with_context(|| format!("missing tab in {line:?}"))?;
    let mut fields = meta.split(' ');
    let (Some(mode), Some(kind), Some(id), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        bail!("expected `<mode> <type> <oid>` before the tab in {line:?}");
    };

    let mode = u32::from_str_radix(mode, 8)
        .map(EntryMode::from_bits)
        .with_context(|| format!("invalid mode {mode:?}"))?;
    let kind: ObjectKind = kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    if kind != mode.object_kind() {
        bail!(
            "entry {name:?}: mode {mode} refers to a {}, not a {kind}",
            mode.object_kind()
        );
    }
    let id: ObjectId = id.parse().with_context(|| format!("invalid object id {id:?}"))?;
    Ok((name.to_string(), mode, id))
}

fn cmd_mktree(
    store: &LooseObjectStore,
    args: MktreeArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let input = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut builder = TreeBuilder::new();
    for (lineno, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, mode, id) =
            parse_entry_line(line).with_context(|| format!("line {}", lineno + 1))?;
        if builder.get(&name).is_some() {
            bail!("line {}: duplicate entry {name:?}", lineno + 1);
        }
        builder.insert(&name, id, mode)?;
    }

    let id = builder.write(store)?;
    info!(id = %id, entries = builder.len(), "tree created");
    match format {
        OutputFormat::Text => writeln!(out, "{id}")?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &serde_json::json!({ "tree": id }))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ListedEntry {
    mode: EntryMode,
    #[serde(rename = "type")]
    kind: String,
    object_id: ObjectId,
    path: String,
}

fn cmd_ls_tree(
    store: &LooseObjectStore,
    args: LsTreeArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let root: ObjectId = args
        .tree
        .parse()
        .with_context(|| format!("invalid tree id {:?}", args.tree))?;

    let listed: Vec<ListedEntry> = if args.recursive {
        TreeWalk::new(store, root)
            .filter_map(|item| match item {
                // Like `git ls-tree -r`, list leaves only.
                Ok(item) if item.entry.is_tree() => None,
                Ok(item) => Some(Ok(ListedEntry {
                    mode: item.entry.mode,
                    kind: item.entry.mode.object_kind().to_string(),
                    object_id: item.entry.object_id,
                    path: item.path,
                })),
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<_, _>>()?
    } else {
        Tree::lookup(store, &root)?
            .iter()
            .map(|e| ListedEntry {
                mode: e.mode,
                kind: e.mode.object_kind().to_string(),
                object_id: e.object_id,
                path: e.name.clone(),
            })
            .collect()
    };

    match format {
        OutputFormat::Text => {
            for e in &listed {
                writeln!(out, "{} {} {}\t{}", e.mode, e.kind, e.object_id, e.path)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &listed)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn cmd_cat_tree(
    store: &LooseObjectStore,
    args: CatTreeArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let id: ObjectId = args
        .tree
        .parse()
        .with_context(|| format!("invalid tree id {:?}", args.tree))?;
    let tree = Tree::lookup(store, &id)?;
    let size = store.get(&id)?.size;
    let subtrees = tree.iter().filter(|e| e.is_tree()).count();

    match format {
        OutputFormat::Text => {
            writeln!(out, "tree {}", id.to_string().yellow())?;
            writeln!(out, "  entries:  {}", tree.len())?;
            writeln!(out, "  subtrees: {subtrees}")?;
            writeln!(out, "  size:     {size} bytes")?;
            writeln!(out, "  path:     {}", store.object_path(&id).display())?;
        }
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "tree": id,
                "entries": tree.len(),
                "subtrees": subtrees,
                "size": size,
            });
            serde_json::to_writer_pretty(&mut *out, &summary)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
