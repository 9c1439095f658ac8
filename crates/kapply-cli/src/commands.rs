use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use kapply_sdk::{
    diff_trees, is_change_str, Applier, ApplyConfig, FieldChange, TreeDiff, TreeMap, TreeNode,
};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let format = cli.format;
    let output = match cli.command {
        Command::Merge(args) => cmd_merge(&config, &args, format)?,
        Command::Apply(args) => cmd_apply(&config, &args, format)?,
        Command::Diff(args) => cmd_diff(&args, format)?,
        Command::LastApplied(args) => cmd_last_applied(&config, &args, format)?,
    };
    println!("{output}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ApplyConfig> {
    let config = match path {
        Some(path) => ApplyConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ApplyConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn read_tree(path: &Path) -> anyhow::Result<TreeNode> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tree = TreeNode::from_json_str(&input)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), kind = %tree.kind(), "loaded document");
    Ok(tree)
}

fn render_tree(tree: &TreeNode, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Text => tree.to_json_string_pretty()?,
        OutputFormat::Json => tree.to_json_string()?,
    };
    Ok(rendered)
}

fn cmd_merge(config: &ApplyConfig, args: &MergeArgs, format: OutputFormat) -> anyhow::Result<String> {
    let applier = Applier::new(config.clone());
    let observed = read_tree(&args.observed)?;
    let desired = read_tree(&args.desired)?;
    let last_applied = match &args.last_applied {
        Some(path) => read_tree(path)?,
        None => applier.last_applied(&observed)?,
    };
    let merged = applier.merger().merge(&observed, &last_applied, &desired)?;
    render_tree(&merged, format)
}

fn cmd_apply(config: &ApplyConfig, args: &ApplyArgs, format: OutputFormat) -> anyhow::Result<String> {
    let applier = Applier::new(config.clone());
    let desired = read_tree(&args.desired)?;
    let (object, changes) = match &args.observed {
        Some(path) => {
            let outcome = applier.apply(&read_tree(path)?, &desired)?;
            (outcome.object, outcome.changes)
        }
        None => {
            let object = applier.create(&desired)?;
            let changes = diff_trees(&TreeNode::empty_object(), &object);
            (object, changes)
        }
    };

    if let Some(output) = &args.output {
        fs::write(output, object.to_json_string_pretty()?)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    match format {
        OutputFormat::Text => Ok(render_changes(&changes)),
        OutputFormat::Json => render_tree(&object, format),
    }
}

fn cmd_diff(args: &DiffArgs, format: OutputFormat) -> anyhow::Result<String> {
    let old = read_tree(&args.old)?;
    let new = read_tree(&args.new)?;

    if let Some((first, rest)) = args.fields.split_first() {
        let others: Vec<&str> = rest.iter().map(String::as_str).collect();
        let changed = is_change_str(&old, &new, first, &others)?;
        return Ok(match format {
            OutputFormat::Text if changed => format!("{} fields changed", "~".yellow().bold()),
            OutputFormat::Text => format!("{} fields unchanged", "✓".green()),
            OutputFormat::Json => {
                let mut result = TreeMap::new();
                result.insert("changed".into(), TreeNode::from(changed));
                TreeNode::Object(result).to_json_string()?
            }
        });
    }

    let changes = diff_trees(&old, &new);
    match format {
        OutputFormat::Text => Ok(render_changes(&changes)),
        OutputFormat::Json => {
            let entries = changes.changes.iter().map(change_to_tree).collect::<Vec<_>>();
            Ok(TreeNode::from(entries).to_json_string()?)
        }
    }
}

fn cmd_last_applied(
    config: &ApplyConfig,
    args: &LastAppliedArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let applier = Applier::new(config.clone());
    let object = read_tree(&args.object)?;
    let baseline = applier
        .annotations()
        .get_last_applied(&object)
        .with_context(|| format!("no usable baseline on {}", args.object.display()))?;
    render_tree(&baseline, format)
}

fn render_changes(changes: &TreeDiff) -> String {
    if changes.is_empty() {
        return format!("{} No changes.", "✓".green());
    }
    let mut lines = vec![format!(
        "{} changes ({} added, {} removed, {} modified)",
        changes.len().to_string().bold(),
        changes.additions(),
        changes.removals(),
        changes.modifications()
    )];
    for change in &changes.changes {
        let line = change.to_string();
        let line = match change {
            FieldChange::Added { .. } => line.green(),
            FieldChange::Removed { .. } => line.red(),
            FieldChange::Modified { .. } => line.yellow(),
        };
        lines.push(format!("  {line}"));
    }
    lines.join("\n")
}

fn change_to_tree(change: &FieldChange) -> TreeNode {
    let (op, values) = match change {
        FieldChange::Added { value, .. } => ("add", vec![("value", value)]),
        FieldChange::Removed { value, .. } => ("remove", vec![("value", value)]),
        FieldChange::Modified { old, new, .. } => ("modify", vec![("old", old), ("new", new)]),
    };
    let mut entry = TreeMap::new();
    entry.insert("op".into(), TreeNode::from(op));
    entry.insert("path".into(), TreeNode::from(change.path().to_string()));
    for (name, value) in values {
        entry.insert(name.into(), value.clone());
    }
    TreeNode::Object(entry)
}
